// libs/clinician-cell/tests/handlers_test.rs
mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use clinician_cell::{clinician_routes, specialization_routes};
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

use common::Fixture;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn clinician_manages_own_availability_only() {
    let fixture = Fixture::new();
    let config = TestConfig::default();
    let clinician = fixture.clinician("self@clinic.ie").await.user;
    let app = clinician_routes(config.to_arc(), fixture.state.clone());

    let me = TestUser::with_id(clinician.id, &clinician.email, "clinician");
    let body = json!({ "weekday": 1, "start_time": "09:00:00", "end_time": "17:00:00" }).to_string();

    let response = app
        .clone()
        .oneshot(
            Request::put(format!("/{}/availability", clinician.id))
                .header("Authorization", JwtTestUtils::bearer(&me, &config))
                .header("Content-Type", "application/json")
                .body(Body::from(body.clone()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stranger = TestUser::clinician("stranger@clinic.ie");
    let response = app
        .clone()
        .oneshot(
            Request::put(format!("/{}/availability", clinician.id))
                .header("Authorization", JwtTestUtils::bearer(&stranger, &config))
                .header("Content-Type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(
            Request::get(format!("/{}/availability?weekday=1", clinician.id))
                .header("Authorization", JwtTestUtils::bearer(&stranger, &config))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["total"], 1);
}

#[tokio::test]
async fn validation_errors_carry_kind_and_field() {
    let fixture = Fixture::new();
    let config = TestConfig::default();
    let clinician = fixture.clinician("kind@clinic.ie").await.user;
    let app = clinician_routes(config.to_arc(), fixture.state.clone());
    let me = TestUser::with_id(clinician.id, &clinician.email, "clinician");

    let response = app
        .oneshot(
            Request::put(format!("/{}/availability", clinician.id))
                .header("Authorization", JwtTestUtils::bearer(&me, &config))
                .header("Content-Type", "application/json")
                .body(Body::from(
                    json!({ "weekday": 8, "start_time": "09:00:00", "end_time": "10:00:00" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["kind"], "validation");
    assert_eq!(body["details"]["field"], "weekday");
    assert_eq!(body["retryable"], false);
}

#[tokio::test]
async fn specialization_writes_need_admin() {
    let fixture = Fixture::new();
    let config = TestConfig::default();
    let app = specialization_routes(config.to_arc(), fixture.state.clone());
    let payload = json!({ "name": "Sports Medicine", "department": "Medicine" }).to_string();

    let response = app
        .clone()
        .oneshot(
            Request::post("/")
                .header("Authorization", JwtTestUtils::bearer(&TestUser::patient("p@x.ie"), &config))
                .header("Content-Type", "application/json")
                .body(Body::from(payload.clone()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = TestUser::admin("admin@clinic.ie");
    let response = app
        .clone()
        .oneshot(
            Request::post("/")
                .header("Authorization", JwtTestUtils::bearer(&admin, &config))
                .header("Content-Type", "application/json")
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(
            Request::get("/sports-medicine")
                .header("Authorization", JwtTestUtils::bearer(&admin, &config))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["department"], "Medicine");
}

#[tokio::test]
async fn requests_without_token_are_rejected() {
    let fixture = Fixture::new();
    let app = specialization_routes(TestConfig::default().to_arc(), fixture.state.clone());

    let response = app
        .oneshot(Request::get("/departments").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
