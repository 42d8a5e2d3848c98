use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use identity_cell::{HealthcareUser, Role, RoleProfile, SupabaseUserDirectory, UserDirectory, UserStatus};
use shared_database::{RepositoryError, SupabaseClient};
use shared_utils::test_utils::MockSupabaseResponses;

fn directory(server: &MockServer) -> SupabaseUserDirectory {
    let client = SupabaseClient::with_base_url(&server.uri(), "anon", "service");
    SupabaseUserDirectory::new(Arc::new(client))
}

#[tokio::test]
async fn finds_user_and_profile_rows() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/healthcare_users"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_row(id, "clinician")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/clinician_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "user_id": id,
            "license_number": "MC-77",
            "license_jurisdiction": "IMC",
            "accepting_new_patients": false
        }])))
        .mount(&server)
        .await;

    let directory = directory(&server);
    let user = directory.find_user(id).await.unwrap().unwrap();
    assert_eq!(user.role, Role::Clinician);
    assert_eq!(user.status, UserStatus::Active);

    let profile = directory.find_profile(&user).await.unwrap();
    assert_matches!(profile, Some(RoleProfile::Clinician(p)) if !p.accepting_new_patients);
}

#[tokio::test]
async fn unique_violation_from_rpc_becomes_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/create_user_with_profile"))
        .and(body_partial_json(json!({ "p_user": { "role": "patient" } })))
        .respond_with(ResponseTemplate::new(409).set_body_json(MockSupabaseResponses::postgrest_error(
            "23505",
            "duplicate key value violates unique constraint \"healthcare_users_email_key\"",
        )))
        .mount(&server)
        .await;

    let now = Utc::now();
    let user = HealthcareUser {
        id: Uuid::new_v4(),
        email: "dup@example.com".to_string(),
        phone: None,
        first_name: "Dup".to_string(),
        last_name: "Licate".to_string(),
        role: Role::Patient,
        status: UserStatus::PendingVerification,
        created_at: now,
        updated_at: now,
    };

    let err = directory(&server)
        .create_user_with_profile(user, Some(RoleProfile::Patient(Default::default())))
        .await
        .unwrap_err();
    assert_eq!(err, RepositoryError::conflict("healthcare_users_email_key"));
}
