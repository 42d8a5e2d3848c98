mod common;

use assert_matches::assert_matches;
use chrono::NaiveTime;
use shared_utils::Clock;
use uuid::Uuid;

use clinician_cell::{ClinicianError, UpsertAvailabilityRequest};
use identity_cell::IdentityError;

use common::Fixture;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn request(weekday: u8, start: NaiveTime, end: NaiveTime, is_available: bool) -> UpsertAvailabilityRequest {
    UpsertAvailabilityRequest {
        weekday,
        start_time: start,
        end_time: end,
        is_available,
        is_recurring: true,
        override_reason: None,
    }
}

#[tokio::test]
async fn upsert_updates_the_window_with_same_bounds() {
    let fixture = Fixture::new();
    let clinician = fixture.clinician("upsert@clinic.ie").await.user.id;
    let service = &fixture.state.availability;

    let first = service
        .upsert_availability(clinician, request(1, t(9, 0), t(17, 0), true))
        .await
        .unwrap();
    let second = service
        .upsert_availability(clinician, request(1, t(9, 0), t(17, 0), false))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert!(!second.is_available);
    assert_eq!(first.created_at, fixture.clock.now());

    let windows = service.list_availability(clinician, Some(1)).await.unwrap();
    assert_eq!(windows.len(), 1);
}

#[tokio::test]
async fn overlapping_windows_are_allowed_and_listed_in_order() {
    let fixture = Fixture::new();
    let clinician = fixture.clinician("overlap@clinic.ie").await.user.id;
    let service = &fixture.state.availability;

    service.upsert_availability(clinician, request(2, t(13, 0), t(17, 0), true)).await.unwrap();
    service.upsert_availability(clinician, request(2, t(9, 0), t(14, 0), true)).await.unwrap();
    service.upsert_availability(clinician, request(0, t(10, 0), t(12, 0), true)).await.unwrap();

    let all = service.list_availability(clinician, None).await.unwrap();
    let order: Vec<(u8, NaiveTime)> = all.iter().map(|w| (w.weekday, w.start_time)).collect();
    assert_eq!(order, vec![(0, t(10, 0)), (2, t(9, 0)), (2, t(13, 0))]);

    let tuesday = service.list_availability(clinician, Some(2)).await.unwrap();
    assert_eq!(tuesday.len(), 2);
}

#[tokio::test]
async fn rejects_bad_weekday_and_inverted_bounds() {
    let fixture = Fixture::new();
    let clinician = fixture.clinician("bounds@clinic.ie").await.user.id;
    let service = &fixture.state.availability;

    let err = service
        .upsert_availability(clinician, request(7, t(9, 0), t(10, 0), true))
        .await
        .unwrap_err();
    assert_matches!(err, ClinicianError::Validation { field: "weekday", .. });

    let err = service
        .upsert_availability(clinician, request(1, t(10, 0), t(10, 0), true))
        .await
        .unwrap_err();
    assert_matches!(err, ClinicianError::Validation { field: "end_time", .. });

    assert_matches!(
        service.list_availability(clinician, Some(9)).await,
        Err(ClinicianError::Validation { field: "weekday", .. })
    );
}

#[tokio::test]
async fn unknown_clinician_is_not_found() {
    let fixture = Fixture::new();
    let missing = Uuid::new_v4();

    let err = fixture
        .state
        .availability
        .upsert_availability(missing, request(1, t(9, 0), t(10, 0), true))
        .await
        .unwrap_err();
    assert_eq!(err, ClinicianError::Identity(IdentityError::NotFound(missing)));
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test]
async fn delete_only_removes_own_windows() {
    let fixture = Fixture::new();
    let owner = fixture.clinician("owner@clinic.ie").await.user.id;
    let other = fixture.clinician("other@clinic.ie").await.user.id;
    let service = &fixture.state.availability;

    let window = service
        .upsert_availability(owner, request(4, t(8, 0), t(12, 0), true))
        .await
        .unwrap();

    assert_matches!(
        service.delete_availability(other, window.id).await,
        Err(ClinicianError::NotFound { .. })
    );
    service.delete_availability(owner, window.id).await.unwrap();
    assert!(service.list_availability(owner, None).await.unwrap().is_empty());
}
