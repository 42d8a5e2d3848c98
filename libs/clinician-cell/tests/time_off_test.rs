mod common;

use assert_matches::assert_matches;
use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use clinician_cell::{ClinicianError, TimeOffRequest};
use shared_utils::Clock;

use common::Fixture;

#[tokio::test]
async fn only_approved_time_off_is_reported_as_blocking() {
    let fixture = Fixture::new();
    let clinician = fixture.clinician("leave@clinic.ie").await.user.id;
    let service = &fixture.state.time_off;

    let start = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 6, 11, 0, 0, 0).unwrap();

    let period = service
        .request_time_off(
            clinician,
            TimeOffRequest { start_datetime: start, end_datetime: end, reason: Some("conference".to_string()) },
        )
        .await
        .unwrap();
    assert!(!period.is_approved);

    let probe_start = start + Duration::hours(10);
    let probe_end = probe_start + Duration::minutes(30);
    assert!(service
        .find_approved_overlapping(clinician, probe_start, probe_end)
        .await
        .unwrap()
        .is_empty());

    let admin = Uuid::new_v4();
    let approved = service.approve_time_off(period.id, admin).await.unwrap();
    assert!(approved.is_approved);
    assert_eq!(approved.approved_by, Some(admin));
    assert_eq!(approved.approved_at, Some(fixture.clock.now()));

    let blocking = service
        .find_approved_overlapping(clinician, probe_start, probe_end)
        .await
        .unwrap();
    assert_eq!(blocking.len(), 1);

    // Touching the end boundary is not an overlap.
    assert!(service
        .find_approved_overlapping(clinician, end, end + Duration::hours(1))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn expired_periods_are_hidden_by_default() {
    let fixture = Fixture::new();
    let clinician = fixture.clinician("expired@clinic.ie").await.user.id;
    let service = &fixture.state.time_off;

    let start = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
    service
        .request_time_off(
            clinician,
            TimeOffRequest { start_datetime: start, end_datetime: start + Duration::hours(4), reason: None },
        )
        .await
        .unwrap();

    assert_eq!(service.list_time_off(clinician, false).await.unwrap().len(), 1);

    fixture.clock.advance(Duration::days(7));
    assert!(service.list_time_off(clinician, false).await.unwrap().is_empty());
    assert_eq!(service.list_time_off(clinician, true).await.unwrap().len(), 1);
}

#[tokio::test]
async fn rejects_inverted_period_and_unknown_approval() {
    let fixture = Fixture::new();
    let clinician = fixture.clinician("inverted@clinic.ie").await.user.id;
    let service = &fixture.state.time_off;

    let start = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
    let err = service
        .request_time_off(clinician, TimeOffRequest { start_datetime: start, end_datetime: start, reason: None })
        .await
        .unwrap_err();
    assert_matches!(err, ClinicianError::Validation { field: "end_datetime", .. });

    assert_matches!(
        service.approve_time_off(Uuid::new_v4(), Uuid::new_v4()).await,
        Err(ClinicianError::NotFound { entity: "time-off", .. })
    );
}
