// libs/appointment-cell/tests/lifecycle_test.rs
mod common;

use assert_matches::assert_matches;
use uuid::Uuid;

use appointment_cell::{AppointmentError, AppointmentStatus};

use common::{booking, june, Fixture};

#[tokio::test]
async fn completed_appointment_cannot_be_cancelled() {
    let fixture = Fixture::new();
    let (clinician, patient) = fixture.monday_clinic().await;
    let appointment = fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(3, 9, 0), june(3, 10, 0)))
        .await
        .unwrap();

    fixture
        .booking
        .transition_status(appointment.id, AppointmentStatus::InProgress, None)
        .await
        .unwrap();
    let completed = fixture
        .booking
        .transition_status(appointment.id, AppointmentStatus::Completed, None)
        .await
        .unwrap();
    assert_eq!(completed.version, 3);

    let err = fixture
        .booking
        .cancel_appointment(appointment.id, Some("too late".to_string()))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        AppointmentError::InvalidTransition {
            from: AppointmentStatus::Completed,
            to: AppointmentStatus::Cancelled,
            ..
        }
    );

    let stored = fixture.booking.get_appointment(appointment.id).await.unwrap();
    assert_eq!(stored.status, AppointmentStatus::Completed);
    assert_eq!(stored.version, 3);
    assert_eq!(stored.cancellation_reason, None);
}

#[tokio::test]
async fn scheduled_cannot_jump_to_completed() {
    let fixture = Fixture::new();
    let (clinician, patient) = fixture.monday_clinic().await;
    let appointment = fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(3, 9, 0), june(3, 10, 0)))
        .await
        .unwrap();

    let err = fixture
        .booking
        .transition_status(appointment.id, AppointmentStatus::Completed, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_transition");
}

#[tokio::test]
async fn cancelling_frees_the_slot() {
    let fixture = Fixture::new();
    let (clinician, patient) = fixture.monday_clinic().await;
    let appointment = fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(3, 9, 0), june(3, 10, 0)))
        .await
        .unwrap();

    let cancelled = fixture
        .booking
        .cancel_appointment(appointment.id, Some("patient travelling".to_string()))
        .await
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("patient travelling"));

    let rebooked = fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(3, 9, 0), june(3, 10, 0)))
        .await
        .unwrap();
    assert_ne!(rebooked.id, appointment.id);
}

#[tokio::test]
async fn bulk_transition_reports_each_row() {
    let fixture = Fixture::new();
    let (clinician, patient) = fixture.monday_clinic().await;

    let mut ids = Vec::new();
    for hour in [9, 10, 11] {
        let appointment = fixture
            .booking
            .create_appointment(booking(patient, Some(clinician), june(3, hour, 0), june(3, hour + 1, 0)))
            .await
            .unwrap();
        ids.push(appointment.id);
    }
    fixture.booking.cancel_appointment(ids[1], None).await.unwrap();
    let missing = Uuid::new_v4();
    ids.push(missing);

    let report = fixture
        .booking
        .bulk_transition(&ids, AppointmentStatus::InProgress)
        .await;

    let changed: Vec<Uuid> = report.changed.iter().map(|a| a.id).collect();
    assert_eq!(changed, vec![ids[0], ids[2]]);
    assert!(report.changed.iter().all(|a| a.status == AppointmentStatus::InProgress));

    assert_eq!(report.rejected.len(), 2);
    assert_eq!(report.rejected[0].appointment_id, ids[1]);
    assert_eq!(report.rejected[0].kind, "invalid_transition");
    assert_eq!(report.rejected[1].appointment_id, missing);
    assert_eq!(report.rejected[1].kind, "not_found");
}

#[tokio::test]
async fn removing_availability_leaves_booked_appointments_alone() {
    let fixture = Fixture::new();
    let (clinician, patient) = fixture.monday_clinic().await;
    let appointment = fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(3, 9, 0), june(3, 10, 0)))
        .await
        .unwrap();

    for window in fixture.availability.list_availability(clinician, Some(1)).await.unwrap() {
        fixture.availability.delete_availability(clinician, window.id).await.unwrap();
    }
    assert!(fixture.availability.list_availability(clinician, None).await.unwrap().is_empty());

    let stored = fixture.booking.get_appointment(appointment.id).await.unwrap();
    assert_eq!(stored.status, AppointmentStatus::Scheduled);

    // New bookings lose the window, but the booked slot still blocks overrides.
    let err = fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(3, 11, 0), june(3, 11, 30)))
        .await
        .unwrap_err();
    assert_matches!(err, AppointmentError::OutsideAvailability { .. });

    let mut overriding = booking(patient, Some(clinician), june(3, 9, 30), june(3, 10, 30));
    overriding.is_admin_override = true;
    let err = fixture.booking.create_appointment(overriding).await.unwrap_err();
    assert_matches!(
        err,
        AppointmentError::SlotConflict { conflicting_appointment_id: Some(id), .. } if id == appointment.id
    );

    let started = fixture
        .booking
        .transition_status(appointment.id, AppointmentStatus::InProgress, None)
        .await
        .unwrap();
    assert_eq!(started.status, AppointmentStatus::InProgress);
}
