// libs/appointment-cell/tests/booking_test.rs
mod common;

use assert_matches::assert_matches;
use chrono::Duration;
use uuid::Uuid;

use appointment_cell::{AppointmentError, AppointmentStatus, RescheduleAppointmentRequest};

use common::{booking, june, Fixture};

#[tokio::test]
async fn back_to_back_bookings_succeed_and_straddling_one_conflicts() {
    let fixture = Fixture::new();
    let clinician = fixture.clinician("gp@clinic.ie").await;
    let patient = fixture.patient("p@example.ie").await;
    fixture.open_window(clinician, 1, "09:00", "12:00").await;

    let first = fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(3, 9, 0), june(3, 10, 0)))
        .await
        .unwrap();
    let second = fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(3, 10, 0), june(3, 11, 0)))
        .await
        .unwrap();
    assert_eq!(first.status, AppointmentStatus::Scheduled);
    assert_eq!(first.version, 1);
    assert_eq!(first.priority, 3);

    let err = fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(3, 9, 45), june(3, 10, 15)))
        .await
        .unwrap_err();

    assert_matches!(
        err,
        AppointmentError::SlotConflict { clinician_id, conflicting_appointment_id: Some(id) }
            if clinician_id == clinician && (id == first.id || id == second.id)
    );
    assert_eq!(fixture.store.len().await, 2);
}

#[tokio::test]
async fn booking_outside_availability_needs_an_override() {
    let fixture = Fixture::new();
    let (clinician, patient) = fixture.monday_clinic().await;

    // Tuesday 10:00
    let err = fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(4, 10, 0), june(4, 10, 30)))
        .await
        .unwrap_err();
    assert_matches!(err, AppointmentError::OutsideAvailability { weekday: 2, .. });

    let mut request = booking(patient, Some(clinician), june(4, 10, 0), june(4, 10, 30));
    request.is_admin_override = true;
    let booked = fixture.booking.create_appointment(request).await.unwrap();
    assert!(booked.is_admin_override);
}

#[tokio::test]
async fn slot_must_fit_inside_a_single_window() {
    let fixture = Fixture::new();
    let (clinician, patient) = fixture.monday_clinic().await;

    let err = fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(3, 16, 30), june(3, 17, 30)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "outside_availability");

    // Ending exactly at the window's end is fine.
    assert!(fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(3, 16, 30), june(3, 17, 0)))
        .await
        .is_ok());
}

#[tokio::test]
async fn approved_time_off_blocks_even_with_override() {
    let fixture = Fixture::new();
    let (clinician, patient) = fixture.monday_clinic().await;
    let time_off_id = fixture
        .approved_time_off(clinician, june(10, 0, 0), june(11, 0, 0))
        .await;

    let mut request = booking(patient, Some(clinician), june(10, 11, 0), june(10, 11, 30));
    request.is_admin_override = true;
    let err = fixture.booking.create_appointment(request).await.unwrap_err();

    assert_eq!(
        err,
        AppointmentError::TimeOffConflict {
            clinician_id: clinician,
            time_off_id,
        }
    );
    assert!(fixture.store.is_empty().await);
}

#[tokio::test]
async fn unapproved_time_off_blocks_nothing() {
    let fixture = Fixture::new();
    let (clinician, patient) = fixture.monday_clinic().await;
    fixture
        .time_off
        .request_time_off(
            clinician,
            clinician_cell::TimeOffRequest {
                start_datetime: june(10, 0, 0),
                end_datetime: june(11, 0, 0),
                reason: None,
            },
        )
        .await
        .unwrap();

    assert!(fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(10, 11, 0), june(10, 11, 30)))
        .await
        .is_ok());
}

#[tokio::test]
async fn interval_and_past_slots_are_rejected_before_anything_else() {
    let fixture = Fixture::new();
    let (clinician, patient) = fixture.monday_clinic().await;

    let err = fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(3, 10, 0), june(3, 10, 0)))
        .await
        .unwrap_err();
    assert_matches!(err, AppointmentError::InvalidInterval { .. });

    fixture.clock.set(june(3, 10, 0));
    let err = fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(3, 10, 0), june(3, 10, 30)))
        .await
        .unwrap_err();
    assert_matches!(err, AppointmentError::InvalidSlot { .. });
}

#[tokio::test]
async fn participants_and_priority_are_checked() {
    let fixture = Fixture::new();
    let (clinician, patient) = fixture.monday_clinic().await;

    let stranger = Uuid::new_v4();
    let err = fixture
        .booking
        .create_appointment(booking(stranger, Some(clinician), june(3, 9, 0), june(3, 9, 30)))
        .await
        .unwrap_err();
    assert_eq!(err, AppointmentError::NotFound { entity: "patient", id: stranger });

    // A patient id in the clinician slot has the wrong role.
    let err = fixture
        .booking
        .create_appointment(booking(patient, Some(patient), june(3, 9, 0), june(3, 9, 30)))
        .await
        .unwrap_err();
    assert_matches!(err, AppointmentError::Validation { field: "clinician_id", .. });

    let mut request = booking(patient, Some(clinician), june(3, 9, 0), june(3, 9, 30));
    request.priority = Some(6);
    let err = fixture.booking.create_appointment(request).await.unwrap_err();
    assert_matches!(err, AppointmentError::Validation { field: "priority", .. });
}

#[tokio::test]
async fn unassigned_appointments_skip_availability_until_assigned() {
    let fixture = Fixture::new();
    let (clinician, patient) = fixture.monday_clinic().await;

    // Saturday, nobody is open.
    let unassigned = fixture
        .booking
        .create_appointment(booking(patient, None, june(8, 10, 0), june(8, 10, 30)))
        .await
        .unwrap();
    assert_eq!(unassigned.clinician_id, None);

    let err = fixture
        .booking
        .assign_clinician(unassigned.id, clinician)
        .await
        .unwrap_err();
    assert_matches!(err, AppointmentError::OutsideAvailability { weekday: 6, .. });

    let monday = fixture
        .booking
        .create_appointment(booking(patient, None, june(3, 10, 0), june(3, 10, 30)))
        .await
        .unwrap();
    let assigned = fixture.booking.assign_clinician(monday.id, clinician).await.unwrap();
    assert_eq!(assigned.clinician_id, Some(clinician));
    assert_eq!(assigned.version, 2);

    let err = fixture.booking.assign_clinician(monday.id, clinician).await.unwrap_err();
    assert_matches!(err, AppointmentError::Validation { field: "clinician_id", .. });
}

#[tokio::test]
async fn reschedule_ignores_its_own_slot_but_not_others() {
    let fixture = Fixture::new();
    let (clinician, patient) = fixture.monday_clinic().await;

    let moving = fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(3, 9, 0), june(3, 10, 0)))
        .await
        .unwrap();
    let blocker = fixture
        .booking
        .create_appointment(booking(patient, Some(clinician), june(3, 11, 0), june(3, 12, 0)))
        .await
        .unwrap();

    let shifted = fixture
        .booking
        .reschedule_appointment(
            moving.id,
            RescheduleAppointmentRequest {
                scheduled_start: june(3, 9, 30),
                scheduled_end: june(3, 10, 30),
                is_admin_override: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(shifted.scheduled_start, june(3, 9, 30));
    assert_eq!(shifted.version, moving.version + 1);

    let err = fixture
        .booking
        .reschedule_appointment(
            moving.id,
            RescheduleAppointmentRequest {
                scheduled_start: june(3, 11, 30),
                scheduled_end: june(3, 11, 30) + Duration::hours(1),
                is_admin_override: false,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(
        err,
        AppointmentError::SlotConflict { conflicting_appointment_id: Some(id), .. } if id == blocker.id
    );

    let unchanged = fixture.booking.get_appointment(moving.id).await.unwrap();
    assert_eq!(unchanged.scheduled_start, june(3, 9, 30));
}

#[tokio::test]
async fn only_scheduled_appointments_can_be_rescheduled() {
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

    let err = fixture
        .booking
        .reschedule_appointment(
            appointment.id,
            RescheduleAppointmentRequest {
                scheduled_start: june(3, 13, 0),
                scheduled_end: june(3, 14, 0),
                is_admin_override: false,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(
        err,
        AppointmentError::InvalidTransition { from: AppointmentStatus::InProgress, .. }
    );

    let missing = Uuid::new_v4();
    let err = fixture
        .booking
        .reschedule_appointment(
            missing,
            RescheduleAppointmentRequest {
                scheduled_start: june(3, 13, 0),
                scheduled_end: june(3, 14, 0),
                is_admin_override: false,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, AppointmentError::NotFound { entity: "appointment", id: missing });
}

#[tokio::test]
async fn clinic_offset_decides_the_local_weekday() {
    use std::sync::Arc;

    use appointment_cell::repository::InMemoryAppointmentRepository;
    use appointment_cell::{BookingService, LogNotifier};
    use shared_config::SchedulingConfig;

    let fixture = Fixture::new();
    let (clinician, patient) = fixture.monday_clinic().await;

    // UTC+10: Sunday 23:00 UTC is Monday 09:00 at the clinic.
    let store = Arc::new(InMemoryAppointmentRepository::new());
    let booking_service = BookingService::new(
        store,
        fixture.users.clone(),
        fixture.availability.clone(),
        fixture.time_off.clone(),
        Arc::new(LogNotifier),
        fixture.clock.clone(),
        &SchedulingConfig {
            lock_timeout_ms: 200,
            clinic_utc_offset_minutes: 600,
        },
    );

    let booked = booking_service
        .create_appointment(booking(patient, Some(clinician), june(2, 23, 0), june(2, 23, 30)))
        .await
        .unwrap();
    assert_eq!(booked.scheduled_start, june(2, 23, 0));

    let err = booking_service
        .create_appointment(booking(patient, Some(clinician), june(3, 9, 0), june(3, 9, 30)))
        .await
        .unwrap_err();
    assert_matches!(err, AppointmentError::OutsideAvailability { .. });
}
