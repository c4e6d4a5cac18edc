//! Advisory availability checks for staff calendars.
//!
//! The answer is only a snapshot. Two requests may both see a free slot, so
//! the repository's atomic insert remains the real guard against double
//! booking; this check lets the coordinator reject obvious conflicts early.

use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::{AppointmentRepository, AppointmentRepositoryError};
use crate::domain::{Appointment, AppointmentId, StaffId, TimeSlot};

/// Decide whether `candidate` is free given the staff member's appointments.
///
/// Cancelled appointments, appointments of other staff and `exclude` are
/// ignored.
pub fn slot_is_free(
    staff_id: StaffId,
    existing: &[Appointment],
    candidate: &TimeSlot,
    exclude: Option<AppointmentId>,
) -> bool {
    first_conflict(staff_id, existing, candidate, exclude).is_none()
}

fn first_conflict<'a>(
    staff_id: StaffId,
    existing: &'a [Appointment],
    candidate: &TimeSlot,
    exclude: Option<AppointmentId>,
) -> Option<&'a Appointment> {
    existing.iter().find(|appointment| {
        appointment.staff_id() == staff_id
            && appointment.blocks_slot()
            && Some(appointment.id()) != exclude
            && appointment.slot().overlaps(candidate)
    })
}

/// Checks staff availability against the appointment repository.
pub struct AvailabilityChecker<R> {
    appointments: Arc<R>,
}

impl<R> Clone for AvailabilityChecker<R> {
    fn clone(&self) -> Self {
        Self {
            appointments: Arc::clone(&self.appointments),
        }
    }
}

impl<R> AvailabilityChecker<R> {
    /// Checker reading from `appointments`.
    pub fn new(appointments: Arc<R>) -> Self {
        Self { appointments }
    }
}

impl<R> AvailabilityChecker<R>
where
    R: AppointmentRepository,
{
    /// True when no live appointment of `staff_id` other than `exclude`
    /// overlaps `candidate`.
    pub async fn is_available(
        &self,
        staff_id: &StaffId,
        candidate: &TimeSlot,
        exclude: Option<AppointmentId>,
    ) -> Result<bool, AppointmentRepositoryError> {
        let existing = self
            .appointments
            .find_active_overlapping(staff_id, candidate)
            .await?;
        match first_conflict(*staff_id, &existing, candidate, exclude) {
            Some(conflict) => {
                debug!(
                    staff_id = %staff_id,
                    conflicting_appointment_id = %conflict.id(),
                    start = %candidate.start(),
                    end = %candidate.end(),
                    "requested slot is taken"
                );
                Ok(false)
            }
            None => Ok(true),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the pure decision and the repository-backed check.

    use chrono::{DateTime, TimeZone, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::MockAppointmentRepository;
    use crate::domain::{
        ActorId, AppointmentDraft, BookingFlow, CancellationBuffer, ClientId, LifecycleEvent,
        ServiceDuration, ServiceId, TransitionContext, TransitionOutcome,
    };

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, minute, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    fn hour_from(hour: u32, minute: u32) -> TimeSlot {
        TimeSlot::starting_at(
            at(hour, minute),
            ServiceDuration::from_minutes(60).expect("positive duration"),
        )
        .expect("valid slot")
    }

    fn book(staff_id: StaffId, slot: TimeSlot) -> Appointment {
        Appointment::book(AppointmentDraft {
            id: AppointmentId::random(),
            client_id: ClientId::random(),
            staff_id,
            service_id: ServiceId::random(),
            slot,
            notes: None,
            booked_at: at(6, 0),
            flow: BookingFlow::RequireConfirmation,
        })
        .expect("valid booking")
    }

    #[fixture]
    fn staff_id() -> StaffId {
        StaffId::random()
    }

    #[rstest]
    #[case(hour_from(10, 30), false)]
    #[case(hour_from(9, 30), false)]
    #[case(hour_from(11, 0), true)]
    #[case(hour_from(9, 0), true)]
    fn overlap_against_a_single_booking(
        staff_id: StaffId,
        #[case] candidate: TimeSlot,
        #[case] free: bool,
    ) {
        let existing = vec![book(staff_id, hour_from(10, 0))];
        assert_eq!(slot_is_free(staff_id, &existing, &candidate, None), free);
    }

    #[rstest]
    fn other_staff_do_not_block(staff_id: StaffId) {
        let existing = vec![book(StaffId::random(), hour_from(10, 0))];
        assert!(slot_is_free(staff_id, &existing, &hour_from(10, 0), None));
    }

    #[rstest]
    fn excluded_appointment_does_not_block_itself(staff_id: StaffId) {
        let existing = vec![book(staff_id, hour_from(10, 0))];
        let own = existing[0].id();
        assert!(slot_is_free(staff_id, &existing, &hour_from(10, 30), Some(own)));
    }

    #[rstest]
    fn cancelled_appointments_release_their_slot(staff_id: StaffId) {
        let booked = book(staff_id, hour_from(10, 0));
        let ctx = TransitionContext {
            now: at(7, 0),
            actor_id: ActorId::random(),
            bypass_buffer: false,
            buffer: CancellationBuffer::from_minutes(120),
            flow: BookingFlow::RequireConfirmation,
            reason: None,
        };
        let Ok(TransitionOutcome::Applied(cancelled)) = booked.apply(LifecycleEvent::Cancel, &ctx)
        else {
            panic!("cancellation should apply");
        };
        assert!(slot_is_free(staff_id, &[cancelled], &hour_from(10, 0), None));
    }

    #[rstest]
    #[tokio::test]
    async fn checker_reports_conflicts_from_repository(staff_id: StaffId) {
        let existing = book(staff_id, hour_from(10, 0));
        let mut repo = MockAppointmentRepository::new();
        repo.expect_find_active_overlapping()
            .times(1)
            .return_once(move |_, _| Ok(vec![existing]));

        let checker = AvailabilityChecker::new(Arc::new(repo));
        let free = checker
            .is_available(&staff_id, &hour_from(10, 30), None)
            .await
            .expect("lookup succeeds");
        assert!(!free);
    }

    #[rstest]
    #[tokio::test]
    async fn checker_propagates_repository_errors(staff_id: StaffId) {
        let mut repo = MockAppointmentRepository::new();
        repo.expect_find_active_overlapping()
            .times(1)
            .return_once(|_, _| Err(AppointmentRepositoryError::connection("down")));

        let checker = AvailabilityChecker::new(Arc::new(repo));
        let err = checker
            .is_available(&staff_id, &hour_from(10, 0), None)
            .await
            .expect_err("repository down");
        assert!(matches!(err, AppointmentRepositoryError::Connection { .. }));
    }
}
