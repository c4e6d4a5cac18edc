//! Internal helpers for the booking service.

use serde_json::json;

use crate::domain::ports::{
    AppointmentRepositoryError, CatalogueLookupError, Notification, NotificationKind, Recipient,
};
use crate::domain::{
    Appointment, AppointmentValidationError, Error, SlotValidationError, TransitionError,
};

pub(crate) fn map_repository_error(error: AppointmentRepositoryError) -> Error {
    match error {
        AppointmentRepositoryError::Connection { message } => {
            Error::unavailable(format!("appointment repository unavailable: {message}"))
        }
        AppointmentRepositoryError::Query { message } => {
            Error::internal(format!("appointment repository error: {message}"))
        }
        AppointmentRepositoryError::SlotTaken { staff_id } => {
            Error::slot_conflict("the requested slot is no longer available")
                .with_details(json!({ "staffId": staff_id }))
        }
        AppointmentRepositoryError::VersionMismatch { expected, actual } => {
            Error::concurrency_conflict("appointment changed concurrently; reload and retry")
                .with_details(json!({ "expectedVersion": expected, "actualVersion": actual }))
        }
        AppointmentRepositoryError::Missing { appointment_id } => {
            Error::not_found(format!("appointment {appointment_id} not found"))
        }
    }
}

pub(crate) fn map_catalogue_error(error: CatalogueLookupError) -> Error {
    match error {
        CatalogueLookupError::Connection { message } => {
            Error::unavailable(format!("catalogue unavailable: {message}"))
        }
        CatalogueLookupError::Query { message } => {
            Error::internal(format!("catalogue error: {message}"))
        }
    }
}

pub(crate) fn map_slot_error(error: SlotValidationError) -> Error {
    Error::validation(format!("invalid slot: {error}"))
}

pub(crate) fn map_validation_error(error: AppointmentValidationError) -> Error {
    Error::validation(error.to_string())
}

/// Buffer and start-time violations are lifecycle refusals, not malformed
/// input; past reschedule targets and oversized text are.
pub(crate) fn map_transition_error(error: TransitionError) -> Error {
    match error {
        TransitionError::NotPermitted { from, event } => Error::invalid_transition(format!(
            "cannot {event} an appointment that is {from}"
        ))
        .with_details(json!({ "from": from, "event": event })),
        TransitionError::RescheduleNotPermitted { from } => Error::invalid_transition(format!(
            "cannot reschedule an appointment that is {from}"
        ))
        .with_details(json!({ "from": from, "event": "reschedule" })),
        TransitionError::InsideCancellationBuffer { deadline } => {
            Error::invalid_transition(format!("changes closed at {}", deadline.to_rfc3339()))
                .with_details(json!({ "deadline": deadline }))
        }
        TransitionError::NotYetStarted { starts_at } => Error::invalid_transition(format!(
            "appointment cannot be completed before it starts at {}",
            starts_at.to_rfc3339()
        )),
        TransitionError::StartsInPast { start } => {
            Error::validation(format!("new start {} is in the past", start.to_rfc3339()))
        }
        TransitionError::InvalidText(inner) => map_validation_error(inner),
    }
}

/// One notification per party of the appointment.
pub(crate) fn notifications_for(
    appointment: &Appointment,
    kind: NotificationKind,
) -> [Notification; 2] {
    [
        Recipient::Client(appointment.client_id()),
        Recipient::Staff(appointment.staff_id()),
    ]
    .map(|recipient| Notification {
        appointment_id: appointment.id(),
        kind,
        recipient,
    })
}
