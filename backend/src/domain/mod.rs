//! Domain primitives, aggregates and services.
//!
//! Purpose: model appointment scheduling independently of transport and
//! storage. Value types validate on construction; the booking service is the
//! only entry point that touches ports.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic failure payload.
//! - TimeSlot, ServiceDuration, CancellationBuffer: slot arithmetic.
//! - Appointment: aggregate with its lifecycle state machine.
//! - can, Actor, Role, Action: authorisation decisions.
//! - AvailabilityChecker: advisory free/busy lookups.
//! - BookingService: implements the driving ports.

pub mod appointment;
pub mod authorization;
pub mod availability;
pub mod booking_service;
mod booking_service_support;
pub mod error;
pub mod ids;
pub mod ports;
pub mod scheduling_policy;
pub mod slot;

pub use self::appointment::{
    Appointment, AppointmentDraft, AppointmentStatus, AppointmentValidationError, BookingFlow,
    Cancellation, LifecycleEvent, MAX_NOTE_LENGTH, TransitionContext, TransitionError,
    TransitionOutcome,
};
pub use self::authorization::{Action, Actor, ListScope, Ownership, Role, can};
pub use self::availability::{AvailabilityChecker, slot_is_free};
pub use self::booking_service::BookingService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{ActorId, AppointmentId, ClientId, IdValidationError, ServiceId, StaffId};
pub use self::scheduling_policy::SchedulingPolicy;
pub use self::slot::{CancellationBuffer, ServiceDuration, SlotValidationError, TimeSlot};

/// Result alias for driving port operations.
///
/// # Examples
/// ```
/// use appointments::domain::{DomainResult, Error};
///
/// fn refuse() -> DomainResult<()> {
///     Err(Error::authorization_denied("nope"))
/// }
/// assert!(refuse().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
