//! Appointment aggregate and its lifecycle state machine.
//!
//! The lifecycle is held in a single private state enum. Status, the soft
//! delete flag and the audit timestamps are all derived from it, so
//! `status == cancelled`, `is_deleted()` and `cancelled_at().is_some()` can
//! never disagree. Transitions are pure: they return a new snapshot with the
//! version bumped and never touch the original.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    ActorId, AppointmentId, CancellationBuffer, ClientId, Ownership, ServiceId, StaffId, TimeSlot,
};

/// Longest accepted booking note or cancellation reason, in characters.
pub const MAX_NOTE_LENGTH: usize = 1_000;

/// Externally visible lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Stable lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// True for states no event can leave.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle events a caller may request on an existing appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    Confirm,
    Cancel,
    Complete,
}

impl LifecycleEvent {
    /// Stable lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether new bookings wait for staff confirmation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookingFlow {
    /// Bookings start `pending` and staff confirm them.
    #[default]
    RequireConfirmation,
    /// Bookings start `confirmed`; a later confirm is a no-op.
    AutoConfirm,
}

/// Who cancelled, when, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cancellation {
    pub cancelled_at: DateTime<Utc>,
    pub cancelled_by: ActorId,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LifecycleState {
    Pending,
    Confirmed,
    Completed { completed_at: DateTime<Utc> },
    Cancelled(Cancellation),
}

impl LifecycleState {
    fn status(&self) -> AppointmentStatus {
        match self {
            Self::Pending => AppointmentStatus::Pending,
            Self::Confirmed => AppointmentStatus::Confirmed,
            Self::Completed { .. } => AppointmentStatus::Completed,
            Self::Cancelled(_) => AppointmentStatus::Cancelled,
        }
    }
}

/// Validation errors raised when booking.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppointmentValidationError {
    #[error("appointment start {start} is before the booking time {now}")]
    StartsInPast {
        start: DateTime<Utc>,
        now: DateTime<Utc>,
    },
    #[error("text must be at most {max} characters")]
    TextTooLong { max: usize },
}

/// Reasons a lifecycle transition is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The event is not defined for the current state.
    #[error("cannot {event} an appointment that is {from}")]
    NotPermitted {
        from: AppointmentStatus,
        event: LifecycleEvent,
    },
    /// Rescheduling is only possible before the appointment ends its lifecycle.
    #[error("cannot reschedule an appointment that is {from}")]
    RescheduleNotPermitted { from: AppointmentStatus },
    /// Ordinary cancellation closed at `deadline`.
    #[error("changes closed at {deadline}")]
    InsideCancellationBuffer { deadline: DateTime<Utc> },
    /// Completion before the appointment starts.
    #[error("appointment has not started yet; it starts at {starts_at}")]
    NotYetStarted { starts_at: DateTime<Utc> },
    /// A rescheduled slot must not start in the past.
    #[error("new start {start} is in the past")]
    StartsInPast { start: DateTime<Utc> },
    #[error(transparent)]
    InvalidText(#[from] AppointmentValidationError),
}

/// Input for [`Appointment::book`].
#[derive(Debug, Clone)]
pub struct AppointmentDraft {
    pub id: AppointmentId,
    pub client_id: ClientId,
    pub staff_id: StaffId,
    pub service_id: ServiceId,
    pub slot: TimeSlot,
    pub notes: Option<String>,
    pub booked_at: DateTime<Utc>,
    pub flow: BookingFlow,
}

/// Everything a transition needs beyond the appointment itself.
#[derive(Debug, Clone)]
pub struct TransitionContext {
    /// Trusted clock reading.
    pub now: DateTime<Utc>,
    /// Actor recorded on cancellations.
    pub actor_id: ActorId,
    /// Lets administrators cancel or reschedule inside the buffer.
    pub bypass_buffer: bool,
    pub buffer: CancellationBuffer,
    pub flow: BookingFlow,
    /// Optional cancellation reason; ignored by other events.
    pub reason: Option<String>,
}

/// Result of applying an event.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// A new snapshot that must be persisted.
    Applied(Appointment),
    /// Nothing changed; the original snapshot stays current.
    Unchanged,
}

/// An appointment binding a client, a staff member and a service to a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    id: AppointmentId,
    client_id: ClientId,
    staff_id: StaffId,
    service_id: ServiceId,
    slot: TimeSlot,
    notes: Option<String>,
    state: LifecycleState,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Create a freshly booked appointment at version 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use appointments::domain::{
    ///     Appointment, AppointmentDraft, AppointmentId, AppointmentStatus, BookingFlow,
    ///     ClientId, ServiceDuration, ServiceId, StaffId, TimeSlot,
    /// };
    /// use chrono::{TimeZone, Utc};
    ///
    /// let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    /// let slot = TimeSlot::starting_at(
    ///     Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
    ///     ServiceDuration::from_minutes(45).unwrap(),
    /// )
    /// .unwrap();
    /// let appointment = Appointment::book(AppointmentDraft {
    ///     id: AppointmentId::random(),
    ///     client_id: ClientId::random(),
    ///     staff_id: StaffId::random(),
    ///     service_id: ServiceId::random(),
    ///     slot,
    ///     notes: None,
    ///     booked_at: now,
    ///     flow: BookingFlow::RequireConfirmation,
    /// })
    /// .unwrap();
    /// assert_eq!(appointment.status(), AppointmentStatus::Pending);
    /// assert_eq!(appointment.version(), 1);
    /// ```
    pub fn book(draft: AppointmentDraft) -> Result<Self, AppointmentValidationError> {
        if draft.slot.start() < draft.booked_at {
            return Err(AppointmentValidationError::StartsInPast {
                start: draft.slot.start(),
                now: draft.booked_at,
            });
        }
        let notes = normalise_text(draft.notes)?;
        let state = match draft.flow {
            BookingFlow::RequireConfirmation => LifecycleState::Pending,
            BookingFlow::AutoConfirm => LifecycleState::Confirmed,
        };
        Ok(Self {
            id: draft.id,
            client_id: draft.client_id,
            staff_id: draft.staff_id,
            service_id: draft.service_id,
            slot: draft.slot,
            notes,
            state,
            version: 1,
            created_at: draft.booked_at,
            updated_at: draft.booked_at,
        })
    }

    /// Stable identifier assigned at booking.
    pub fn id(&self) -> AppointmentId {
        self.id
    }

    /// Client the appointment was booked for.
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Staff member whose calendar holds the slot.
    pub fn staff_id(&self) -> StaffId {
        self.staff_id
    }

    /// Booked catalogue service.
    pub fn service_id(&self) -> ServiceId {
        self.service_id
    }

    /// Current half-open interval.
    pub fn slot(&self) -> TimeSlot {
        self.slot
    }

    /// Trimmed booking note, if any.
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Monotonic revision used for optimistic concurrency.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Booking time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last committed change.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Status derived from the lifecycle state.
    pub fn status(&self) -> AppointmentStatus {
        self.state.status()
    }

    /// Soft-delete flag. Only cancellation sets it.
    pub fn is_deleted(&self) -> bool {
        matches!(self.state, LifecycleState::Cancelled(_))
    }

    /// Cancellation record for cancelled appointments.
    pub fn cancellation(&self) -> Option<&Cancellation> {
        match &self.state {
            LifecycleState::Cancelled(cancellation) => Some(cancellation),
            _ => None,
        }
    }

    /// When the appointment was cancelled.
    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancellation().map(|c| c.cancelled_at)
    }

    /// Soft-delete timestamp; identical to [`Self::cancelled_at`].
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at()
    }

    /// When the appointment was completed.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            LifecycleState::Completed { completed_at } => Some(completed_at),
            _ => None,
        }
    }

    /// Parties that own this appointment for authorisation purposes.
    pub fn ownership(&self) -> Ownership {
        Ownership {
            client_id: self.client_id,
            staff_id: self.staff_id,
        }
    }

    /// True while the appointment occupies its staff member's calendar.
    pub fn blocks_slot(&self) -> bool {
        !self.is_deleted()
    }

    /// Apply `event` and return the resulting snapshot.
    ///
    /// | from | event | to |
    /// |---|---|---|
    /// | pending | confirm | confirmed |
    /// | confirmed | confirm | unchanged under [`BookingFlow::AutoConfirm`] |
    /// | pending, confirmed | cancel | cancelled, subject to the buffer |
    /// | confirmed | complete | completed, once started |
    ///
    /// Every other pair is [`TransitionError::NotPermitted`].
    pub fn apply(
        &self,
        event: LifecycleEvent,
        ctx: &TransitionContext,
    ) -> Result<TransitionOutcome, TransitionError> {
        let not_permitted = || TransitionError::NotPermitted {
            from: self.status(),
            event,
        };
        let next = match (&self.state, event) {
            (LifecycleState::Pending, LifecycleEvent::Confirm) => LifecycleState::Confirmed,
            (LifecycleState::Confirmed, LifecycleEvent::Confirm) => {
                return match ctx.flow {
                    BookingFlow::AutoConfirm => Ok(TransitionOutcome::Unchanged),
                    BookingFlow::RequireConfirmation => Err(not_permitted()),
                };
            }
            (LifecycleState::Pending | LifecycleState::Confirmed, LifecycleEvent::Cancel) => {
                self.ensure_outside_buffer(ctx)?;
                LifecycleState::Cancelled(Cancellation {
                    cancelled_at: ctx.now,
                    cancelled_by: ctx.actor_id,
                    reason: normalise_text(ctx.reason.clone())?,
                })
            }
            (LifecycleState::Confirmed, LifecycleEvent::Complete) => {
                if ctx.now < self.slot.start() {
                    return Err(TransitionError::NotYetStarted {
                        starts_at: self.slot.start(),
                    });
                }
                LifecycleState::Completed {
                    completed_at: ctx.now,
                }
            }
            _ => return Err(not_permitted()),
        };
        Ok(TransitionOutcome::Applied(self.advance(ctx.now, |a| {
            a.state = next;
        })))
    }

    /// Move a live appointment to `slot`, keeping its status.
    ///
    /// The buffer is measured against the current start: a booking that can
    /// no longer be cancelled can no longer be moved either.
    pub fn reschedule(
        &self,
        slot: TimeSlot,
        ctx: &TransitionContext,
    ) -> Result<Self, TransitionError> {
        if self.status().is_terminal() {
            return Err(TransitionError::RescheduleNotPermitted {
                from: self.status(),
            });
        }
        if slot.start() < ctx.now {
            return Err(TransitionError::StartsInPast {
                start: slot.start(),
            });
        }
        self.ensure_outside_buffer(ctx)?;
        Ok(self.advance(ctx.now, |a| {
            a.slot = slot;
        }))
    }

    fn ensure_outside_buffer(&self, ctx: &TransitionContext) -> Result<(), TransitionError> {
        if ctx.bypass_buffer || ctx.buffer.permits(ctx.now, self.slot.start()) {
            return Ok(());
        }
        Err(TransitionError::InsideCancellationBuffer {
            deadline: ctx.buffer.deadline_for(self.slot.start()),
        })
    }

    fn advance(&self, now: DateTime<Utc>, change: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        change(&mut next);
        next.version = self.version.saturating_add(1);
        next.updated_at = now;
        next
    }
}

fn normalise_text(text: Option<String>) -> Result<Option<String>, AppointmentValidationError> {
    let Some(text) = text else {
        return Ok(None);
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_NOTE_LENGTH {
        return Err(AppointmentValidationError::TextTooLong {
            max: MAX_NOTE_LENGTH,
        });
    }
    Ok(Some(trimmed.to_owned()))
}
