//! Driving port for appointment mutations.
//!
//! Inbound adapters translate transport requests into these payloads after
//! resolving the caller into an [`Actor`]. Timestamps may carry any UTC
//! offset; the domain normalises them on entry.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Actor, Appointment, AppointmentId, AppointmentStatus, ClientId, Error, LifecycleEvent,
    ServiceId, StaffId,
};

/// Serializable appointment snapshot returned by driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPayload {
    pub id: AppointmentId,
    pub client_id: ClientId,
    pub staff_id: StaffId,
    pub service_id: ServiceId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub version: u64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Appointment> for AppointmentPayload {
    fn from(value: &Appointment) -> Self {
        let slot = value.slot();
        Self {
            id: value.id(),
            client_id: value.client_id(),
            staff_id: value.staff_id(),
            service_id: value.service_id(),
            start: slot.start(),
            end: slot.end(),
            status: value.status(),
            notes: value.notes().map(str::to_owned),
            version: value.version(),
            is_deleted: value.is_deleted(),
            created_at: value.created_at(),
            updated_at: value.updated_at(),
            cancelled_at: value.cancelled_at(),
            cancellation_reason: value.cancellation().and_then(|c| c.reason.clone()),
            completed_at: value.completed_at(),
        }
    }
}

impl From<Appointment> for AppointmentPayload {
    fn from(value: Appointment) -> Self {
        Self::from(&value)
    }
}

/// Request to book a new appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub actor: Actor,
    pub client_id: ClientId,
    pub staff_id: StaffId,
    pub service_id: ServiceId,
    pub requested_start: DateTime<FixedOffset>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Response from booking an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentResponse {
    pub appointment: AppointmentPayload,
}

/// Request to apply a lifecycle event to an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionAppointmentRequest {
    pub actor: Actor,
    pub appointment_id: AppointmentId,
    pub event: LifecycleEvent,
    /// Recorded with cancellations, ignored otherwise.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Response from a lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionAppointmentResponse {
    pub appointment: AppointmentPayload,
    /// False when the event was accepted as a no-op.
    pub changed: bool,
}

/// Request to move an appointment to a new start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleAppointmentRequest {
    pub actor: Actor,
    pub appointment_id: AppointmentId,
    pub new_start: DateTime<FixedOffset>,
}

/// Response from rescheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleAppointmentResponse {
    pub appointment: AppointmentPayload,
}

/// Driving port for appointment write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingCommand: Send + Sync {
    /// Book a slot for a client with a staff member.
    ///
    /// Fails with `SlotConflict` when the staff member is busy, including
    /// when a concurrent booking wins the race.
    async fn book(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<BookAppointmentResponse, Error>;

    /// Confirm, cancel or complete an appointment.
    async fn transition(
        &self,
        request: TransitionAppointmentRequest,
    ) -> Result<TransitionAppointmentResponse, Error>;

    /// Move an appointment to a new start, keeping its duration.
    async fn reschedule(
        &self,
        request: RescheduleAppointmentRequest,
    ) -> Result<RescheduleAppointmentResponse, Error>;
}
