//! Driving port for appointment reads.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use pagination::Page;
use serde::{Deserialize, Serialize};

use crate::domain::{Actor, AppointmentId, AppointmentStatus, ClientId, Error, StaffId};

use super::AppointmentPayload;

/// Caller-supplied listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentFilters {
    pub staff_id: Option<StaffId>,
    pub client_id: Option<ClientId>,
    pub status: Option<AppointmentStatus>,
    /// Inclusive lower bound of the window appointments must overlap.
    pub from: Option<DateTime<FixedOffset>>,
    /// Exclusive upper bound of the window.
    pub until: Option<DateTime<FixedOffset>>,
    /// Free-text search over booking notes, ignoring case.
    pub notes_contains: Option<String>,
    /// Only honoured for administrators.
    pub include_deleted: bool,
}

/// Request for one page of appointments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAppointmentsRequest {
    pub actor: Actor,
    #[serde(default)]
    pub filters: AppointmentFilters,
    /// 1-based page number; defaults to the first page.
    #[serde(default)]
    pub page: Option<u32>,
    /// Defaults to the configured page size and is capped at the maximum.
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// Request for a single appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAppointmentRequest {
    pub actor: Actor,
    pub appointment_id: AppointmentId,
}

/// Response carrying a single appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAppointmentResponse {
    pub appointment: AppointmentPayload,
}

/// Driving port for appointment read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentsQuery: Send + Sync {
    /// List appointments visible to the actor.
    ///
    /// Staff only see their own calendar and clients their own bookings,
    /// whatever the filters say. Soft-deleted records appear only when an
    /// administrator sets `include_deleted`.
    async fn list_appointments(
        &self,
        request: ListAppointmentsRequest,
    ) -> Result<Page<AppointmentPayload>, Error>;

    /// Fetch one appointment. Records the actor may not see are reported as
    /// `NotFound`.
    async fn get_appointment(
        &self,
        request: GetAppointmentRequest,
    ) -> Result<GetAppointmentResponse, Error>;
}
