//! Port for appointment persistence with slot exclusion semantics.
//!
//! Adapters must make `insert` and `update` atomic with respect to the
//! staff member's live appointments: a write that would leave two
//! non-deleted appointments for the same staff overlapping is rejected with
//! [`AppointmentRepositoryError::SlotTaken`]. Databases usually express this
//! as an exclusion constraint on `(staff_id, tstzrange(start, end))`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::{
    Appointment, AppointmentId, AppointmentStatus, ClientId, StaffId, TimeSlot,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by appointment repository adapters.
    pub enum AppointmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "appointment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "appointment repository query failed: {message}",
        /// The write would overlap a live appointment of the same staff member.
        SlotTaken { staff_id: String } =>
            "staff {staff_id} already has an appointment in this slot",
        /// The stored revision differs from the one the caller read.
        VersionMismatch { expected: u64, actual: u64 } =>
            "appointment version mismatch: expected {expected}, found {actual}",
        /// The appointment to update does not exist.
        Missing { appointment_id: String } =>
            "appointment {appointment_id} does not exist",
    }
}

/// Optional window restricting listings to appointments that overlap it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    /// True when `slot` overlaps `[from, until)`; open bounds are unbounded.
    pub fn overlaps(&self, slot: &TimeSlot) -> bool {
        let after_start = self.from.is_none_or(|from| slot.end() > from);
        let before_end = self.until.is_none_or(|until| slot.start() < until);
        after_start && before_end
    }
}

/// Listing filter. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentFilter {
    pub staff_id: Option<StaffId>,
    pub client_id: Option<ClientId>,
    pub status: Option<AppointmentStatus>,
    pub date_range: DateRange,
    /// Case-insensitive substring the booking note must contain.
    pub notes_contains: Option<String>,
    pub include_deleted: bool,
}

impl AppointmentFilter {
    /// Reference predicate for adapters that filter in process.
    pub fn matches(&self, appointment: &Appointment) -> bool {
        if appointment.is_deleted() && !self.include_deleted {
            return false;
        }
        self.staff_id.is_none_or(|id| appointment.staff_id() == id)
            && self.client_id.is_none_or(|id| appointment.client_id() == id)
            && self.status.is_none_or(|status| appointment.status() == status)
            && self.date_range.overlaps(&appointment.slot())
            && self.notes_match(appointment.notes())
    }

    fn notes_match(&self, notes: Option<&str>) -> bool {
        let Some(needle) = self.notes_contains.as_deref() else {
            return true;
        };
        notes.is_some_and(|notes| notes.to_lowercase().contains(&needle.to_lowercase()))
    }
}

/// Port for reading and writing appointments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Find an appointment by id, including soft-deleted ones.
    async fn find_by_id(
        &self,
        id: &AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError>;

    /// Live appointments of `staff_id` whose slot overlaps `slot`.
    async fn find_active_overlapping(
        &self,
        staff_id: &StaffId,
        slot: &TimeSlot,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError>;

    /// Insert a new appointment, atomically rejecting overlaps.
    async fn insert(&self, appointment: &Appointment) -> Result<(), AppointmentRepositoryError>;

    /// Replace the stored appointment if its version still equals
    /// `expected_version`.
    async fn update(
        &self,
        appointment: &Appointment,
        expected_version: u64,
    ) -> Result<(), AppointmentRepositoryError>;

    /// One page of appointments matching `filter`, ordered by start time.
    async fn list(
        &self,
        filter: &AppointmentFilter,
        page: PageRequest,
    ) -> Result<Page<Appointment>, AppointmentRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAppointmentRepository;

#[async_trait]
impl AppointmentRepository for FixtureAppointmentRepository {
    async fn find_by_id(
        &self,
        _id: &AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        Ok(None)
    }

    async fn find_active_overlapping(
        &self,
        _staff_id: &StaffId,
        _slot: &TimeSlot,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        Ok(Vec::new())
    }

    async fn insert(&self, _appointment: &Appointment) -> Result<(), AppointmentRepositoryError> {
        Ok(())
    }

    async fn update(
        &self,
        _appointment: &Appointment,
        _expected_version: u64,
    ) -> Result<(), AppointmentRepositoryError> {
        Ok(())
    }

    async fn list(
        &self,
        _filter: &AppointmentFilter,
        page: PageRequest,
    ) -> Result<Page<Appointment>, AppointmentRepositoryError> {
        Ok(Page::empty(page))
    }
}
