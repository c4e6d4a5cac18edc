//! In-process appointment store.
//!
//! Check-and-write happens under one lock, which gives the same guarantee a
//! database exclusion constraint on `(staff_id, slot)` would: of two
//! overlapping writers, exactly one commits. The lock is never held across
//! an `.await`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::ports::{AppointmentFilter, AppointmentRepository, AppointmentRepositoryError};
use crate::domain::{Appointment, AppointmentId, StaffId, TimeSlot, slot_is_free};

type Store = HashMap<AppointmentId, Appointment>;

/// Appointment repository backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryAppointmentRepository {
    appointments: Mutex<Store>,
}

impl InMemoryAppointmentRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored appointment, including cancelled ones, ordered by start.
    pub fn snapshot(&self) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        let store = self.lock()?;
        Ok(sorted(store.values().cloned().collect()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, AppointmentRepositoryError> {
        self.appointments
            .lock()
            .map_err(|_| AppointmentRepositoryError::query("appointment store lock poisoned"))
    }
}

fn sorted(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
    appointments.sort_by_key(|appointment| (appointment.slot().start(), appointment.id()));
    appointments
}

fn ensure_slot_free(
    store: &Store,
    appointment: &Appointment,
) -> Result<(), AppointmentRepositoryError> {
    if !appointment.blocks_slot() {
        return Ok(());
    }
    let same_staff: Vec<Appointment> = store
        .values()
        .filter(|other| other.staff_id() == appointment.staff_id())
        .cloned()
        .collect();
    if slot_is_free(
        appointment.staff_id(),
        &same_staff,
        &appointment.slot(),
        Some(appointment.id()),
    ) {
        Ok(())
    } else {
        Err(AppointmentRepositoryError::slot_taken(
            appointment.staff_id().to_string(),
        ))
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn find_by_id(
        &self,
        id: &AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn find_active_overlapping(
        &self,
        staff_id: &StaffId,
        slot: &TimeSlot,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        let store = self.lock()?;
        Ok(sorted(
            store
                .values()
                .filter(|appointment| {
                    appointment.staff_id() == *staff_id
                        && appointment.blocks_slot()
                        && appointment.slot().overlaps(slot)
                })
                .cloned()
                .collect(),
        ))
    }

    async fn insert(&self, appointment: &Appointment) -> Result<(), AppointmentRepositoryError> {
        let mut store = self.lock()?;
        if store.contains_key(&appointment.id()) {
            return Err(AppointmentRepositoryError::query(format!(
                "appointment {} already exists",
                appointment.id()
            )));
        }
        ensure_slot_free(&store, appointment)?;
        store.insert(appointment.id(), appointment.clone());
        Ok(())
    }

    async fn update(
        &self,
        appointment: &Appointment,
        expected_version: u64,
    ) -> Result<(), AppointmentRepositoryError> {
        let mut store = self.lock()?;
        let actual = store
            .get(&appointment.id())
            .map(Appointment::version)
            .ok_or_else(|| AppointmentRepositoryError::missing(appointment.id().to_string()))?;
        if actual != expected_version {
            return Err(AppointmentRepositoryError::version_mismatch(
                expected_version,
                actual,
            ));
        }
        ensure_slot_free(&store, appointment)?;
        store.insert(appointment.id(), appointment.clone());
        Ok(())
    }

    async fn list(
        &self,
        filter: &AppointmentFilter,
        page: PageRequest,
    ) -> Result<Page<Appointment>, AppointmentRepositoryError> {
        let matching = {
            let store = self.lock()?;
            sorted(
                store
                    .values()
                    .filter(|appointment| filter.matches(appointment))
                    .cloned()
                    .collect(),
            )
        };
        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.page_size()).unwrap_or(usize::MAX);
        let items = matching.into_iter().skip(skip).take(take).collect();
        Ok(Page::new(items, page, total))
    }
}
