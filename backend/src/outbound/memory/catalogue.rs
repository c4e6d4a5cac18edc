//! In-process catalogue of clients, staff and services.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    CatalogueLookup, CatalogueLookupError, CatalogueStatus, ServiceDefinition,
};
use crate::domain::{ClientId, ServiceId, StaffId};

#[derive(Debug, Default)]
struct Entries {
    services: HashMap<ServiceId, ServiceDefinition>,
    clients: HashMap<ClientId, CatalogueStatus>,
    staff: HashMap<StaffId, CatalogueStatus>,
}

/// Catalogue lookup backed by in-memory maps.
///
/// Registration methods replace existing entries, so deactivating a record
/// is just registering it again as [`CatalogueStatus::Inactive`].
#[derive(Debug, Default)]
pub struct InMemoryCatalogue {
    entries: RwLock<Entries>,
}

impl InMemoryCatalogue {
    /// Empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a service definition.
    pub fn register_service(&self, service: ServiceDefinition) {
        self.write().services.insert(service.id, service);
    }

    /// Set a client's status.
    pub fn register_client(&self, id: ClientId, status: CatalogueStatus) {
        self.write().clients.insert(id, status);
    }

    /// Set a staff member's status.
    pub fn register_staff(&self, id: StaffId, status: CatalogueStatus) {
        self.write().staff.insert(id, status);
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Entries>, CatalogueLookupError> {
        self.entries
            .read()
            .map_err(|_| CatalogueLookupError::query("catalogue lock poisoned"))
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl CatalogueLookup for InMemoryCatalogue {
    async fn service(
        &self,
        id: &ServiceId,
    ) -> Result<Option<ServiceDefinition>, CatalogueLookupError> {
        Ok(self.read()?.services.get(id).cloned())
    }

    async fn client_status(
        &self,
        id: &ClientId,
    ) -> Result<Option<CatalogueStatus>, CatalogueLookupError> {
        Ok(self.read()?.clients.get(id).copied())
    }

    async fn staff_status(
        &self,
        id: &StaffId,
    ) -> Result<Option<CatalogueStatus>, CatalogueLookupError> {
        Ok(self.read()?.staff.get(id).copied())
    }
}
