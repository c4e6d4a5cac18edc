//! Port for reading the client, staff and service catalogues.
//!
//! The scheduling core only needs to know whether a reference exists and is
//! active, plus the duration of a service. Everything else about catalogue
//! records is owned elsewhere.

use async_trait::async_trait;

use crate::domain::{ClientId, ServiceDuration, ServiceId, StaffId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalogue lookup adapters.
    pub enum CatalogueLookupError {
        /// Catalogue backend could not be reached.
        Connection { message: String } =>
            "catalogue connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } =>
            "catalogue query failed: {message}",
    }
}

/// Whether a catalogue entry may be used for new bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogueStatus {
    Active,
    /// Soft-deleted or retired. Existing appointments are unaffected.
    Inactive,
}

/// The parts of a service definition the scheduler depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub id: ServiceId,
    pub name: String,
    pub duration: ServiceDuration,
    pub status: CatalogueStatus,
}

/// Port for catalogue reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueLookup: Send + Sync {
    /// Fetch a service definition.
    async fn service(
        &self,
        id: &ServiceId,
    ) -> Result<Option<ServiceDefinition>, CatalogueLookupError>;

    /// Status of a client, or `None` when unknown.
    async fn client_status(
        &self,
        id: &ClientId,
    ) -> Result<Option<CatalogueStatus>, CatalogueLookupError>;

    /// Status of a staff member, or `None` when unknown.
    async fn staff_status(
        &self,
        id: &StaffId,
    ) -> Result<Option<CatalogueStatus>, CatalogueLookupError>;
}

/// Fixture implementation that knows no catalogue entries.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogueLookup;

#[async_trait]
impl CatalogueLookup for FixtureCatalogueLookup {
    async fn service(
        &self,
        _id: &ServiceId,
    ) -> Result<Option<ServiceDefinition>, CatalogueLookupError> {
        Ok(None)
    }

    async fn client_status(
        &self,
        _id: &ClientId,
    ) -> Result<Option<CatalogueStatus>, CatalogueLookupError> {
        Ok(None)
    }

    async fn staff_status(
        &self,
        _id: &StaffId,
    ) -> Result<Option<CatalogueStatus>, CatalogueLookupError> {
        Ok(None)
    }
}
