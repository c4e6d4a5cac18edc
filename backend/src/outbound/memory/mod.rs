//! In-process adapters for persistence and catalogue ports.
//!
//! These back demos and integration tests. They implement the same
//! conflict semantics a database adapter must provide.

mod appointment_repository;
mod catalogue;

pub use appointment_repository::InMemoryAppointmentRepository;
pub use catalogue::InMemoryCatalogue;
