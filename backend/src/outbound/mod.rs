//! Outbound adapters implementing domain ports.
//!
//! - **memory**: in-process appointment store and catalogue
//! - **notifications**: `tracing`-backed notification sink
//!
//! Adapters are thin translators between domain types and their backing
//! store. They contain no business logic beyond the conflict semantics the
//! appointment repository port requires.

pub mod memory;
pub mod notifications;
