//! Appointment scheduling and lifecycle core.
//!
//! The crate is laid out hexagonally: `domain` holds value types, the
//! lifecycle state machine, authorisation and the booking service behind
//! driving ports; `outbound` holds adapters for the driven ports; `config`
//! loads scheduling settings.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
