//! Strongly typed identifiers for appointments and catalogue references.
//!
//! Every identifier wraps a UUID and serialises as its hyphenated string
//! form. The wrappers are distinct types so a `StaffId` can never be passed
//! where a `ClientId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned when parsing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },
    #[error("{kind} must be a valid UUID")]
    Invalid { kind: &'static str },
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid);

        impl $name {
            /// Validate and construct the identifier from borrowed input.
            pub fn new(id: impl AsRef<str>) -> Result<Self, IdValidationError> {
                let raw = id.as_ref();
                if raw.is_empty() {
                    return Err(IdValidationError::Empty { kind: $kind });
                }
                if raw.trim() != raw {
                    return Err(IdValidationError::Invalid { kind: $kind });
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdValidationError::Invalid { kind: $kind })
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

define_id! {
    /// Opaque, immutable appointment identity.
    AppointmentId => "appointment id"
}

define_id! {
    /// Client identity owned by the client catalogue.
    ClientId => "client id"
}

define_id! {
    /// Staff member identity owned by the staff catalogue.
    StaffId => "staff id"
}

define_id! {
    /// Service identity owned by the service catalogue.
    ServiceId => "service id"
}

define_id! {
    /// Identity of the authenticated caller. For staff and clients it equals
    /// their catalogue id.
    ActorId => "actor id"
}

impl ActorId {
    /// True when this actor is the given staff member.
    pub fn is_staff(&self, staff_id: &StaffId) -> bool {
        self.as_uuid() == staff_id.as_uuid()
    }

    /// True when this actor is the given client.
    pub fn is_client(&self, client_id: &ClientId) -> bool {
        self.as_uuid() == client_id.as_uuid()
    }
}
