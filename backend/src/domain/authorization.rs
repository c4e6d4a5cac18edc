//! Role-scoped permission decisions.
//!
//! Roles are a closed set and [`can`] matches exhaustively over
//! `(role, action)`, so adding a role or action fails to compile until the
//! table is extended.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{ActorId, ClientId, LifecycleEvent, StaffId};

/// Role carried by an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Client,
}

/// Authenticated caller identity supplied by the inbound adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: ActorId,
    pub role: Role,
}

impl Actor {
    /// Administrator actor; admins have no catalogue identity.
    pub fn admin(id: ActorId) -> Self {
        Self {
            id,
            role: Role::Admin,
        }
    }

    /// Staff actor whose identity is their staff id.
    pub fn staff(staff_id: StaffId) -> Self {
        Self {
            id: ActorId::from_uuid(*staff_id.as_uuid()),
            role: Role::Staff,
        }
    }

    /// Client actor whose identity is their client id.
    pub fn client(client_id: ClientId) -> Self {
        Self {
            id: ActorId::from_uuid(*client_id.as_uuid()),
            role: Role::Client,
        }
    }

    /// True for administrators.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Operations subject to authorisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Book,
    Confirm,
    Cancel,
    Complete,
    Reschedule,
    View,
    ViewDeleted,
}

impl From<LifecycleEvent> for Action {
    fn from(value: LifecycleEvent) -> Self {
        match value {
            LifecycleEvent::Confirm => Self::Confirm,
            LifecycleEvent::Cancel => Self::Cancel,
            LifecycleEvent::Complete => Self::Complete,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Book => "book",
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
            Self::Reschedule => "reschedule",
            Self::View => "view",
            Self::ViewDeleted => "view deleted",
        };
        f.write_str(name)
    }
}

/// The parties an appointment (or a booking request) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ownership {
    pub client_id: ClientId,
    pub staff_id: StaffId,
}

/// Decide whether `actor` may perform `action` on a resource owned by
/// `ownership`.
///
/// # Examples
///
/// ```
/// use appointments::domain::{can, Action, Actor, ClientId, Ownership, StaffId};
///
/// let client_id = ClientId::random();
/// let ownership = Ownership { client_id, staff_id: StaffId::random() };
/// let client = Actor::client(client_id);
/// assert!(can(&client, Action::Cancel, &ownership));
/// assert!(!can(&client, Action::Complete, &ownership));
/// ```
pub fn can(actor: &Actor, action: Action, ownership: &Ownership) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Staff => {
            let assigned = actor.id.is_staff(&ownership.staff_id);
            match action {
                Action::Confirm
                | Action::Complete
                | Action::Cancel
                | Action::Reschedule
                | Action::View => assigned,
                Action::Book | Action::ViewDeleted => false,
            }
        }
        Role::Client => {
            let owner = actor.id.is_client(&ownership.client_id);
            match action {
                Action::Book | Action::Cancel | Action::Reschedule | Action::View => owner,
                Action::Confirm | Action::Complete | Action::ViewDeleted => false,
            }
        }
    }
}

/// Rows a listing may return for an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    Everything,
    Staff(StaffId),
    Client(ClientId),
}

impl ListScope {
    /// Narrowest scope matching the actor's role.
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.role {
            Role::Admin => Self::Everything,
            Role::Staff => Self::Staff(StaffId::from_uuid(*actor.id.as_uuid())),
            Role::Client => Self::Client(ClientId::from_uuid(*actor.id.as_uuid())),
        }
    }
}
