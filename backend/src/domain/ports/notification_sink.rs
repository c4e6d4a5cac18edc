//! Port for fire-and-forget appointment notifications.
//!
//! Delivery, retries and templating belong to the notification collaborator.
//! The scheduler only hands over `(appointment, event, recipient)` after the
//! change has been committed.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{AppointmentId, ClientId, StaffId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification adapters.
    pub enum NotificationSinkError {
        /// The message could not be handed to the transport.
        Dispatch { message: String } =>
            "notification dispatch failed: {message}",
    }
}

/// Event a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Booked,
    Rescheduled,
    Cancelled,
    Completed,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Booked => "booked",
            Self::Rescheduled => "rescheduled",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Party that should hear about the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "id")]
pub enum Recipient {
    Client(ClientId),
    Staff(StaffId),
}

/// One outbound notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub appointment_id: AppointmentId,
    pub kind: NotificationKind,
    pub recipient: Recipient,
}

/// Port for dispatching notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Hand a notification to the transport without waiting for delivery.
    async fn dispatch(&self, notification: &Notification) -> Result<(), NotificationSinkError>;
}

/// Fixture implementation that drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationSink;

#[async_trait]
impl NotificationSink for FixtureNotificationSink {
    async fn dispatch(&self, _notification: &Notification) -> Result<(), NotificationSinkError> {
        Ok(())
    }
}
