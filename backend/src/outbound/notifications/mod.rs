//! Notification sink that records dispatches as structured log events.
//!
//! Stands in for the email collaborator: it accepts every notification and
//! emits an `info` event carrying the appointment, kind and recipient.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{Notification, NotificationSink, NotificationSinkError, Recipient};

/// Logs each notification through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationSink;

impl TracingNotificationSink {
    /// Create the sink.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn dispatch(&self, notification: &Notification) -> Result<(), NotificationSinkError> {
        let (recipient_kind, recipient_id) = match notification.recipient {
            Recipient::Client(id) => ("client", id.to_string()),
            Recipient::Staff(id) => ("staff", id.to_string()),
        };
        info!(
            appointment_id = %notification.appointment_id,
            kind = %notification.kind,
            recipient_kind,
            recipient_id = %recipient_id,
            "appointment notification dispatched"
        );
        Ok(())
    }
}
