//! Test utilities for the appointments crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Only compiled for tests or with the `test-support` feature.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{Notification, NotificationSink, NotificationSinkError};

/// Clock whose reading only changes when a test moves it.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock that reads `now` until moved.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Jump to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    /// Move forward by `minutes`; negative values move back.
    pub fn advance_minutes(&self, minutes: i64) {
        *self.lock_clock() += TimeDelta::minutes(minutes);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Notification sink that remembers what it was given.
///
/// With [`RecordingNotificationSink::failing`] every dispatch is still
/// recorded but reported as failed.
#[derive(Debug, Default)]
pub struct RecordingNotificationSink {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotificationSink {
    /// Sink that records and accepts every notification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that records every notification and reports each as failed.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    /// Snapshot of every dispatched notification, oldest first.
    pub fn sent(&self) -> Vec<Notification> {
        self.lock_sent().clone()
    }

    fn lock_sent(&self) -> MutexGuard<'_, Vec<Notification>> {
        match self.sent.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn dispatch(&self, notification: &Notification) -> Result<(), NotificationSinkError> {
        self.lock_sent().push(*notification);
        if self.fail {
            return Err(NotificationSinkError::dispatch("recording sink set to fail"));
        }
        Ok(())
    }
}
