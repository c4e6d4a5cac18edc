//! Scheduling configuration loaded via OrthoConfig.
//!
//! Values layer CLI arguments over `SCHEDULING_*` environment variables and
//! configuration files. Unset fields fall back to the defaults on
//! [`SchedulingPolicy`].

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{BookingFlow, CancellationBuffer, SchedulingPolicy};

/// Configuration values controlling scheduling rules.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SCHEDULING")]
pub struct SchedulingSettings {
    /// Minutes before the start after which non-admins may not cancel.
    pub cancellation_buffer_minutes: Option<u32>,
    /// Book appointments directly as confirmed.
    #[ortho_config(default = false)]
    pub auto_confirm: bool,
    /// Page size used when a listing does not ask for one.
    pub default_page_size: Option<u32>,
    /// Upper bound for requested page sizes.
    pub max_page_size: Option<u32>,
}

impl SchedulingSettings {
    /// Configured buffer, defaulting to three hours.
    pub fn cancellation_buffer_minutes(&self) -> u32 {
        self.cancellation_buffer_minutes
            .unwrap_or(SchedulingPolicy::DEFAULT_BUFFER_MINUTES)
    }

    /// Configured maximum page size, never below 1.
    pub fn max_page_size(&self) -> u32 {
        self.max_page_size
            .unwrap_or(SchedulingPolicy::MAX_PAGE_SIZE)
            .max(1)
    }

    /// Configured default page size, kept within `1..=max_page_size`.
    pub fn default_page_size(&self) -> u32 {
        self.default_page_size
            .unwrap_or(SchedulingPolicy::DEFAULT_PAGE_SIZE)
            .clamp(1, self.max_page_size())
    }

    /// Auto-confirm when `auto_confirm` is set.
    pub fn booking_flow(&self) -> BookingFlow {
        if self.auto_confirm {
            BookingFlow::AutoConfirm
        } else {
            BookingFlow::RequireConfirmation
        }
    }

    /// Domain policy built from these settings.
    pub fn policy(&self) -> SchedulingPolicy {
        SchedulingPolicy {
            buffer: CancellationBuffer::from_minutes(self.cancellation_buffer_minutes()),
            flow: self.booking_flow(),
            default_page_size: self.default_page_size(),
            max_page_size: self.max_page_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for scheduling configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const KEYS: [&str; 4] = [
        "SCHEDULING_CANCELLATION_BUFFER_MINUTES",
        "SCHEDULING_AUTO_CONFIRM",
        "SCHEDULING_DEFAULT_PAGE_SIZE",
        "SCHEDULING_MAX_PAGE_SIZE",
    ];

    fn load_from_empty_args() -> SchedulingSettings {
        SchedulingSettings::load_from_iter([OsString::from("appointments")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(KEYS.map(|key| (key, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.policy(), SchedulingPolicy::default());
        assert_eq!(settings.booking_flow(), BookingFlow::RequireConfirmation);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (KEYS[0], Some("120".to_owned())),
            (KEYS[1], Some("true".to_owned())),
            (KEYS[2], Some("10".to_owned())),
            (KEYS[3], Some("50".to_owned())),
        ]);

        let policy = load_from_empty_args().policy();
        assert_eq!(policy.buffer.minutes(), 120);
        assert_eq!(policy.flow, BookingFlow::AutoConfirm);
        assert_eq!(policy.default_page_size, 10);
        assert_eq!(policy.max_page_size, 50);
    }

    #[rstest]
    fn default_page_size_never_exceeds_maximum() {
        let _guard = lock_env([
            (KEYS[0], None::<String>),
            (KEYS[1], None::<String>),
            (KEYS[2], Some("500".to_owned())),
            (KEYS[3], Some("25".to_owned())),
        ]);

        let policy = load_from_empty_args().policy();
        assert_eq!(policy.default_page_size, 25);
    }
}
