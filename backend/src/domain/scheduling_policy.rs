//! Business rules the booking service applies to every request.

use pagination::{PageRequest, PaginationError};

use crate::domain::{BookingFlow, CancellationBuffer};

/// Configurable scheduling rules.
///
/// # Examples
///
/// ```
/// use appointments::domain::{BookingFlow, SchedulingPolicy};
///
/// let policy = SchedulingPolicy::default();
/// assert_eq!(policy.buffer.minutes(), 180);
/// assert_eq!(policy.flow, BookingFlow::RequireConfirmation);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingPolicy {
    /// Lead time below which non-admins may not cancel or reschedule.
    pub buffer: CancellationBuffer,
    pub flow: BookingFlow,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl SchedulingPolicy {
    /// Three hours, matching the usual salon cancellation rule.
    pub const DEFAULT_BUFFER_MINUTES: u32 = 180;
    pub const DEFAULT_PAGE_SIZE: u32 = 20;
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Build a validated page request from optional caller input.
    ///
    /// Missing values fall back to page 1 and the default size; oversized
    /// pages are clamped to `max_page_size`. Explicit zeros are rejected.
    pub fn page_request(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<PageRequest, PaginationError> {
        let request = PageRequest::new(
            page.unwrap_or(1),
            page_size.unwrap_or(self.default_page_size),
        )?;
        Ok(request.clamped(self.max_page_size))
    }
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            buffer: CancellationBuffer::from_minutes(Self::DEFAULT_BUFFER_MINUTES),
            flow: BookingFlow::RequireConfirmation,
            default_page_size: Self::DEFAULT_PAGE_SIZE,
            max_page_size: Self::MAX_PAGE_SIZE,
        }
    }
}
