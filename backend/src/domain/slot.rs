//! Time and slot value types.
//!
//! A [`TimeSlot`] is a half-open interval `[start, end)` stored in UTC.
//! Constructors accept any `chrono` time zone and normalise on entry, so
//! comparisons never mix offsets. Two slots overlap iff
//! `a.start < b.end && b.start < a.end`; touching slots do not overlap.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Errors raised while building slot values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotValidationError {
    /// The interval end does not lie after its start.
    #[error("slot end {end} must be after start {start}")]
    EmptyInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Service durations must be strictly positive.
    #[error("duration must be positive, got {minutes} minutes")]
    NonPositiveDuration { minutes: i64 },
    /// The computed end falls outside the representable time range.
    #[error("slot end is out of the supported time range")]
    OutOfRange,
}

/// Fixed length of a service, captured when an appointment is booked.
///
/// # Examples
///
/// ```
/// use appointments::domain::ServiceDuration;
///
/// let duration = ServiceDuration::from_minutes(60)?;
/// assert_eq!(duration.minutes(), 60);
/// assert!(ServiceDuration::from_minutes(0).is_err());
/// # Ok::<(), appointments::domain::SlotValidationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceDuration(TimeDelta);

impl ServiceDuration {
    /// Build a duration from whole minutes, rejecting zero and negatives.
    pub fn from_minutes(minutes: i64) -> Result<Self, SlotValidationError> {
        if minutes <= 0 {
            return Err(SlotValidationError::NonPositiveDuration { minutes });
        }
        TimeDelta::try_minutes(minutes)
            .map(Self)
            .ok_or(SlotValidationError::OutOfRange)
    }

    /// Length in whole minutes.
    pub fn minutes(&self) -> i64 {
        self.0.num_minutes()
    }

    /// Length as a `chrono` delta.
    pub fn as_delta(&self) -> TimeDelta {
        self.0
    }
}

/// Half-open UTC interval `[start, end)`.
///
/// # Examples
///
/// ```
/// use appointments::domain::{ServiceDuration, TimeSlot};
/// use chrono::{TimeZone, Utc};
///
/// let ten = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
/// let hour = ServiceDuration::from_minutes(60)?;
/// let first = TimeSlot::starting_at(ten, hour)?;
/// let second = TimeSlot::starting_at(first.end(), hour)?;
/// assert!(!first.overlaps(&second));
/// # Ok::<(), appointments::domain::SlotValidationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "TimeSlotDto", into = "TimeSlotDto")]
pub struct TimeSlot {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeSlot {
    /// Build a slot from explicit bounds, normalising both to UTC.
    pub fn new<Tz: TimeZone>(
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> Result<Self, SlotValidationError> {
        let start = start.with_timezone(&Utc);
        let end = end.with_timezone(&Utc);
        if end <= start {
            return Err(SlotValidationError::EmptyInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Build the slot `[start, start + duration)`.
    pub fn starting_at<Tz: TimeZone>(
        start: DateTime<Tz>,
        duration: ServiceDuration,
    ) -> Result<Self, SlotValidationError> {
        let start = start.with_timezone(&Utc);
        let end = start
            .checked_add_signed(duration.as_delta())
            .ok_or(SlotValidationError::OutOfRange)?;
        Self::new(start, end)
    }

    /// Inclusive start instant.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end instant.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Length of the slot.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Strict half-open overlap test.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `instant` lies within `[start, end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Same length, moved to begin at `start`.
    pub fn moved_to<Tz: TimeZone>(&self, start: DateTime<Tz>) -> Result<Self, SlotValidationError> {
        let start = start.with_timezone(&Utc);
        let end = start
            .checked_add_signed(self.duration())
            .ok_or(SlotValidationError::OutOfRange)?;
        Self::new(start, end)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeSlotDto {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl From<TimeSlot> for TimeSlotDto {
    fn from(value: TimeSlot) -> Self {
        Self {
            start: value.start,
            end: value.end,
        }
    }
}

impl TryFrom<TimeSlotDto> for TimeSlot {
    type Error = SlotValidationError;

    fn try_from(value: TimeSlotDto) -> Result<Self, Self::Error> {
        Self::new(value.start, value.end)
    }
}

/// Minimum lead time before an appointment below which ordinary
/// cancellation is refused.
///
/// # Examples
///
/// ```
/// use appointments::domain::CancellationBuffer;
/// use chrono::{TimeZone, Utc};
///
/// let buffer = CancellationBuffer::from_minutes(120);
/// let start = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
/// assert!(buffer.permits(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(), start));
/// assert!(!buffer.permits(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(), start));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CancellationBuffer(TimeDelta);

impl CancellationBuffer {
    /// Buffer of `minutes` minutes; zero disables the rule.
    pub fn from_minutes(minutes: u32) -> Self {
        Self(TimeDelta::minutes(i64::from(minutes)))
    }

    /// Buffer length in whole minutes.
    pub fn minutes(&self) -> i64 {
        self.0.num_minutes()
    }

    /// Latest instant at which an appointment starting at `start` may still
    /// be cancelled without an override.
    pub fn deadline_for(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start
            .checked_sub_signed(self.0)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// True when `now <= start - buffer`.
    pub fn permits(&self, now: DateTime<Utc>, start: DateTime<Utc>) -> bool {
        now <= self.deadline_for(start)
    }
}
