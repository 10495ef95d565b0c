//! Node timestamps in FILETIME layout.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// 100 ns ticks between 1601-01-01 and 1970-01-01.
const UNIX_EPOCH_TICKS: u64 = 116_444_736_000_000_000;

const TICKS_PER_SECOND: u64 = 10_000_000;

/// A timestamp counted in 100 ns ticks since 1601-01-01 UTC.
///
/// The zero value is the "empty" sentinel: passing it to a setter leaves the
/// stored value unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FileTime(u64);

impl FileTime {
    /// The "leave unchanged" sentinel.
    pub const EMPTY: FileTime = FileTime(0);

    #[inline]
    pub const fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    #[inline]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Converts a `SystemTime`, saturating at the FILETIME range bounds.
    pub fn from_system_time(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self(UNIX_EPOCH_TICKS.saturating_add(duration_to_ticks(after))),
            Err(before) => {
                Self(UNIX_EPOCH_TICKS.saturating_sub(duration_to_ticks(before.duration())))
            }
        }
    }

    /// Converts back to `SystemTime`. Returns `None` for the empty sentinel.
    pub fn to_system_time(self) -> Option<SystemTime> {
        if self.is_empty() {
            return None;
        }
        if self.0 >= UNIX_EPOCH_TICKS {
            UNIX_EPOCH.checked_add(ticks_to_duration(self.0 - UNIX_EPOCH_TICKS))
        } else {
            UNIX_EPOCH.checked_sub(ticks_to_duration(UNIX_EPOCH_TICKS - self.0))
        }
    }
}

fn duration_to_ticks(d: Duration) -> u64 {
    d.as_secs()
        .saturating_mul(TICKS_PER_SECOND)
        .saturating_add(u64::from(d.subsec_nanos() / 100))
}

fn ticks_to_duration(ticks: u64) -> Duration {
    // Sub-second ticks are < 10^7, so the nanosecond count fits in u32.
    #[allow(clippy::cast_possible_truncation)]
    let nanos = ((ticks % TICKS_PER_SECOND) * 100) as u32;
    Duration::new(ticks / TICKS_PER_SECOND, nanos)
}

/// The three timestamps carried by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileTimes {
    pub creation: FileTime,
    pub last_access: FileTime,
    pub last_write: FileTime,
}

impl FileTimes {
    /// All three timestamps set to `time`.
    pub fn uniform(time: FileTime) -> Self {
        Self {
            creation: time,
            last_access: time,
            last_write: time,
        }
    }

    /// All three timestamps set to now.
    pub fn now() -> Self {
        Self::uniform(FileTime::now())
    }

    /// Replacement set where every field is the empty sentinel.
    pub fn unchanged() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_epoch_maps_to_known_ticks() {
        assert_eq!(FileTime::from_system_time(UNIX_EPOCH).ticks(), UNIX_EPOCH_TICKS);
    }

    #[test]
    fn test_system_time_round_trip_at_tick_precision() {
        let t = UNIX_EPOCH + Duration::new(1_700_000_000, 123_456_700);
        let ft = FileTime::from_system_time(t);
        assert_eq!(ft.to_system_time(), Some(t));
    }

    #[test]
    fn test_empty_sentinel() {
        assert!(FileTime::EMPTY.is_empty());
        assert_eq!(FileTime::EMPTY.to_system_time(), None);
        assert!(!FileTime::now().is_empty());
    }

    #[test]
    fn test_pre_epoch_time() {
        let t = UNIX_EPOCH - Duration::from_secs(86_400);
        let ft = FileTime::from_system_time(t);
        assert_eq!(ft.ticks(), UNIX_EPOCH_TICKS - 86_400 * TICKS_PER_SECOND);
        assert_eq!(ft.to_system_time(), Some(t));
    }
}
