//! Fence timestamp separating stale cache entries from live ones.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
///
/// Cache entries last used before the fence are evictable; entries touched
/// since belong to the running job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FenceTimestamp(i64);

impl FenceTimestamp {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// The fence as a UTC datetime, if representable.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }
}

impl fmt::Display for FenceTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FenceTimestamp {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_plain_millis() {
        assert_eq!(FenceTimestamp::from_millis(1700000000000).to_string(), "1700000000000");
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "1700000000000".parse::<FenceTimestamp>().unwrap(),
            FenceTimestamp::from_millis(1700000000000)
        );
        assert!("".parse::<FenceTimestamp>().is_err());
        assert!("yesterday".parse::<FenceTimestamp>().is_err());
    }

    #[test]
    fn test_now_is_non_decreasing() {
        let a = FenceTimestamp::now();
        let b = FenceTimestamp::now();
        assert!(b >= a);
    }

    #[test]
    fn test_to_datetime() {
        let dt = FenceTimestamp::from_millis(0).to_datetime().unwrap();
        assert_eq!(dt.to_rfc3339(), "1970-01-01T00:00:00+00:00");
    }
}
