//! Unix timestamps for payment validity windows.
//!
//! Payment requests carry a creation time and an expiry; gift cards record
//! purchase and redemption times. All of them use [`UnixTimestamp`], which
//! serializes as a stringified integer so JSON consumers never lose
//! precision on 64-bit values.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::ops::Add;
use std::time::SystemTime;

/// Seconds since the Unix epoch (1970-01-01T00:00:00Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnixTimestamp(u64);

impl Serialize for UnixTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for UnixTimestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let ts = s
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom("timestamp must be a non-negative integer"))?;
        Ok(Self(ts))
    }
}

impl Display for UnixTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add<u64> for UnixTimestamp {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0.saturating_add(rhs))
    }
}

impl UnixTimestamp {
    /// Creates a timestamp from raw seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// The current system time.
    ///
    /// # Panics
    ///
    /// Panics if the system clock is set before the Unix epoch.
    #[must_use]
    pub fn now() -> Self {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("system clock before UNIX epoch")
            .as_secs();
        Self(now)
    }

    /// Raw seconds since the epoch.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Whether this moment has been reached. Used as the expiry check for
    /// payment validity windows.
    #[must_use]
    pub fn is_past(&self) -> bool {
        Self::now() >= *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_string() {
        let ts = UnixTimestamp::from_secs(1_699_999_999);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"1699999999\"");
    }

    #[test]
    fn test_deserialize_rejects_non_numeric() {
        assert!(serde_json::from_str::<UnixTimestamp>("\"soon\"").is_err());
    }

    #[test]
    fn test_add_saturates() {
        let ts = UnixTimestamp::from_secs(u64::MAX) + 300;
        assert_eq!(ts.as_secs(), u64::MAX);
    }

    #[test]
    fn test_is_past() {
        assert!(UnixTimestamp::from_secs(0).is_past());
        assert!(!(UnixTimestamp::now() + 300).is_past());
    }
}
