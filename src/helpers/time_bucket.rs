//! Time-bucket keys for snapshot entities.
//!
//! A bucket is `floor(timestamp / period)`. Snapshot ids are the anchor id
//! followed by `-` and the bucket index, so the same `(anchor, timestamp,
//! period)` always lands on the same record and no in-memory counter is
//! involved.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const SECONDS_PER_HOUR: u64 = 3_600;
pub const SECONDS_PER_DAY: u64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotPeriod {
    Daily,
    Hourly,
}

impl SnapshotPeriod {
    pub fn seconds(&self) -> u64 {
        match self {
            SnapshotPeriod::Daily => SECONDS_PER_DAY,
            SnapshotPeriod::Hourly => SECONDS_PER_HOUR,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotPeriod::Daily => "daily",
            SnapshotPeriod::Hourly => "hourly",
        }
    }
}

impl fmt::Display for SnapshotPeriod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn bucket_index(timestamp: u64, period_seconds: u64) -> Result<u64, Error> {
    if period_seconds == 0 {
        return Err(Error::MalformedBucketKey(String::from(
            "period must be greater than zero",
        )));
    }

    // Block timestamps are persisted as BIGINT.
    if timestamp > i64::MAX as u64 {
        return Err(Error::MalformedBucketKey(format!(
            "timestamp {} out of range",
            timestamp
        )));
    }

    Ok(timestamp / period_seconds)
}

pub fn bucket_key(
    anchor_id: &str,
    timestamp: u64,
    period_seconds: u64,
) -> Result<String, Error> {
    let index = bucket_index(timestamp, period_seconds)?;
    Ok(format!("{}-{}", anchor_id, index))
}

/// Wall-clock time of a block, `None` when the timestamp is out of range.
pub fn block_time(timestamp: u64) -> Option<DateTime<Utc>> {
    let seconds = i64::try_from(timestamp).ok()?;
    DateTime::from_timestamp(seconds, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_key_is_stable() {
        let first = bucket_key("active-pool", 1_700_000_123, SECONDS_PER_DAY);
        let second = bucket_key("active-pool", 1_700_000_123, SECONDS_PER_DAY);
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(bucket_index(100, SECONDS_PER_DAY).unwrap(), 0);
        assert_eq!(bucket_index(86_500, SECONDS_PER_DAY).unwrap(), 1);
        assert_eq!(bucket_index(86_399, SECONDS_PER_DAY).unwrap(), 0);
        assert_eq!(bucket_index(86_400, SECONDS_PER_DAY).unwrap(), 1);

        assert_eq!(
            bucket_key("m", 3_599, SECONDS_PER_HOUR).unwrap(),
            bucket_key("m", 0, SECONDS_PER_HOUR).unwrap()
        );
        assert_ne!(
            bucket_key("m", 3_599, SECONDS_PER_HOUR).unwrap(),
            bucket_key("m", 3_600, SECONDS_PER_HOUR).unwrap()
        );
    }

    #[test]
    fn test_bucket_key_layout() {
        assert_eq!(
            bucket_key("active-pool", 172_800, SECONDS_PER_DAY).unwrap(),
            "active-pool-2"
        );
        assert_ne!(
            bucket_key("a-1", 2, 1).unwrap(),
            bucket_key("a", 12, 1).unwrap()
        );
    }

    #[test]
    fn test_zero_period_is_rejected() {
        let result = bucket_key("active-pool", 100, 0);
        assert!(matches!(result, Err(Error::MalformedBucketKey(_))));
    }

    #[test]
    fn test_out_of_range_timestamp_is_rejected() {
        let result = bucket_index(u64::MAX, SECONDS_PER_DAY);
        assert!(matches!(result, Err(Error::MalformedBucketKey(_))));
    }

    #[test]
    fn test_block_time() {
        let time = block_time(86_400).unwrap();
        assert_eq!(time.to_rfc3339(), "1970-01-02T00:00:00+00:00");
        assert!(block_time(u64::MAX).is_none());
    }
}
