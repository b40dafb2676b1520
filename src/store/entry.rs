//! Entry structure for stored payloads

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A stored payload paired with its creation time
///
/// The timestamp is wall-clock milliseconds since the UNIX epoch so that
/// ages computed on different cluster members agree. It is fixed at
/// construction and never touched by reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<T> {
    data: T,
    created_at: u64,
}

impl<T> Entry<T> {
    /// Wrap a payload, stamping it with the current time
    pub fn new(data: T) -> Self {
        Entry {
            data,
            created_at: now_millis(),
        }
    }

    /// Rebuild an entry with a known creation time
    pub fn with_created_at(data: T, created_at: u64) -> Self {
        Entry { data, created_at }
    }

    /// The stored payload
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Consume the entry, returning the payload
    pub fn into_data(self) -> T {
        self.data
    }

    /// Creation time in milliseconds since the UNIX epoch
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Age of the entry at `now` (milliseconds since the epoch)
    ///
    /// Clock skew between members can put `created_at` in the future;
    /// such entries are treated as brand new.
    pub fn age_at(&self, now: u64) -> Duration {
        Duration::from_millis(now.saturating_sub(self.created_at))
    }

    /// Check if the entry has outlived `ttl` at `now`
    pub fn is_older_than(&self, ttl: Duration, now: u64) -> bool {
        self.age_at(now) > ttl
    }
}

/// Current wall-clock time in milliseconds since the UNIX epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stamps_current_time() {
        let before = now_millis();
        let entry = Entry::new("payload");
        let after = now_millis();

        assert_eq!(*entry.data(), "payload");
        assert!(entry.created_at() >= before && entry.created_at() <= after);
    }

    #[test]
    fn test_age_is_strictly_greater_than_ttl() {
        let entry = Entry::with_created_at(1u8, 1_000);
        let ttl = Duration::from_millis(500);

        assert!(!entry.is_older_than(ttl, 1_500));
        assert!(entry.is_older_than(ttl, 1_501));
    }

    #[test]
    fn test_future_timestamp_has_zero_age() {
        let entry = Entry::with_created_at((), 5_000);
        assert_eq!(entry.age_at(4_000), Duration::ZERO);
    }

    #[test]
    fn test_serde_keeps_timestamp() {
        let entry = Entry::with_created_at("job-1".to_string(), 42);
        let json = serde_json::to_string(&entry).unwrap();
        let decoded: Entry<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, entry);
    }
}
