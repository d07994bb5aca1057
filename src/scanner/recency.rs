use chrono::{DateTime, Duration, Utc};
use log::debug;
use std::collections::HashMap;

/// Remembers when each key was last alerted and rejects keys alerted within
/// the lookback window. Only successful deliveries are recorded.
#[derive(Debug, Clone)]
pub struct RecencyGuard {
    window: Duration,
    alerted: HashMap<String, DateTime<Utc>>,
}

impl RecencyGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            alerted: HashMap::new(),
        }
    }

    pub fn is_recent(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.alerted
            .get(key)
            .map(|last| now - *last < self.window)
            .unwrap_or(false)
    }

    pub fn record(&mut self, key: &str, now: DateTime<Utc>) {
        self.alerted.insert(key.to_string(), now);
    }

    pub fn last_alerted(&self, key: &str) -> Option<DateTime<Utc>> {
        self.alerted.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.alerted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerted.is_empty()
    }

    /// Drops entries whose window has passed. They would be ignored anyway.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.alerted.len();
        let window = self.window;
        self.alerted.retain(|_, last| now - *last < window);
        let removed = before - self.alerted.len();
        if removed > 0 {
            debug!("Pruned {} expired alert records", removed);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::fixed_now;

    #[test]
    fn test_unknown_key_is_not_recent() {
        let guard = RecencyGuard::new(Duration::hours(6));
        assert!(!guard.is_recent("Tok", fixed_now()));
        assert!(guard.is_empty());
    }

    #[test]
    fn test_window_edges() {
        let t = fixed_now();
        let epsilon = Duration::seconds(1);
        let mut guard = RecencyGuard::new(Duration::hours(6));
        guard.record("Tok", t);

        assert!(guard.is_recent("Tok", t));
        assert!(guard.is_recent("Tok", t + Duration::hours(6) - epsilon));
        assert!(!guard.is_recent("Tok", t + Duration::hours(6) + epsilon));
        assert!(!guard.is_recent("Other", t));
    }

    #[test]
    fn test_record_overwrites_timestamp() {
        let t = fixed_now();
        let mut guard = RecencyGuard::new(Duration::hours(6));
        guard.record("Tok", t);
        guard.record("Tok", t + Duration::hours(7));

        assert_eq!(guard.len(), 1);
        assert_eq!(guard.last_alerted("Tok"), Some(t + Duration::hours(7)));
        assert!(guard.is_recent("Tok", t + Duration::hours(8)));
    }

    #[test]
    fn test_prune_keeps_active_entries() {
        let t = fixed_now();
        let mut guard = RecencyGuard::new(Duration::hours(6));
        guard.record("Expired", t);
        guard.record("Active", t + Duration::hours(5));

        let now = t + Duration::hours(7);
        assert_eq!(guard.prune(now), 1);
        assert_eq!(guard.len(), 1);
        assert!(guard.is_recent("Active", now));
        assert!(!guard.is_recent("Expired", now));
    }
}
