use crate::api::RawPair;
use crate::error::RejectReason;
use crate::models::Candidate;
use chrono::{DateTime, Utc};
use log::debug;

pub const DEFAULT_PER_SOURCE_CAP: usize = 200;

#[derive(Debug, Clone)]
pub struct Normalizer {
    max_age_seconds: f64,
    per_source_cap: usize,
}

/// Survivors of one source plus the number of records dropped.
#[derive(Debug, Default)]
pub struct Normalized {
    pub candidates: Vec<Candidate>,
    pub rejected: usize,
}

impl Normalizer {
    pub fn new(max_age_seconds: u64, per_source_cap: usize) -> Self {
        Self {
            max_age_seconds: max_age_seconds as f64,
            per_source_cap,
        }
    }

    /// Validates the records of one source, drops anything already older than
    /// the maximum age, and returns the newest `per_source_cap` survivors,
    /// newest first.
    pub fn normalize(&self, records: Vec<RawPair>, now: DateTime<Utc>) -> Normalized {
        let mut normalized = Normalized::default();

        for raw in records {
            match self.accept(raw, now) {
                Ok(candidate) => normalized.candidates.push(candidate),
                Err(reason) => {
                    debug!("Dropping record: {}", reason);
                    normalized.rejected += 1;
                }
            }
        }

        normalized
            .candidates
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
        normalized.candidates.truncate(self.per_source_cap);
        normalized
    }

    fn accept(&self, raw: RawPair, now: DateTime<Utc>) -> Result<Candidate, RejectReason> {
        let candidate = Candidate::try_from_raw(raw)?;
        if candidate.age_seconds(now) > self.max_age_seconds {
            return Err(RejectReason::TooOld);
        }
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::{fixed_now, raw_pair};

    #[test]
    fn test_sorts_newest_first() {
        let normalizer = Normalizer::new(86_400, DEFAULT_PER_SOURCE_CAP);
        let records = vec![
            raw_pair("old", 50_000.0, 1_000.0, 7_200),
            raw_pair("newest", 50_000.0, 1_000.0, 60),
            raw_pair("middle", 50_000.0, 1_000.0, 3_600),
        ];

        let normalized = normalizer.normalize(records, fixed_now());
        let keys: Vec<_> = normalized.candidates.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["newest", "middle", "old"]);
        assert_eq!(normalized.rejected, 0);
    }

    #[test]
    fn test_drops_invalid_and_too_old() {
        let normalizer = Normalizer::new(86_400, DEFAULT_PER_SOURCE_CAP);
        let mut no_price = raw_pair("no-price", 50_000.0, 1_000.0, 60);
        no_price.price_usd = None;
        let mut no_symbol = raw_pair("no-symbol", 50_000.0, 1_000.0, 60);
        no_symbol.base_token.as_mut().unwrap().symbol = None;

        let records = vec![
            raw_pair("fresh", 50_000.0, 1_000.0, 60),
            raw_pair("stale", 50_000.0, 1_000.0, 86_401),
            no_price,
            no_symbol,
        ];

        let normalized = normalizer.normalize(records, fixed_now());
        assert_eq!(normalized.candidates.len(), 1);
        assert_eq!(normalized.candidates[0].key, "fresh");
        assert_eq!(normalized.rejected, 3);
    }

    #[test]
    fn test_max_age_boundary_is_kept() {
        let normalizer = Normalizer::new(86_400, DEFAULT_PER_SOURCE_CAP);
        let normalized =
            normalizer.normalize(vec![raw_pair("edge", 50_000.0, 1_000.0, 86_400)], fixed_now());
        assert_eq!(normalized.candidates.len(), 1);
    }

    #[test]
    fn test_caps_output_keeping_newest() {
        let normalizer = Normalizer::new(86_400, 3);
        let records = (0..10)
            .map(|i| raw_pair(&format!("token-{}", i), 50_000.0, 1_000.0, 100 + i * 10))
            .collect();

        let normalized = normalizer.normalize(records, fixed_now());
        let keys: Vec<_> = normalized.candidates.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["token-0", "token-1", "token-2"]);
    }
}
