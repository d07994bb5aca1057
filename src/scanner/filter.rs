use crate::config::FilterConfig;
use crate::models::Candidate;
use chrono::{DateTime, Utc};
use std::fmt;

/// First failing condition of the acceptance predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterRejection {
    MissingMarketCap,
    MarketCapOutOfRange(f64),
    AgeOutOfRange(f64),
    LowLiquidity(f64),
}

impl fmt::Display for FilterRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterRejection::MissingMarketCap => write!(f, "no market cap"),
            FilterRejection::MarketCapOutOfRange(mc) => write!(f, "market cap {:.0} out of range", mc),
            FilterRejection::AgeOutOfRange(age) => write!(f, "age {:.0}s out of range", age),
            FilterRejection::LowLiquidity(liq) => write!(f, "liquidity {:.0} too low", liq),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFilter {
    criteria: FilterConfig,
}

impl CandidateFilter {
    pub fn new(criteria: FilterConfig) -> Self {
        Self { criteria }
    }

    /// All bounds are inclusive.
    pub fn evaluate(&self, candidate: &Candidate, now: DateTime<Utc>) -> Result<(), FilterRejection> {
        let c = &self.criteria;

        let market_cap = candidate.market_cap.ok_or(FilterRejection::MissingMarketCap)?;
        if !(c.min_market_cap..=c.max_market_cap).contains(&market_cap) {
            return Err(FilterRejection::MarketCapOutOfRange(market_cap));
        }

        let age = candidate.age_seconds(now);
        if !(c.min_age_seconds as f64..=c.max_age_seconds as f64).contains(&age) {
            return Err(FilterRejection::AgeOutOfRange(age));
        }

        if candidate.liquidity_usd.is_nan() || candidate.liquidity_usd < c.min_liquidity {
            return Err(FilterRejection::LowLiquidity(candidate.liquidity_usd));
        }
        Ok(())
    }

    pub fn accepts(&self, candidate: &Candidate, now: DateTime<Utc>) -> bool {
        self.evaluate(candidate, now).is_ok()
    }
}
