use crate::api::types::{RawLiquidity, RawPair, RawToken, RawWindowed};
use crate::api::Source;
use crate::config::{Config, PacingConfig};
use crate::models::Candidate;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Reference instant shared by tests that reason about ages.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn raw_pair(address: &str, market_cap: f64, liquidity: f64, age_secs: i64) -> RawPair {
    raw_pair_at(address, market_cap, liquidity, fixed_now(), age_secs)
}

pub fn raw_pair_at(
    address: &str,
    market_cap: f64,
    liquidity: f64,
    now: DateTime<Utc>,
    age_secs: i64,
) -> RawPair {
    RawPair {
        chain_id: Some("solana".into()),
        dex_id: Some("raydium".into()),
        pair_address: Some(format!("{}Pair", address)),
        base_token: Some(RawToken {
            address: Some(address.into()),
            name: Some("Test Token".into()),
            symbol: Some("TEST".into()),
        }),
        price_usd: Some(0.0042),
        liquidity: Some(RawLiquidity {
            usd: Some(liquidity),
        }),
        market_cap: Some(market_cap),
        pair_created_at: Some((now - Duration::seconds(age_secs)).timestamp_millis()),
        volume: Some(RawWindowed { h24: Some(12_000.0) }),
        price_change: Some(RawWindowed { h24: Some(3.5) }),
        info: None,
    }
}

pub fn candidate(key: &str, market_cap: f64, liquidity: f64, age_secs: i64) -> Candidate {
    Candidate::try_from_raw(raw_pair(key, market_cap, liquidity, age_secs))
        .expect("fixture pair should be valid")
}

/// Config with unpaced dispatch and `num_sources` placeholder sources.
pub fn test_config(num_sources: usize) -> Config {
    let mut config = Config::default();
    config.telegram.bot_token = "test-token".into();
    config.telegram.chat_id = "-100123".into();
    config.pacing = PacingConfig::immediate();
    config.sources = (0..num_sources)
        .map(|i| Source::new(format!("source-{}", i), format!("http://localhost/source-{}", i)))
        .collect();
    config
}
