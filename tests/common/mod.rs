use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use dex_alert_bot::api::types::{RawLiquidity, RawPair, RawToken, RawWindowed};
use dex_alert_bot::api::{PairSource, Source, SourceRecords};
use dex_alert_bot::config::{Config, PacingConfig};
use dex_alert_bot::error::{Error, Result};
use dex_alert_bot::metrics::ScanMetrics;
use dex_alert_bot::scanner::Scanner;
use dex_alert_bot::telegram::Notifier;
use prometheus::Registry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn pair(address: &str, market_cap: f64, liquidity: f64, age_secs: i64) -> RawPair {
    RawPair {
        chain_id: Some("solana".into()),
        dex_id: Some("raydium".into()),
        pair_address: Some(format!("{}Pair", address)),
        base_token: Some(RawToken {
            address: Some(address.into()),
            name: Some(format!("{} Token", address)),
            symbol: Some(address.to_uppercase()),
        }),
        price_usd: Some(0.01),
        liquidity: Some(RawLiquidity {
            usd: Some(liquidity),
        }),
        market_cap: Some(market_cap),
        pair_created_at: Some((now() - Duration::seconds(age_secs)).timestamp_millis()),
        volume: Some(RawWindowed { h24: Some(5_000.0) }),
        price_change: Some(RawWindowed { h24: Some(1.0) }),
        ..RawPair::default()
    }
}

/// Serves fixed records per source name; unknown sources fail.
#[derive(Default)]
pub struct FakeSource {
    records: HashMap<String, Vec<RawPair>>,
}

impl FakeSource {
    pub fn with(mut self, source: &str, records: Vec<RawPair>) -> Self {
        self.records.insert(source.to_string(), records);
        self
    }
}

#[async_trait]
impl PairSource for FakeSource {
    async fn fetch(&self, source: &Source) -> Result<SourceRecords> {
        match self.records.get(&source.name) {
            Some(records) => Ok(SourceRecords {
                records: records.clone(),
                malformed: 0,
            }),
            None => Err(Error::source_unavailable(&source.name, "connection refused")),
        }
    }
}

/// Keeps every message it is asked to send.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(Error::DispatchFailure("network error".into()));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub fn config(sources: &[&str]) -> Config {
    let mut config = Config::default();
    config.telegram.bot_token = "test-token".into();
    config.telegram.chat_id = "-100123".into();
    config.pacing = PacingConfig::immediate();
    config.sources = sources
        .iter()
        .map(|name| Source::new(*name, format!("http://localhost/{}", name)))
        .collect();
    config
}

pub fn scanner(config: &Config, source: FakeSource, notifier: &RecordingNotifier) -> Scanner {
    let metrics = ScanMetrics::new(&Registry::new()).unwrap();
    Scanner::new(config, Arc::new(source), Arc::new(notifier.clone()), metrics)
}
