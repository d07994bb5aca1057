use crate::api::Source;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub filter: FilterConfig,
    pub scan: ScanConfig,
    pub pacing: PacingConfig,
    pub server: ServerConfig,
    pub sources: Vec<Source>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig::default(),
            filter: FilterConfig::default(),
            scan: ScanConfig::default(),
            pacing: PacingConfig::default(),
            server: ServerConfig::default(),
            sources: Source::default_registry(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Numeric chat id or `@channelusername`.
    pub chat_id: String,
    pub enable_commands: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    pub min_market_cap: f64,
    pub max_market_cap: f64,
    pub min_liquidity: f64,
    pub min_age_seconds: u64,
    pub max_age_seconds: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_market_cap: 10_000.0,
            max_market_cap: 1_000_000.0,
            min_liquidity: 500.0,
            min_age_seconds: 1,
            max_age_seconds: 86_400,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    pub interval_seconds: u64,
    pub retry_interval_seconds: u64,
    pub max_alerts_per_scan: usize,
    pub duplicate_check_hours: u64,
    pub per_source_cap: usize,
    pub request_timeout_seconds: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 180,
            retry_interval_seconds: 60,
            max_alerts_per_scan: 10,
            duplicate_check_hours: 6,
            per_source_cap: 200,
            request_timeout_seconds: 30,
        }
    }
}

impl ScanConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn duplicate_window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.duplicate_check_hours as i64)
    }
}

/// Delays between upstream requests and between outgoing messages.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PacingConfig {
    pub request_delay_ms: u64,
    pub message_delay_ms: u64,
    pub failure_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 1_000,
            message_delay_ms: 3_000,
            failure_delay_ms: 5_000,
        }
    }
}

impl PacingConfig {
    /// No waiting at all. Used by tests and dry runs.
    pub fn immediate() -> Self {
        Self {
            request_delay_ms: 0,
            message_delay_ms: 0,
            failure_delay_ms: 0,
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn message_delay(&self) -> Duration {
        Duration::from_millis(self.message_delay_ms)
    }

    pub fn failure_delay(&self) -> Duration {
        Duration::from_millis(self.failure_delay_ms)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Health endpoint port. Disabled when unset.
    pub port: Option<u16>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN").or_else(|| lookup("TELEGRAM_TOKEN")) {
            self.telegram.bot_token = token;
        }
        if let Some(chat_id) = lookup("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = chat_id;
        }
        override_parsed(&lookup, "ENABLE_COMMANDS", &mut self.telegram.enable_commands)?;

        override_parsed(&lookup, "MIN_MARKET_CAP", &mut self.filter.min_market_cap)?;
        override_parsed(&lookup, "MAX_MARKET_CAP", &mut self.filter.max_market_cap)?;
        override_parsed(&lookup, "MIN_LIQUIDITY", &mut self.filter.min_liquidity)?;
        override_parsed(&lookup, "MIN_AGE_SECONDS", &mut self.filter.min_age_seconds)?;
        override_parsed(&lookup, "MAX_AGE_SECONDS", &mut self.filter.max_age_seconds)?;

        override_parsed(&lookup, "SCAN_INTERVAL_SECONDS", &mut self.scan.interval_seconds)?;
        override_parsed(&lookup, "MAX_ALERTS_PER_SCAN", &mut self.scan.max_alerts_per_scan)?;
        override_parsed(&lookup, "DUPLICATE_CHECK_HOURS", &mut self.scan.duplicate_check_hours)?;

        if let Some(port) = lookup("PORT") {
            self.server.port = Some(parse_value("PORT", &port)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(Error::ConfigError("Telegram bot token is not set".into()));
        }
        if self.telegram.chat_id.trim().is_empty() {
            return Err(Error::ConfigError("Telegram chat id is not set".into()));
        }
        if self.filter.min_market_cap > self.filter.max_market_cap {
            return Err(Error::ConfigError(format!(
                "min_market_cap {} exceeds max_market_cap {}",
                self.filter.min_market_cap, self.filter.max_market_cap
            )));
        }
        if self.filter.min_age_seconds > self.filter.max_age_seconds {
            return Err(Error::ConfigError(format!(
                "min_age_seconds {} exceeds max_age_seconds {}",
                self.filter.min_age_seconds, self.filter.max_age_seconds
            )));
        }
        if self.scan.interval_seconds == 0 {
            return Err(Error::ConfigError("Scan interval must be positive".into()));
        }
        if self.scan.per_source_cap == 0 {
            return Err(Error::ConfigError("per_source_cap must be positive".into()));
        }
        if self.sources.is_empty() {
            return Err(Error::ConfigError("No data sources configured".into()));
        }
        Ok(())
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        *target = parse_value(key, &raw)?;
    }
    Ok(())
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::ConfigError(format!("Invalid value for {}: {:?}", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.filter, FilterConfig::default());
        assert_eq!(config.scan.interval_seconds, 180);
        assert_eq!(config.scan.duplicate_check_hours, 6);
        assert_eq!(config.pacing.message_delay_ms, 3_000);
        assert!(!config.sources.is_empty());
        assert_eq!(config.server.port, None);
    }

    #[test]
    fn test_toml_sections_override_defaults() {
        let config: Config = toml::from_str(
            r#"
            [telegram]
            bot_token = "123:abc"
            chat_id = "-100200"

            [filter]
            min_liquidity = 2500.0

            [[sources]]
            name = "search-solana"
            url = "https://api.dexscreener.com/latest/dex/search?q=solana"
            "#,
        )
        .unwrap();

        assert_eq!(config.telegram.chat_id, "-100200");
        assert_eq!(config.filter.min_liquidity, 2500.0);
        assert_eq!(config.filter.min_market_cap, 10_000.0);
        assert_eq!(config.sources.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[
                ("TELEGRAM_TOKEN", "legacy-token"),
                ("TELEGRAM_CHAT_ID", "@newpairs"),
                ("MIN_MARKET_CAP", "20000"),
                ("MAX_AGE_SECONDS", "3600"),
                ("MAX_ALERTS_PER_SCAN", "3"),
                ("ENABLE_COMMANDS", "true"),
                ("PORT", "8080"),
            ]))
            .unwrap();

        assert_eq!(config.telegram.bot_token, "legacy-token");
        assert_eq!(config.telegram.chat_id, "@newpairs");
        assert_eq!(config.filter.min_market_cap, 20_000.0);
        assert_eq!(config.filter.max_age_seconds, 3600);
        assert_eq!(config.scan.max_alerts_per_scan, 3);
        assert!(config.telegram.enable_commands);
        assert_eq!(config.server.port, Some(8080));
    }

    #[test]
    fn test_primary_token_wins_over_alias() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[
                ("TELEGRAM_BOT_TOKEN", "primary"),
                ("TELEGRAM_TOKEN", "legacy"),
            ]))
            .unwrap();
        assert_eq!(config.telegram.bot_token, "primary");
    }

    #[test]
    fn test_invalid_override_is_config_error() {
        let mut config = Config::default();
        let result = config.apply_overrides(lookup_from(&[("MIN_LIQUIDITY", "lots")]));
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let mut config = Config::default();
        config.telegram.bot_token = "token".into();
        config.telegram.chat_id = "42".into();
        assert!(config.validate().is_ok());

        config.filter.min_market_cap = 2_000_000.0;
        assert!(config.validate().is_err());

        config.filter = FilterConfig::default();
        config.filter.min_age_seconds = 100_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_credentials() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let path = std::env::temp_dir().join(format!("dex-alert-bot-config-{}.toml", std::process::id()));
        let mut config = Config::default();
        config.telegram.bot_token = "123:abc".into();
        config.telegram.chat_id = "-100200".into();
        config.filter.min_liquidity = 2_500.0;
        config.scan.max_alerts_per_scan = 4;
        config.server.port = Some(8080);

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.telegram.chat_id, "-100200");
        assert_eq!(loaded.filter, config.filter);
        assert_eq!(loaded.scan, config.scan);
        assert_eq!(loaded.pacing, config.pacing);
        assert_eq!(loaded.server, config.server);
        assert_eq!(loaded.sources, config.sources);
    }
}
