use crate::api::types::{RawInfo, RawPair};
use crate::error::RejectReason;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Website and social links advertised for a token.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SocialLinks {
    pub website: Option<String>,
    pub telegram: Option<String>,
    pub twitter: Option<String>,
    pub discord: Option<String>,
}

impl SocialLinks {
    pub fn is_empty(&self) -> bool {
        self.website.is_none()
            && self.telegram.is_none()
            && self.twitter.is_none()
            && self.discord.is_none()
    }

    fn from_info(info: &RawInfo) -> Self {
        let mut links = SocialLinks {
            website: info
                .websites
                .iter()
                .find_map(|w| non_empty(w.url.as_deref()))
                .or_else(|| non_empty(info.website.as_deref())),
            ..SocialLinks::default()
        };

        for social in &info.socials {
            let Some(url) = non_empty(social.url.as_deref()) else {
                continue;
            };
            let slot = match social.kind.as_deref().map(str::to_ascii_lowercase).as_deref() {
                Some("telegram") => &mut links.telegram,
                Some("twitter") | Some("x") => &mut links.twitter,
                Some("discord") => &mut links.discord,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(url);
            }
        }
        links
    }
}

/// A validated, newly listed trading pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// Base-token contract address; identifies the candidate across sources.
    pub key: String,
    pub name: String,
    pub symbol: String,
    pub chain_id: String,
    pub dex_id: Option<String>,
    pub pair_address: Option<String>,
    pub price_usd: f64,
    pub market_cap: Option<f64>,
    pub liquidity_usd: f64,
    pub volume_24h: f64,
    pub price_change_24h: f64,
    pub created_at: DateTime<Utc>,
    pub links: SocialLinks,
}

impl Candidate {
    /// Builds a candidate from an upstream record, requiring a base token with
    /// address, name and symbol, a price, a non-zero liquidity figure and a
    /// creation time.
    pub fn try_from_raw(raw: RawPair) -> Result<Self, RejectReason> {
        let token = raw.base_token.ok_or(RejectReason::MissingBaseToken)?;
        let key = non_empty(token.address.as_deref()).ok_or(RejectReason::EmptyAddress)?;
        let name = non_empty(token.name.as_deref()).ok_or(RejectReason::EmptyName)?;
        let symbol = non_empty(token.symbol.as_deref()).ok_or(RejectReason::EmptySymbol)?;

        let price_usd = raw.price_usd.ok_or(RejectReason::MissingPrice)?;
        let liquidity_usd = raw
            .liquidity
            .and_then(|l| l.usd)
            .ok_or(RejectReason::MissingLiquidity)?;
        if liquidity_usd == 0.0 {
            return Err(RejectReason::ZeroLiquidity);
        }

        let created_at = raw
            .pair_created_at
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or(RejectReason::MissingCreatedAt)?;

        Ok(Candidate {
            key,
            name,
            symbol,
            chain_id: raw
                .chain_id
                .map(|c| c.trim().to_ascii_lowercase())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            dex_id: raw.dex_id,
            pair_address: non_empty(raw.pair_address.as_deref()),
            price_usd,
            market_cap: raw.market_cap,
            liquidity_usd,
            volume_24h: raw.volume.and_then(|v| v.h24).unwrap_or_default(),
            price_change_24h: raw.price_change.and_then(|p| p.h24).unwrap_or_default(),
            created_at,
            links: raw
                .info
                .as_ref()
                .map(SocialLinks::from_info)
                .unwrap_or_default(),
        })
    }

    /// Always derived from `now`; never cached.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }

    /// Age in fractional seconds, negative for timestamps in the future.
    pub fn age_seconds(&self, now: DateTime<Utc>) -> f64 {
        self.age(now).num_milliseconds() as f64 / 1000.0
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
