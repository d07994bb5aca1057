//! Renders candidates into Telegram HTML messages.

use crate::config::{FilterConfig, ScanConfig};
use crate::error::{Error, Result};
use crate::models::Candidate;
use chrono::{DateTime, Duration, Utc};
use teloxide::utils::html;

/// Changes below this percentage get the bearish marker.
const BEARISH_THRESHOLD: f64 = -5.0;

struct ChainInfo {
    id: &'static str,
    label: &'static str,
    /// `{address}` is replaced with the token address.
    trade_url: Option<&'static str>,
}

const CHAINS: &[ChainInfo] = &[
    ChainInfo {
        id: "solana",
        label: "◎ Solana",
        trade_url: Some("https://jup.ag/swap/SOL-{address}"),
    },
    ChainInfo {
        id: "ethereum",
        label: "⟠ Ethereum",
        trade_url: Some("https://app.uniswap.org/swap?outputCurrency={address}"),
    },
    ChainInfo {
        id: "bsc",
        label: "🟡 BNB Chain",
        trade_url: Some("https://pancakeswap.finance/swap?outputCurrency={address}"),
    },
    ChainInfo {
        id: "base",
        label: "🔵 Base",
        trade_url: Some("https://app.uniswap.org/swap?chain=base&outputCurrency={address}"),
    },
    ChainInfo {
        id: "arbitrum",
        label: "🔷 Arbitrum",
        trade_url: Some("https://app.uniswap.org/swap?chain=arbitrum&outputCurrency={address}"),
    },
    ChainInfo {
        id: "polygon",
        label: "🟣 Polygon",
        trade_url: None,
    },
];

fn chain_info(chain_id: &str) -> Option<&'static ChainInfo> {
    CHAINS.iter().find(|c| c.id.eq_ignore_ascii_case(chain_id))
}

pub fn chain_label(chain_id: &str) -> String {
    match chain_info(chain_id) {
        Some(info) => info.label.to_string(),
        None => format!("⛓ {}", chain_id),
    }
}

pub fn trade_link(chain_id: &str, address: &str) -> Option<String> {
    chain_info(chain_id)
        .and_then(|info| info.trade_url)
        .map(|template| template.replace("{address}", address))
}

pub fn chart_link(candidate: &Candidate) -> String {
    let target = candidate.pair_address.as_deref().unwrap_or(&candidate.key);
    format!("https://dexscreener.com/{}/{}", candidate.chain_id, target)
}

/// `1.23M`, `45.6K` or `789.00`.
pub fn format_amount(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{:.2}", value)
    }
}

pub fn format_age(age: Duration) -> String {
    let minutes = age.num_minutes().max(0);
    if minutes < 24 * 60 {
        format!("{:.1}h", minutes as f64 / 60.0)
    } else {
        let hours = minutes / 60;
        format!("{}d {}h", hours / 24, hours % 24)
    }
}

/// First 6 and last 4 characters.
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

pub fn sentiment(change: f64) -> &'static str {
    if change > 0.0 {
        "🟢"
    } else if change < BEARISH_THRESHOLD {
        "🔴"
    } else {
        "🟡"
    }
}

fn finite(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::FormatFailure(format!("{} is not a finite number", field)))
    }
}

fn link(url: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", html::escape(url), text)
}

pub fn format_alert(candidate: &Candidate, now: DateTime<Utc>) -> Result<String> {
    if candidate.name.is_empty() || candidate.symbol.is_empty() {
        return Err(Error::FormatFailure(format!(
            "{} has no name or symbol",
            candidate.key
        )));
    }
    let price = finite("price", candidate.price_usd)?;
    let liquidity = finite("liquidity", candidate.liquidity_usd)?;
    let volume = finite("volume", candidate.volume_24h)?;
    let change = finite("price change", candidate.price_change_24h)?;
    let market_cap = match candidate.market_cap {
        Some(mc) => format!("${}", format_amount(finite("market cap", mc)?)),
        None => "N/A".to_string(),
    };

    let mut message = format!(
        "🚀 <b>NEW TOKEN ALERT</b> 🚀\n\n\
        🪙 <b>{}</b> (${})\n\
        🌐 Chain: {}\n\
        ⏰ Age: {}\n\n\
        💵 Price: ${:.8}\n\
        💰 Market Cap: {}\n\
        💧 Liquidity: ${}\n\
        📊 Volume 24h: ${}\n\
        {} 24h Change: {:+.2}%\n\n\
        📝 Contract: <code>{}</code>\n",
        html::escape(&candidate.name),
        html::escape(&candidate.symbol),
        chain_label(&candidate.chain_id),
        format_age(candidate.age(now)),
        price,
        market_cap,
        format_amount(liquidity),
        format_amount(volume),
        sentiment(change),
        change,
        shorten_address(&candidate.key),
    );

    let socials: Vec<String> = [
        (&candidate.links.website, "Website"),
        (&candidate.links.telegram, "Telegram"),
        (&candidate.links.twitter, "Twitter"),
        (&candidate.links.discord, "Discord"),
    ]
    .iter()
    .filter_map(|(url, text)| url.as_deref().map(|u| link(u, text)))
    .collect();
    if !socials.is_empty() {
        message.push_str(&format!("🔗 Links: {}\n", socials.join(" | ")));
    }

    message.push_str(&format!("\n📈 {}", link(&chart_link(candidate), "Chart")));
    if let Some(trade) = trade_link(&candidate.chain_id, &candidate.key) {
        message.push_str(&format!(" | 💱 {}", link(&trade, "Trade")));
    }
    Ok(message)
}

/// Sent once when the bot starts, before the first scan.
pub fn startup_notice(filter: &FilterConfig, scan: &ScanConfig) -> String {
    format!(
        "🤖 <b>DEX Alert Bot started</b>\n\n\
        Scanning for new pairs every {} minutes.\n\
        💰 Market cap: ${} - ${}\n\
        💧 Min liquidity: ${}\n\
        ⏰ Age: {}s - {}s\n\
        🔁 Repeat alerts suppressed for {}h",
        scan.interval_seconds / 60,
        format_amount(filter.min_market_cap),
        format_amount(filter.max_market_cap),
        format_amount(filter.min_liquidity),
        filter.min_age_seconds,
        filter.max_age_seconds,
        scan.duplicate_check_hours,
    )
}
