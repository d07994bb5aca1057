use crate::error::Result;
use crate::utils::pacing::Pacer;
use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub mod dexscreener;
pub mod types;

pub use dexscreener::DexScreenerClient;
pub use types::{RawPair, SourceRecords};

pub(crate) const API_BASE_URL: &str = "https://api.dexscreener.com";
const SEARCH_CHAINS: [&str; 6] = ["solana", "ethereum", "bsc", "base", "arbitrum", "polygon"];

/// One upstream endpoint polled every scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub url: String,
}

impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn default_registry() -> Vec<Source> {
        let mut sources = vec![
            Source::new(
                "token-profiles",
                format!("{}/token-profiles/latest/v1", API_BASE_URL),
            ),
            Source::new("top-boosts", format!("{}/token-boosts/top/v1", API_BASE_URL)),
        ];
        sources.extend(SEARCH_CHAINS.iter().map(|chain| {
            Source::new(
                format!("search-{}", chain),
                format!("{}/latest/dex/search?q={}", API_BASE_URL, chain),
            )
        }));
        sources
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PairSource: Send + Sync {
    /// Fetches one source. Any failure is reported as `Error::SourceUnavailable`.
    async fn fetch(&self, source: &Source) -> Result<SourceRecords>;
}

/// Records from one source, kept in registry order.
#[derive(Debug)]
pub struct FetchedSource {
    pub source: String,
    pub records: Vec<RawPair>,
    pub malformed: usize,
    pub failed: bool,
}

/// Queries every source in order, pausing between requests. A failing source
/// contributes nothing and never aborts the others.
pub async fn fetch_all(
    client: &dyn PairSource,
    sources: &[Source],
    pacer: &mut Pacer,
) -> Vec<FetchedSource> {
    let mut fetched = Vec::with_capacity(sources.len());
    for source in sources {
        pacer.wait().await;
        let result = client.fetch(source).await;
        pacer.mark();
        match result {
            Ok(parsed) => {
                info!(
                    "Source {} returned {} records ({} unreadable)",
                    source.name,
                    parsed.records.len(),
                    parsed.malformed
                );
                fetched.push(FetchedSource {
                    source: source.name.clone(),
                    records: parsed.records,
                    malformed: parsed.malformed,
                    failed: false,
                });
            }
            Err(e) => {
                warn!("{}", e);
                fetched.push(FetchedSource {
                    source: source.name.clone(),
                    records: Vec::new(),
                    malformed: 0,
                    failed: true,
                });
            }
        }
    }
    fetched
}
