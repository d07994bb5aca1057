use crate::api::types::{lookup_paths, parse_listing, parse_records, SourceRecords, TokenRef};
use crate::api::{PairSource, Source, API_BASE_URL};
use crate::error::{Error, Result};
use crate::utils::pacing::Pacer;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("dex-alert-bot/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for every DexScreener endpoint.
#[derive(Debug, Clone)]
pub struct DexScreenerClient {
    client: Client,
    base_url: String,
    request_delay: Duration,
}

impl DexScreenerClient {
    /// `request_delay` paces the extra token lookups a listing source needs.
    pub fn new(timeout: Duration, request_delay: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            request_delay,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json(&self, source_name: &str, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::source_unavailable(source_name, e))?;

        match response.status() {
            status if status.is_success() => response
                .json::<Value>()
                .await
                .map_err(|e| Error::source_unavailable(source_name, format!("invalid body: {}", e))),
            StatusCode::TOO_MANY_REQUESTS => {
                Err(Error::source_unavailable(source_name, "rate limited (429)"))
            }
            status => Err(Error::source_unavailable(
                source_name,
                format!("request failed with status {}", status),
            )),
        }
    }

    /// Looks up the pairs of tokens named by a profile or boost listing.
    /// A failed batch is logged and skipped.
    async fn resolve_tokens(&self, source_name: &str, refs: &[TokenRef]) -> SourceRecords {
        let mut resolved = SourceRecords::default();
        let mut pacer = Pacer::new(self.request_delay);
        pacer.mark();

        for path in lookup_paths(refs) {
            pacer.wait().await;
            let url = format!("{}{}", self.base_url, path);
            debug!("Resolving listed tokens for {} via {}", source_name, url);
            let result = self.get_json(source_name, &url).await;
            pacer.mark();
            match result {
                Ok(body) => {
                    let parsed = parse_records(body);
                    resolved.records.extend(parsed.records);
                    resolved.malformed += parsed.malformed;
                }
                Err(e) => warn!("Token lookup failed: {}", e),
            }
        }
        resolved
    }
}

#[async_trait]
impl PairSource for DexScreenerClient {
    async fn fetch(&self, source: &Source) -> Result<SourceRecords> {
        debug!("Fetching {} from {}", source.name, source.url);
        let body = self.get_json(&source.name, &source.url).await?;
        let (mut parsed, refs) = parse_listing(body);
        if !refs.is_empty() {
            debug!("{} listed {} tokens without pair data", source.name, refs.len());
            let resolved = self.resolve_tokens(&source.name, &refs).await;
            parsed.records.extend(resolved.records);
            parsed.malformed += resolved.malformed;
        }
        Ok(parsed)
    }
}
