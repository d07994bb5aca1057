use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A pair record as the DexScreener API reports it. Every field is optional
/// here; [`crate::models::Candidate::try_from_raw`] decides what is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPair {
    pub chain_id: Option<String>,
    pub dex_id: Option<String>,
    pub pair_address: Option<String>,
    pub base_token: Option<RawToken>,
    #[serde(deserialize_with = "flexible_number")]
    pub price_usd: Option<f64>,
    pub liquidity: Option<RawLiquidity>,
    #[serde(deserialize_with = "flexible_number")]
    pub market_cap: Option<f64>,
    pub pair_created_at: Option<i64>,
    pub volume: Option<RawWindowed>,
    pub price_change: Option<RawWindowed>,
    pub info: Option<RawInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawToken {
    pub address: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawLiquidity {
    #[serde(deserialize_with = "flexible_number")]
    pub usd: Option<f64>,
}

/// Rolling-window figures such as `volume.h24` or `priceChange.h24`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawWindowed {
    #[serde(deserialize_with = "flexible_number")]
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawInfo {
    pub website: Option<String>,
    pub websites: Vec<RawLink>,
    pub socials: Vec<RawSocial>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawLink {
    pub label: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawSocial {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Accepts `12.5`, `"12.5"` or `null`. Unparseable strings become `None`.
fn flexible_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberOrString> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Parsed body of one source: the typed records plus how many list elements
/// could not be read as a pair at all.
#[derive(Debug, Default)]
pub struct SourceRecords {
    pub records: Vec<RawPair>,
    pub malformed: usize,
}

/// Flattens the response shapes the upstream uses into one list of elements:
/// a bare list, `{"pairs": [...]}`, `{"data": [...]}` or
/// `{"tokens": [{"pairs": [...]}, ...]}`.
pub fn extract_elements(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in ["pairs", "data"] {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return items;
                }
            }
            if let Some(Value::Array(tokens)) = map.remove("tokens") {
                return tokens
                    .into_iter()
                    .filter_map(|token| match token {
                        Value::Object(mut t) => match t.remove("pairs") {
                            Some(Value::Array(pairs)) => Some(pairs),
                            _ => None,
                        },
                        _ => None,
                    })
                    .flatten()
                    .collect();
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

pub fn parse_records(body: Value) -> SourceRecords {
    let mut parsed = SourceRecords::default();
    for element in extract_elements(body) {
        parsed.push(element);
    }
    parsed
}

impl SourceRecords {
    fn push(&mut self, element: Value) {
        match serde_json::from_value::<RawPair>(element) {
            Ok(pair) => self.records.push(pair),
            Err(e) => {
                debug!("Skipping unreadable record: {}", e);
                self.malformed += 1;
            }
        }
    }
}

/// Max token addresses per `/tokens/v1` lookup.
pub const TOKEN_LOOKUP_BATCH: usize = 30;

/// A token named by a profile or boost listing, which carries no pair data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRef {
    pub chain_id: String,
    pub token_address: String,
}

impl TokenRef {
    pub fn from_listing(element: &Value) -> Option<Self> {
        let entry = element.as_object()?;
        if entry.contains_key("baseToken") {
            return None;
        }
        let chain_id = entry.get("chainId")?.as_str()?.trim();
        let token_address = entry.get("tokenAddress")?.as_str()?.trim();
        if chain_id.is_empty() || token_address.is_empty() {
            return None;
        }
        Some(Self {
            chain_id: chain_id.to_lowercase(),
            token_address: token_address.to_string(),
        })
    }
}

/// Like [`parse_records`], but listing entries are returned as token
/// references to resolve instead of being counted as malformed.
pub fn parse_listing(body: Value) -> (SourceRecords, Vec<TokenRef>) {
    let mut parsed = SourceRecords::default();
    let mut refs = Vec::new();
    for element in extract_elements(body) {
        match TokenRef::from_listing(&element) {
            Some(token) => refs.push(token),
            None => parsed.push(element),
        }
    }
    (parsed, refs)
}

/// `/tokens/v1/{chain}/{a,b,...}` paths covering `refs`, grouped by chain in
/// first-seen order, duplicates removed, at most [`TOKEN_LOOKUP_BATCH`] each.
pub fn lookup_paths(refs: &[TokenRef]) -> Vec<String> {
    let mut chains: Vec<(&str, Vec<&str>)> = Vec::new();
    for token in refs {
        let index = match chains.iter().position(|(chain, _)| *chain == token.chain_id) {
            Some(index) => index,
            None => {
                chains.push((token.chain_id.as_str(), Vec::new()));
                chains.len() - 1
            }
        };
        let addresses = &mut chains[index].1;
        if !addresses.contains(&token.token_address.as_str()) {
            addresses.push(token.token_address.as_str());
        }
    }

    chains
        .into_iter()
        .flat_map(|(chain, addresses)| {
            addresses
                .chunks(TOKEN_LOOKUP_BATCH)
                .map(|batch| format!("/tokens/v1/{}/{}", chain, batch.join(",")))
                .collect::<Vec<_>>()
        })
        .collect()
}
