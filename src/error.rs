use std::fmt;
use std::io;
use std::result::Result as StdResult;
use teloxide::{ApiError, RequestError};
use thiserror::Error;

/// Why a raw upstream record never became a [`crate::models::Candidate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingBaseToken,
    EmptyAddress,
    EmptyName,
    EmptySymbol,
    MissingPrice,
    MissingLiquidity,
    ZeroLiquidity,
    MissingCreatedAt,
    TooOld,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            RejectReason::MissingBaseToken => "missing base token",
            RejectReason::EmptyAddress => "empty token address",
            RejectReason::EmptyName => "empty token name",
            RejectReason::EmptySymbol => "empty token symbol",
            RejectReason::MissingPrice => "missing or unparseable price",
            RejectReason::MissingLiquidity => "missing liquidity",
            RejectReason::ZeroLiquidity => "zero liquidity",
            RejectReason::MissingCreatedAt => "missing pair creation time",
            RejectReason::TooOld => "older than the maximum age",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },
    #[error("Malformed record: {0}")]
    MalformedRecord(RejectReason),
    #[error("Format failure: {0}")]
    FormatFailure(String),
    #[error("Dispatch failure: {0}")]
    DispatchFailure(String),
    #[error("Channel unavailable: {0}")]
    ChannelUnavailable(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Metrics error: {0}")]
    MetricsError(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl Error {
    pub fn source_unavailable(source_name: &str, reason: impl ToString) -> Self {
        Error::SourceUnavailable {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Failures that make the rest of the current scan pointless.
    pub fn aborts_cycle(&self) -> bool {
        matches!(self, Error::ChannelUnavailable(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ParseError(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::MetricsError(err.to_string())
    }
}

impl From<RejectReason> for Error {
    fn from(reason: RejectReason) -> Self {
        Error::MalformedRecord(reason)
    }
}

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        match &err {
            RequestError::Api(api) => match api {
                ApiError::BotBlocked
                | ApiError::BotKicked
                | ApiError::BotKickedFromSupergroup
                | ApiError::ChatNotFound
                | ApiError::NotFound
                | ApiError::NotEnoughRightsToPostMessages => {
                    Error::ChannelUnavailable(err.to_string())
                }
                _ => Error::DispatchFailure(err.to_string()),
            },
            _ => Error::DispatchFailure(err.to_string()),
        }
    }
}

pub type Result<T> = StdResult<T, Error>;
