//! vlist-crawler: a paced, signed crawler for a creator's video catalogue
//!
//! This crate walks the paginated space search endpoint of the video
//! platform page by page, using caller-supplied session cookies, and
//! aggregates every video of a creator into one ordered list that can be
//! written out as CSV, JSON and raw JSON.

pub mod config;
pub mod crawler;
pub mod credentials;
pub mod output;
pub mod signing;

use thiserror::Error;

/// Main error type for a crawl invocation
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Credential error: {0}")]
    MissingCredential(#[from] CredentialError),

    #[error("Creator id must not be empty")]
    InvalidCreator,

    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("Crawl cancelled before completion")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised while turning a raw cookie string into a credential set
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("No cookie was provided")]
    Empty,

    #[error("Cookie is missing required fields: {}", .0.join(", "))]
    MissingKeys(Vec<String>),
}

/// Errors raised by a single page fetch
///
/// Every variant aborts the crawl. `Envelope` is the malformed-response
/// subtype; the rest cover rejected credentials and transport faults.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Page {page}: API returned code {code}: {message} (check that the cookie is still valid)")]
    Api { page: u32, code: i64, message: String },

    #[error("Page {page}: request failed: {source}")]
    Transport { page: u32, source: reqwest::Error },

    #[error("Page {page}: HTTP status {status}")]
    Status { page: u32, status: u16 },

    #[error("Page {page}: malformed response: {detail}")]
    Envelope { page: u32, detail: String },

    #[error("Page {page}: failed to sign request: {source}")]
    Signing { page: u32, source: SigningError },
}

impl FetchError {
    /// The page number the failure happened on
    pub fn page(&self) -> u32 {
        match self {
            FetchError::Api { page, .. }
            | FetchError::Transport { page, .. }
            | FetchError::Status { page, .. }
            | FetchError::Envelope { page, .. }
            | FetchError::Signing { page, .. } => *page,
        }
    }

    /// Returns true when the response arrived but did not have the expected shape
    pub fn is_envelope(&self) -> bool {
        matches!(self, FetchError::Envelope { .. })
    }
}

/// Errors raised by a request signer
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("Failed to fetch signing keys: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected signing key response: {0}")]
    Envelope(String),

    #[error("System clock is before the UNIX epoch")]
    Clock,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{AggregateResult, Coordinator, CrawlOutcome, PageFetcher, VideoRecord};
pub use credentials::{parse_credentials, CredentialSet};
pub use signing::{RequestSigner, WbiSigner};
