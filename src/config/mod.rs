//! Configuration module for vlist-crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a built-in default, so running without a file is valid.
//!
//! # Example
//!
//! ```no_run
//! use vlist_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Pacing delay: {}ms", config.crawler.pacing_delay_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, EndpointConfig, FingerprintConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
