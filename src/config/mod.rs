//! Configuration module for dredge
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use dredge::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("dredge.toml")).unwrap();
//! println!("Crawling {} seeds", config.crawler.seeds.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FetchConfig, OutputConfig, DEFAULT_RETRY_ON};

// Re-export parser functions
pub use parser::load_config;

// Re-export validation
pub use validation::validate;
