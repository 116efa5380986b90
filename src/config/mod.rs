//! Configuration module for Elanlar
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every threshold the pagination controller uses is configurable here.
//!
//! # Example
//!
//! ```no_run
//! use elanlar::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("elanlar.toml")).unwrap();
//! println!("Safety ceiling: {} pages", config.pagination.safety_ceiling);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, HttpConfig, OutputConfig, OutputFormat, PaginationConfig, SiteConfig,
    DEFAULT_BASE_URL,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
