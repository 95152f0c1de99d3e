//! Configuration module for Jobsweep
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use jobsweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("jobsweep.toml")).unwrap();
//! println!("Checkpoint every {} sites", config.batch.save_every);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BatchConfig, BrowserProfile, ClientConfig, Config, FetchConfig, InputConfig, OutputConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
