//! Shared pieces used across the tweetie crates.
//!
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`OutputFormat`]: how collected records are rendered on stdout
//!
//! ```rust
//! use tweetie_common::OutputFormat;
//!
//! let fmt: OutputFormat = "json".parse().unwrap();
//! assert_eq!(fmt, OutputFormat::Json);
//! assert_eq!(OutputFormat::default().to_string(), "text");
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod observability;

/// Preferred output format for fetched records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One whitespace-separated line per record.
    #[default]
    Text,
    /// Pretty-printed JSON document.
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format `{other}` (expected text or json)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}
