use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Names of the logical catalog columns, as they appear in the header row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnNames {
    pub title: String,
    pub container: String,
    pub author: String,
    pub year: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            title: "Titulo".to_string(),
            container: "NomePeriodico".to_string(),
            author: "NomeAutor".to_string(),
            year: "Ano".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XrefConfig {
    /// Upper bound on simultaneously in-flight remote queries.
    pub max_parallelism: usize,
    /// Minimum spacing between successive dispatch starts, in milliseconds.
    pub delay_between_requests_ms: u64,
    pub columns: ColumnNames,
    /// Single-byte field delimiter for both input and output.
    pub delimiter: u8,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Email for the Crossref polite pool, advertised in the user agent.
    pub polite_email: Option<String>,
}

impl Default for XrefConfig {
    fn default() -> Self {
        Self {
            max_parallelism: 5,
            delay_between_requests_ms: 500,
            columns: ColumnNames::default(),
            delimiter: b';',
            input_path: PathBuf::from("publications.csv"),
            output_path: PathBuf::from("publications_xref.csv"),
            polite_email: None,
        }
    }
}

impl XrefConfig {
    /// Defaults overlaid with the historical environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(n) = env_parsed::<usize>("REQUEST_MAX_PARALLELLISM") {
            config.max_parallelism = n.max(1);
        }
        if let Some(ms) = env_parsed::<u64>("DELAY_BETWEEN_REQUESTS") {
            config.delay_between_requests_ms = ms;
        }
        if let Ok(name) = std::env::var("TITLE_FIELD") {
            config.columns.title = name;
        }
        if let Ok(name) = std::env::var("CONTAINER_FIELD") {
            config.columns.container = name;
        }
        if let Ok(name) = std::env::var("AUTHOR_FIELD") {
            config.columns.author = name;
        }
        if let Ok(name) = std::env::var("YEAR_FIELD") {
            config.columns.year = name;
        }
        if let Ok(delim) = std::env::var("CSV_DELIMITER") {
            if let Some(&byte) = delim.as_bytes().first() {
                config.delimiter = byte;
            }
        }
        config
    }

    pub fn min_spacing(&self) -> Duration {
        Duration::from_millis(self.delay_between_requests_ms)
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
