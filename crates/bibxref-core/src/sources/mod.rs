//! Remote metadata sources.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The single best remote match for a query. Every field is independently
/// optional; the scoring side treats absent ones as excluded, not as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    pub title: Option<String>,
    pub container: Option<String>,
    pub year: Option<i64>,
    pub author_family: Option<String>,
    pub doi: Option<String>,
    pub abstract_text: Option<String>,
}

/// A service that can propose at most one candidate per title/author query.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn best_match(&self, title: &str, author: &str) -> Result<Option<Candidate>>;
}

pub mod crossref;

pub use crossref::CrossRefSource;
