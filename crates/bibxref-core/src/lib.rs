//! bibxref — reconcile a local publication catalog against Crossref.
//!
//! Local CSV entries sharing the same raw title are grouped, the group's
//! first record is used to query the Crossref works API, and the best remote
//! candidate is scored against the local metadata. Accepted groups are
//! written out with the canonical DOI and abstract appended.

pub mod catalog;
pub mod config;
pub mod error;
pub mod limiter;
pub mod pipeline;
pub mod score;
pub mod sources;
pub mod writer;

pub use config::XrefConfig;
pub use error::{Result, XrefError};
pub use pipeline::{RunSummary, run};
pub use sources::{Candidate, MetadataSource};
