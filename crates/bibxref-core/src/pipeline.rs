//! Top-level reconciliation run: load, group, fan out paced lookups, write.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{info, warn};

use crate::catalog::{self, FieldSchema, TitleGroup};
use crate::config::XrefConfig;
use crate::error::Result;
use crate::limiter::Dispatcher;
use crate::score::{decide, score};
use crate::sources::MetadataSource;
use crate::writer::ResultWriter;

pub const NOT_FOUND: &str = "Not found";

/// Per-group terminal result, applied to every member record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub doi: String,
    pub abstract_text: String,
}

impl Outcome {
    pub fn not_found() -> Self {
        Self {
            doi: NOT_FOUND.to_string(),
            abstract_text: NOT_FOUND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub found: usize,
    pub total: usize,
}

/// Runs the whole reconciliation. Remote failures are isolated per group
/// (warned, group written with the sentinel outcome); configuration and
/// output I/O errors abort the run.
pub async fn run(config: &XrefConfig, source: Arc<dyn MetadataSource>) -> Result<RunSummary> {
    let catalog = catalog::load_catalog(&config.input_path, config.delimiter)?;
    let schema = FieldSchema::resolve(&catalog.header, &config.columns)?;
    let groups = catalog::group_by_title(&catalog.records, &schema);
    let writer = Arc::new(ResultWriter::create(
        &config.output_path,
        config.delimiter,
        &catalog.header,
    )?);
    let dispatcher = Dispatcher::new(config.max_parallelism, config.min_spacing());

    let total = groups.len();
    let approx_minutes = total as u64 * config.delay_between_requests_ms / 60_000;
    info!(total, approx_minutes, "processing catalog");

    let mut tasks = FuturesUnordered::new();
    for group in groups {
        let source = source.clone();
        let writer = writer.clone();
        let dispatcher = dispatcher.clone();
        tasks.push(async move { process_group(group, schema, source, dispatcher, writer).await });
    }

    // Matches are reduced here rather than counted from inside the tasks.
    let mut found = 0;
    while let Some(result) = tasks.next().await {
        if result? {
            found += 1;
        }
    }

    info!(found, total, "all done");
    Ok(RunSummary { found, total })
}

async fn process_group(
    group: TitleGroup,
    schema: FieldSchema,
    source: Arc<dyn MetadataSource>,
    dispatcher: Dispatcher,
    writer: Arc<ResultWriter>,
) -> Result<bool> {
    let rep = group.representative(&schema);
    let author = rep.author.clone().unwrap_or_default();

    let lookup = dispatcher
        .dispatch(source.best_match(&rep.title, &author))
        .await;

    let (outcome, matched) = match lookup {
        Ok(Some(candidate)) => {
            let s = score(&rep, &candidate);
            info!(title = %rep.title, score = %format_args!("{:.2}", s.value), "scored candidate");
            if decide(&s) {
                let outcome = Outcome {
                    doi: candidate.doi.unwrap_or_else(|| NOT_FOUND.to_string()),
                    abstract_text: candidate
                        .abstract_text
                        .unwrap_or_else(|| NOT_FOUND.to_string()),
                };
                (outcome, true)
            } else {
                (Outcome::not_found(), false)
            }
        }
        Ok(None) => (Outcome::not_found(), false),
        Err(e) => {
            warn!(title = %rep.title, error = %e, "remote lookup failed, marking group unmatched");
            (Outcome::not_found(), false)
        }
    };

    writer.append_rows(&augmented_rows(&group, &outcome)).await?;
    Ok(matched)
}

fn augmented_rows(group: &TitleGroup, outcome: &Outcome) -> Vec<Vec<String>> {
    group
        .members
        .iter()
        .map(|record| {
            let mut row = Vec::with_capacity(record.fields.len() + 3);
            row.push(record.index.to_string());
            row.extend(record.fields.iter().cloned());
            row.push(outcome.doi.clone());
            row.push(outcome.abstract_text.clone());
            row
        })
        .collect()
}
