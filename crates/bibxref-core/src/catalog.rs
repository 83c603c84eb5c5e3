//! Catalog loading, header schema resolution and title grouping.

use std::collections::HashMap;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::warn;

use crate::config::ColumnNames;
use crate::error::{Result, XrefError};

/// One catalog row with its stable zero-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub index: usize,
    pub fields: Vec<String>,
}

/// Column positions of the logical roles, resolved once from the header.
///
/// Title is mandatory; the other roles degrade to an absent score
/// contribution when their column is not present.
#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    pub title: usize,
    pub container: Option<usize>,
    pub author: Option<usize>,
    pub year: Option<usize>,
}

impl FieldSchema {
    pub fn resolve(header: &[String], columns: &ColumnNames) -> Result<Self> {
        let position = |name: &str| header.iter().position(|field| field == name);

        let title = position(&columns.title)
            .ok_or_else(|| XrefError::MissingColumn(columns.title.clone()))?;

        let optional = |role: &str, name: &str| {
            let pos = position(name);
            if pos.is_none() {
                warn!(column = name, "{role} column not found, contribution will be skipped");
            }
            pos
        };

        Ok(Self {
            title,
            container: optional("container", &columns.container),
            author: optional("author", &columns.author),
            year: optional("year", &columns.year),
        })
    }
}

/// The "our" side of scoring: taken from a group's first record.
#[derive(Debug, Clone)]
pub struct Representative {
    pub title: String,
    pub container: Option<String>,
    pub author: Option<String>,
    pub year: Option<String>,
}

/// All records sharing one raw title string, in catalog order.
#[derive(Debug, Clone)]
pub struct TitleGroup {
    pub title: String,
    pub members: Vec<Record>,
}

impl TitleGroup {
    pub fn representative(&self, schema: &FieldSchema) -> Representative {
        let first = &self.members[0];
        let field = |pos: Option<usize>| {
            pos.and_then(|i| first.fields.get(i)).map(|s| s.to_string())
        };
        Representative {
            title: self.title.clone(),
            container: field(schema.container),
            author: field(schema.author),
            year: field(schema.year),
        }
    }
}

/// Loaded catalog: header row plus indexed data records.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub header: Vec<String>,
    pub records: Vec<Record>,
}

/// Reads the delimited catalog. Physical rows with fewer than two fields are
/// discarded before anything else; the first surviving row is the header and
/// the rest are indexed from zero.
pub fn load_catalog(path: &Path, delimiter: u8) -> Result<Catalog> {
    if !path.exists() {
        return Err(XrefError::InputNotFound(path.to_path_buf()));
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.len() < 2 {
            continue;
        }
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    let mut iter = rows.into_iter();
    let header = iter.next().unwrap_or_default();
    let records = iter
        .enumerate()
        .map(|(index, fields)| Record { index, fields })
        .collect();

    Ok(Catalog { header, records })
}

/// Partitions records by exact raw title, first-appearance order. Records
/// with an empty or missing title field all share the empty-key group.
pub fn group_by_title(records: &[Record], schema: &FieldSchema) -> Vec<TitleGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<Record>> = HashMap::new();

    for record in records {
        let title = record
            .fields
            .get(schema.title)
            .cloned()
            .unwrap_or_default();
        buckets
            .entry(title.clone())
            .or_insert_with(|| {
                order.push(title.clone());
                Vec::new()
            })
            .push(record.clone());
    }

    order
        .into_iter()
        .map(|title| {
            let members = buckets.remove(&title).unwrap_or_default();
            TitleGroup { title, members }
        })
        .collect()
}
