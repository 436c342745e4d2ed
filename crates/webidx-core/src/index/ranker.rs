//! Ranked query execution.

use super::query::CompiledQuery;
use crate::config::IndexSchema;
use crate::engine::IndexDatabase;
use crate::Result;
use rusqlite::types::ValueRef;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::debug;

/// A page matched by a query, with its summed hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPage {
    pub page_id: i64,
    /// Relevance: hits summed over every query term.
    pub hits: i64,
    /// Every column of the page row, keyed by column name.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl RankedPage {
    pub fn title(&self) -> &str {
        self.text_attribute(IndexSchema::TITLE_ATTRIBUTE)
    }

    pub fn url(&self) -> &str {
        self.text_attribute(IndexSchema::URL_ATTRIBUTE)
    }

    fn text_attribute(&self, name: &str) -> &str {
        self.attributes
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Build from a result row whose last two columns are page id and hits.
    fn from_row(row: &Row, columns: &[String]) -> rusqlite::Result<Self> {
        let attribute_count = columns.len().saturating_sub(2);

        let mut attributes = Map::new();
        for (i, name) in columns.iter().enumerate().take(attribute_count) {
            attributes.insert(name.clone(), json_value(row.get_ref(i)?));
        }

        Ok(Self {
            page_id: row.get(attribute_count)?,
            hits: row.get(attribute_count + 1)?,
            attributes,
        })
    }
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        // Blobs are not surfaced.
        ValueRef::Blob(_) => Value::Null,
    }
}

/// Execute a compiled query, most relevant page first.
///
/// Engine errors (a missing table, say) are returned as they are.
///
/// # Panics
///
/// If the prepared statement's parameter count differs from the number of
/// terms.
pub fn run(query: &CompiledQuery, database: &IndexDatabase) -> Result<Vec<RankedPage>> {
    let start = Instant::now();

    database.with_connection(|conn| {
        let mut stmt = conn.prepare(query.sql())?;
        assert_eq!(
            stmt.parameter_count(),
            query.terms().len(),
            "query parameter mismatch: statement takes {} parameters, {} terms",
            stmt.parameter_count(),
            query.terms().len()
        );

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let bindings = query.bindings();
        let mut rows = stmt.query(bindings.as_slice())?;

        let mut pages = Vec::new();
        while let Some(row) = rows.next()? {
            pages.push(RankedPage::from_row(row, &columns)?);
        }

        debug!(
            "Ranked {} pages for {:?} in {:?}",
            pages.len(),
            query.terms(),
            start.elapsed()
        );
        Ok(pages)
    })
}
