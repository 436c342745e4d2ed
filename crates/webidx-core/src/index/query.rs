//! Query compilation.
//!
//! A free-text query becomes one sub-query per term, each summing that
//! term's hits per page. The sub-queries are concatenated with `UNION ALL`
//! and re-aggregated per page against `pages`, highest total first. Terms are
//! only ever bound as named parameters.

use crate::config::IndexSchema;
use rusqlite::ToSql;

/// Split a query into lowercase terms.
///
/// Splits on single spaces after trimming, so an empty query yields one
/// empty term and repeated spaces yield empty terms in between. Empty terms
/// match no word.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .trim()
        .to_lowercase()
        .split(' ')
        .map(str::to_string)
        .collect()
}

/// A parameterized ranking query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    sql: String,
    terms: Vec<String>,
    parameters: Vec<String>,
}

impl CompiledQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Parameter names, in term order.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Named bindings pairing each parameter with its term.
    ///
    /// # Panics
    ///
    /// If the number of terms and parameters differ. That can only come from
    /// a bug in the compiler.
    pub fn bindings(&self) -> Vec<(&str, &dyn ToSql)> {
        assert_eq!(
            self.terms.len(),
            self.parameters.len(),
            "query parameter mismatch: {} terms, {} parameters",
            self.terms.len(),
            self.parameters.len()
        );

        self.parameters
            .iter()
            .zip(&self.terms)
            .map(|(name, term)| (name.as_str(), term as &dyn ToSql))
            .collect()
    }
}

/// Compile a free-text query.
pub fn compile(query: &str) -> CompiledQuery {
    compile_terms(tokenize(query))
}

/// Compile an already tokenized term list.
pub fn compile_terms(terms: Vec<String>) -> CompiledQuery {
    let parameters: Vec<String> = (0..terms.len())
        .map(|i| format!("{}{}", IndexSchema::TERM_PARAMETER_PREFIX, i))
        .collect();

    let union = parameters
        .iter()
        .map(|parameter| term_subquery(parameter))
        .collect::<Vec<_>>()
        .join(" UNION ALL ");

    let sql = format!(
        "SELECT \"{pages}\".*, matched.{page_id} AS {page_id}, SUM(matched.{hits}) AS {hits} \
         FROM ({union}) AS matched \
         JOIN \"{pages}\" ON \"{pages}\".id = matched.{page_id} \
         GROUP BY matched.{page_id} \
         ORDER BY {hits} DESC",
        pages = IndexSchema::PAGES_TABLE,
        page_id = IndexSchema::PAGE_ID_COLUMN,
        hits = IndexSchema::HITS_COLUMN,
        union = union,
    );

    CompiledQuery {
        sql,
        terms,
        parameters,
    }
}

/// Per-term hit totals, grouped by page.
fn term_subquery(parameter: &str) -> String {
    format!(
        "SELECT o.{page_id} AS {page_id}, SUM(o.{hits}) AS {hits} \
         FROM \"{occurrences}\" AS o \
         JOIN \"{words}\" AS w ON o.{word_id} = w.id \
         WHERE w.{word} = {parameter} \
         GROUP BY o.{page_id}",
        page_id = IndexSchema::PAGE_ID_COLUMN,
        hits = IndexSchema::HITS_COLUMN,
        occurrences = IndexSchema::OCCURRENCES_TABLE,
        words = IndexSchema::WORDS_TABLE,
        word_id = IndexSchema::WORD_ID_COLUMN,
        word = IndexSchema::WORD_TEXT_COLUMN,
        parameter = parameter,
    )
}
