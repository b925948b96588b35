//! Catalog queries used by the existence checks.
//!
//! Dialects never own a connection. The schema-generation collaborator lends
//! one per call through [`CatalogConnection`], and the dialect runs exactly
//! one query against it.

use tracing::warn;

use crate::error::Result;

/// A connection able to answer single-row catalog queries.
///
/// Arguments are bound positionally using the dialect's bind markers.
pub trait CatalogConnection {
    /// Runs a `COUNT(*)`-style query and returns the count.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Catalog`](crate::error::DialectError::Catalog)
    /// when the query cannot be run.
    fn query_count(&self, sql: &str, args: &[&str]) -> Result<i64>;

    /// Runs a query returning at most one text value.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Catalog`](crate::error::DialectError::Catalog)
    /// when the query cannot be run.
    fn query_text(&self, sql: &str, args: &[&str]) -> Result<Option<String>>;
}

/// Runs a count query and reports whether anything matched.
///
/// A failed query reads as "does not exist".
pub(crate) fn exists(conn: &dyn CatalogConnection, sql: &str, args: &[&str]) -> bool {
    match conn.query_count(sql, args) {
        Ok(count) => count > 0,
        Err(err) => {
            warn!(sql = %sql, error = %err, "Catalog query failed, treating as absent");
            false
        }
    }
}

/// Runs a text query, reading a failure as no value.
pub(crate) fn text(conn: &dyn CatalogConnection, sql: &str, args: &[&str]) -> Option<String> {
    match conn.query_text(sql, args) {
        Ok(value) => value,
        Err(err) => {
            warn!(sql = %sql, error = %err, "Catalog query failed");
            None
        }
    }
}
