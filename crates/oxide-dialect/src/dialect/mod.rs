//! Database dialect implementations.
//!
//! A dialect owns everything that differs between database products: how a
//! field maps to a column type, how identifiers are quoted and named, which
//! catalog views answer existence checks, and how pagination is spelled.

pub mod common;
pub mod oracle;

pub use common::CommonDialect;
pub use oracle::OracleDialect;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::CatalogConnection;
use crate::error::Result;
use crate::field::{FieldDescription, ValueShape};

static KEY_NAME_INVALID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-zA-Z0-9]+").expect("valid key name pattern"));

/// Trait for database-specific schema generation.
pub trait Dialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Quotes an identifier (table name, column name, etc.).
    fn quote(&self, key: &str) -> String {
        format!("\"{key}\"")
    }

    /// Returns the bind marker for the 1-based `position`.
    fn bind_var(&self, position: usize) -> String;

    /// Returns the `FROM` clause needed to select without a table.
    fn select_from_dummy_table(&self) -> &'static str {
        ""
    }

    /// Resolves the column type of a field, including its modifiers.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::UnresolvedType`](crate::error::DialectError::UnresolvedType)
    /// when neither tags, hooks nor the value kind determine a type.
    fn try_data_type_of(&self, field: &FieldDescription) -> Result<String>;

    /// Resolves the column type of a field, including its modifiers.
    ///
    /// # Panics
    ///
    /// Panics when no type can be determined. An unmappable field is a
    /// schema definition error; emitting a guessed type would corrupt the
    /// schema.
    fn data_type_of(&self, field: &FieldDescription) -> String {
        self.try_data_type_of(field)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Returns whether `index_name` exists on `table_name`.
    fn has_index(&self, conn: &dyn CatalogConnection, table_name: &str, index_name: &str)
        -> bool;

    /// Returns whether the foreign key constraint exists on `table_name`.
    fn has_foreign_key(
        &self,
        conn: &dyn CatalogConnection,
        table_name: &str,
        foreign_key_name: &str,
    ) -> bool;

    /// Returns whether the table exists.
    fn has_table(&self, conn: &dyn CatalogConnection, table_name: &str) -> bool;

    /// Returns whether the column exists on `table_name`.
    fn has_column(&self, conn: &dyn CatalogConnection, table_name: &str, column_name: &str)
        -> bool;

    /// Returns the pagination fragment for a limit and an offset.
    ///
    /// Values are rendered with `Display` and parsed as integer literals;
    /// unparseable or negative values are ignored.
    fn limit_and_offset_sql(
        &self,
        limit: Option<&dyn fmt::Display>,
        offset: Option<&dyn fmt::Display>,
    ) -> String;

    /// Builds the name of a generated index or constraint.
    fn build_key_name(&self, kind: &str, table_name: &str, fields: &[&str]) -> String {
        common_key_name(kind, table_name, fields)
    }

    /// Returns the clause used to insert a row of defaults.
    fn default_value_str(&self) -> &'static str {
        "DEFAULT VALUES"
    }

    /// Adjusts index and column names before they are used.
    fn normalize_index_and_column(&self, index_name: &str, column_name: &str) -> (String, String) {
        (index_name.to_string(), column_name.to_string())
    }

    /// Generates SQL for dropping an index.
    fn remove_index_sql(&self, _table_name: &str, index_name: &str) -> String {
        format!("DROP INDEX {}", self.quote(index_name))
    }

    /// Generates SQL for changing a column's type.
    fn modify_column_sql(&self, table_name: &str, column_name: &str, type_name: &str) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
            self.quote(table_name),
            self.quote(column_name),
            type_name
        )
    }
}

/// Builds `<kind>_<table>_<field>...` with every run of characters outside
/// `[a-zA-Z0-9]` collapsed to `_`.
pub(crate) fn common_key_name(kind: &str, table_name: &str, fields: &[&str]) -> String {
    let key_name = format!("{kind}_{table_name}_{}", fields.join("_"));
    KEY_NAME_INVALID_CHARS
        .replace_all(&key_name, "_")
        .into_owned()
}

/// Applies the value's capabilities to an explicit type.
///
/// A dialect type hook replaces `sql_type`. When no type is fixed afterwards,
/// scanner wrappers are unwrapped so inference sees the real scalar.
pub(crate) fn resolve_value<'a>(
    dialect: &dyn Dialect,
    field: &'a FieldDescription,
    explicit: String,
) -> (String, &'a ValueShape) {
    let sql_type = field
        .value
        .declared_dialect_type(dialect)
        .unwrap_or(explicit);
    let value = if sql_type.trim().is_empty() {
        field.value.innermost()
    } else {
        &field.value
    };
    (sql_type, value)
}

/// Renders `keyword value`, or nothing when `value` is blank.
pub(crate) fn keyword_fragment(keyword: &str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        String::new()
    } else {
        format!("{keyword} {value}")
    }
}

/// Appends the non-blank modifier fragments to a base type.
pub(crate) fn with_modifiers<I, S>(sql_type: &str, modifiers: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sql = sql_type.trim().to_string();
    for modifier in modifiers {
        let modifier = modifier.as_ref().trim();
        if !modifier.is_empty() {
            sql.push(' ');
            sql.push_str(modifier);
        }
    }
    sql
}

/// Parses a rendered pagination value as an integer literal.
///
/// Accepts an optional sign, `0x`, `0o` and `0b` prefixes, a leading `0` for
/// octal, and underscores between digits.
pub(crate) fn parse_integer(value: &dyn fmt::Display) -> Option<i64> {
    let text = value.to_string();
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'+' => (false, &text[1..]),
        b'-' => (true, &text[1..]),
        _ => (false, text.as_str()),
    };
    let lower = unsigned.to_ascii_lowercase();
    let (radix, digits, prefixed) = [("0x", 16), ("0b", 2), ("0o", 8)]
        .into_iter()
        .find_map(|(prefix, radix)| lower.strip_prefix(prefix).map(|rest| (radix, rest, true)))
        .unwrap_or_else(|| match lower.strip_prefix('0') {
            Some(rest) if !rest.is_empty() => (8, rest, true),
            _ => (10, lower.as_str(), false),
        });

    if digits.ends_with('_') || digits.contains("__") || (!prefixed && digits.starts_with('_')) {
        return None;
    }
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() || !cleaned.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }

    let magnitude = i128::from(u64::from_str_radix(&cleaned, radix).ok()?);
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

/// Parses a pagination value, keeping it only when non-negative.
pub(crate) fn parse_bound(value: Option<&dyn fmt::Display>) -> Option<i64> {
    value.and_then(parse_integer).filter(|n| *n >= 0)
}
