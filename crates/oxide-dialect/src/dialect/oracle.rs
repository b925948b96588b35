//! Oracle dialect.
//!
//! Oracle limits identifiers to 30 characters, stores catalog names upper-case
//! and requires a column's `DEFAULT` to precede its constraints in
//! `CREATE TABLE`. Pagination uses `ROWNUM`, which works on every server
//! version; `OFFSET ... FETCH NEXT` needs 12c and is not emitted.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use sha1::{Digest, Sha1};
use tracing::debug;

use super::{common_key_name, keyword_fragment, parse_bound, resolve_value, with_modifiers, Dialect};
use crate::catalog::{self, CatalogConnection};
use crate::error::{DialectError, Result};
use crate::field::{tag, FieldDescription, ScalarKind};

/// Maximum identifier length accepted by Oracle.
pub const MAX_IDENTIFIER_LENGTH: usize = 30;

/// Length a shortened identifier is cut to when it is still too long.
pub const TRUNCATED_IDENTIFIER_LENGTH: usize = 29;

/// `VARCHAR2` limit with `MAX_STRING_SIZE = STANDARD`.
const MAX_VARCHAR2_SIZE: i64 = 4000;

static KEY_PREFIX_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(_*[^a-zA-Z]+_*|_+)").expect("valid key prefix pattern"));

/// Oracle dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleDialect;

impl OracleDialect {
    /// Creates a new Oracle dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Rewrites generic type names from a `TYPE` tag into Oracle types.
    ///
    /// Unlike a plain substring replace, `nvarchar` and `binary` match in any
    /// case, the inserted text follows the matched case, and `nvarchar2` is
    /// left as is.
    #[must_use]
    pub fn normalize_type_override(declared: &str) -> String {
        let lower = declared.to_ascii_lowercase();
        match lower.as_str() {
            "bigint" => "NUMBER(19)".to_string(),
            "integer" => "NUMBER(10)".to_string(),
            "datetime" => "TIMESTAMP".to_string(),
            "tinyint" => "NUMBER(3)".to_string(),
            _ => {
                if let Some(at) = lower.find("nvarchar") {
                    let end = at + "nvarchar".len();
                    if lower[end..].starts_with('2') {
                        return declared.to_string();
                    }
                    format!("{}2{}", &declared[..end], &declared[end..])
                } else if let Some(at) = lower.find("binary") {
                    let end = at + "binary".len();
                    let raw = if declared[at..end].bytes().all(|b| b.is_ascii_uppercase()) {
                        "RAW"
                    } else {
                        "raw"
                    };
                    format!("{}{raw}{}", &declared[..at], &declared[end..])
                } else {
                    declared.to_string()
                }
            }
        }
    }

    /// Infers the column type from the value kind alone.
    fn type_for_kind(kind: ScalarKind, size: i64) -> Option<String> {
        let sql_type = match kind {
            ScalarKind::Bool => "CHAR(1)".to_string(),
            k if k.is_narrow_integer() => "NUMBER(10)".to_string(),
            k if k.is_wide_integer() => "NUMBER(19)".to_string(),
            k if k.is_float() => "FLOAT".to_string(),
            ScalarKind::Text => {
                if size > 0 && size < MAX_VARCHAR2_SIZE {
                    format!("VARCHAR2({size})")
                } else {
                    "VARCHAR2(255)".to_string()
                }
            }
            ScalarKind::Timestamp => "TIMESTAMP".to_string(),
            ScalarKind::Bytes => "BLOB".to_string(),
            _ => return None,
        };
        Some(sql_type)
    }

    /// Shortens a key name that exceeds [`MAX_IDENTIFIER_LENGTH`].
    ///
    /// The result is the sanitized first field followed by the SHA-1 of the
    /// full name, cut to 29 characters when still too long. A cut can drop
    /// the whole digest when the first field is long.
    fn shorten_key_name(key_name: &str, first_field: &str) -> String {
        let digest = Sha1::digest(key_name.as_bytes());
        let mut shortened = KEY_PREFIX_SEPARATORS
            .replace_all(first_field, "_")
            .into_owned();
        shortened.extend(digest.iter().map(|byte| format!("{byte:02x}")));

        if shortened.len() > MAX_IDENTIFIER_LENGTH {
            shortened.truncate(TRUNCATED_IDENTIFIER_LENGTH);
        }
        shortened
    }
}

impl Dialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn quote(&self, key: &str) -> String {
        format!("\"{}\"", key.to_uppercase())
    }

    fn bind_var(&self, position: usize) -> String {
        format!(":{position}")
    }

    fn select_from_dummy_table(&self) -> &'static str {
        "FROM dual"
    }

    fn try_data_type_of(&self, field: &FieldDescription) -> Result<String> {
        let explicit = field.explicit_type().map_or_else(String::new, |declared| {
            let normalized = Self::normalize_type_override(declared);
            if normalized != declared {
                debug!(field = %field.name, from = %declared, to = %normalized, "Normalized type override");
            }
            normalized
        });

        let (mut sql_type, value) = resolve_value(self, field, explicit);
        if sql_type.trim().is_empty() {
            sql_type = Self::type_for_kind(value.kind(), field.requested_size()).ok_or_else(|| {
                DialectError::UnresolvedType {
                    dialect: self.name(),
                    field: field.name.clone(),
                    type_name: value.type_name().to_string(),
                    kind: value.kind(),
                }
            })?;
        }

        // DEFAULT must precede NOT NULL / UNIQUE or CREATE TABLE fails.
        Ok(with_modifiers(
            &sql_type,
            [
                keyword_fragment("DEFAULT", field.modifier(tag::DEFAULT)),
                field.modifier(tag::NOT_NULL).to_string(),
                field.modifier(tag::UNIQUE).to_string(),
                keyword_fragment("COMMENT", field.modifier(tag::COMMENT)),
            ],
        ))
    }

    fn has_index(&self, conn: &dyn CatalogConnection, table_name: &str, index_name: &str) -> bool {
        let (table, index) = (table_name.to_uppercase(), index_name.to_uppercase());
        catalog::exists(
            conn,
            "SELECT COUNT(*) FROM USER_INDEXES WHERE TABLE_NAME = :1 AND INDEX_NAME = :2",
            &[table.as_str(), index.as_str()],
        )
    }

    fn has_foreign_key(
        &self,
        conn: &dyn CatalogConnection,
        table_name: &str,
        foreign_key_name: &str,
    ) -> bool {
        let (table, constraint) = (table_name.to_uppercase(), foreign_key_name.to_uppercase());
        catalog::exists(
            conn,
            "SELECT COUNT(*) FROM USER_CONSTRAINTS WHERE CONSTRAINT_TYPE = 'R' AND TABLE_NAME = :1 AND CONSTRAINT_NAME = :2",
            &[table.as_str(), constraint.as_str()],
        )
    }

    fn has_table(&self, conn: &dyn CatalogConnection, table_name: &str) -> bool {
        let table = table_name.to_uppercase();
        catalog::exists(
            conn,
            "SELECT COUNT(*) FROM USER_TABLES WHERE TABLE_NAME = :1",
            &[table.as_str()],
        )
    }

    fn has_column(&self, conn: &dyn CatalogConnection, table_name: &str, column_name: &str) -> bool {
        let (table, column) = (table_name.to_uppercase(), column_name.to_uppercase());
        catalog::exists(
            conn,
            "SELECT COUNT(*) FROM USER_TAB_COLUMNS WHERE TABLE_NAME = :1 AND COLUMN_NAME = :2",
            &[table.as_str(), column.as_str()],
        )
    }

    fn limit_and_offset_sql(
        &self,
        limit: Option<&dyn fmt::Display>,
        _offset: Option<&dyn fmt::Display>,
    ) -> String {
        parse_bound(limit).map_or_else(String::new, |limit| format!(" ROWNUM <= {limit}"))
    }

    fn build_key_name(&self, kind: &str, table_name: &str, fields: &[&str]) -> String {
        let key_name = common_key_name(kind, table_name, fields);
        if key_name.chars().count() <= MAX_IDENTIFIER_LENGTH {
            return key_name;
        }

        let shortened = Self::shorten_key_name(&key_name, fields.first().copied().unwrap_or_default());
        debug!(key_name = %key_name, shortened = %shortened, "Shortened key name");
        shortened
    }

    fn modify_column_sql(&self, table_name: &str, column_name: &str, type_name: &str) -> String {
        format!(
            "ALTER TABLE {} MODIFY {} {}",
            self.quote(table_name),
            self.quote(column_name),
            type_name
        )
    }
}
