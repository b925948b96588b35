//! Database-agnostic dialect.
//!
//! Used when no product-specific dialect is selected, and as the source of the
//! generic key naming convention other dialects build on.

use std::fmt;

use super::{keyword_fragment, parse_bound, resolve_value, with_modifiers, Dialect};
use crate::catalog::{self, CatalogConnection};
use crate::error::{DialectError, Result};
use crate::field::{tag, FieldDescription, ScalarKind};

/// Largest `VARCHAR`/`BINARY` length the generic mapping emits.
const MAX_VARIABLE_SIZE: i64 = 65532;

/// Common SQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonDialect;

impl CommonDialect {
    /// Creates a new common dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the name of the connection's current database.
    #[must_use]
    pub fn current_database(self, conn: &dyn CatalogConnection) -> String {
        catalog::text(conn, "SELECT DATABASE()", &[]).unwrap_or_default()
    }

    /// Splits `schema.table`, asking the connection when no schema is given.
    fn database_and_table(self, conn: &dyn CatalogConnection, table_name: &str) -> (String, String) {
        match table_name.split_once('.') {
            Some((schema, table)) => (schema.to_string(), table.to_string()),
            None => (self.current_database(conn), table_name.to_string()),
        }
    }

    /// Returns whether a field should get `AUTO_INCREMENT`.
    ///
    /// An `AUTO_INCREMENT` tag decides when present; otherwise primary keys do.
    fn can_auto_increment(field: &FieldDescription) -> bool {
        field.tags.get(tag::AUTO_INCREMENT).map_or(field.primary_key, |value| {
            !value.eq_ignore_ascii_case("false")
        })
    }

    fn sized(name: &str, size: i64) -> String {
        if size > 0 && size < MAX_VARIABLE_SIZE {
            format!("{name}({size})")
        } else {
            format!("{name}({MAX_VARIABLE_SIZE})")
        }
    }
}

impl Dialect for CommonDialect {
    fn name(&self) -> &'static str {
        "common"
    }

    fn bind_var(&self, _position: usize) -> String {
        "?".to_string()
    }

    fn try_data_type_of(&self, field: &FieldDescription) -> Result<String> {
        let explicit = field.explicit_type().unwrap_or_default().to_string();
        let (mut sql_type, value) = resolve_value(self, field, explicit);

        if sql_type.trim().is_empty() {
            let size = field.requested_size();
            let auto_increment = if Self::can_auto_increment(field) {
                " AUTO_INCREMENT"
            } else {
                ""
            };
            sql_type = match value.kind() {
                ScalarKind::Bool => "BOOLEAN".to_string(),
                k if k.is_narrow_integer() => format!("INTEGER{auto_increment}"),
                k if k.is_wide_integer() => format!("BIGINT{auto_increment}"),
                k if k.is_float() => "FLOAT".to_string(),
                ScalarKind::Text => Self::sized("VARCHAR", size),
                ScalarKind::Timestamp => "TIMESTAMP".to_string(),
                ScalarKind::Bytes => Self::sized("BINARY", size),
                kind => {
                    return Err(DialectError::UnresolvedType {
                        dialect: self.name(),
                        field: field.name.clone(),
                        type_name: value.type_name().to_string(),
                        kind,
                    })
                }
            };
        }

        Ok(with_modifiers(
            &sql_type,
            [
                field.modifier(tag::NOT_NULL).to_string(),
                field.modifier(tag::UNIQUE).to_string(),
                keyword_fragment("DEFAULT", field.modifier(tag::DEFAULT)),
            ],
        ))
    }

    fn has_index(&self, conn: &dyn CatalogConnection, table_name: &str, index_name: &str) -> bool {
        let (database, table) = self.database_and_table(conn, table_name);
        catalog::exists(
            conn,
            "SELECT count(*) FROM INFORMATION_SCHEMA.STATISTICS WHERE table_schema = ? AND table_name = ? AND index_name = ?",
            &[database.as_str(), table.as_str(), index_name],
        )
    }

    fn has_foreign_key(
        &self,
        _conn: &dyn CatalogConnection,
        _table_name: &str,
        _foreign_key_name: &str,
    ) -> bool {
        false
    }

    fn has_table(&self, conn: &dyn CatalogConnection, table_name: &str) -> bool {
        let (database, table) = self.database_and_table(conn, table_name);
        catalog::exists(
            conn,
            "SELECT count(*) FROM INFORMATION_SCHEMA.TABLES WHERE table_schema = ? AND table_name = ?",
            &[database.as_str(), table.as_str()],
        )
    }

    fn has_column(&self, conn: &dyn CatalogConnection, table_name: &str, column_name: &str) -> bool {
        let (database, table) = self.database_and_table(conn, table_name);
        catalog::exists(
            conn,
            "SELECT count(*) FROM INFORMATION_SCHEMA.COLUMNS WHERE table_schema = ? AND table_name = ? AND column_name = ?",
            &[database.as_str(), table.as_str(), column_name],
        )
    }

    fn limit_and_offset_sql(
        &self,
        limit: Option<&dyn fmt::Display>,
        offset: Option<&dyn fmt::Display>,
    ) -> String {
        let limit = parse_bound(limit).map_or_else(String::new, |n| format!(" LIMIT {n}"));
        let offset = parse_bound(offset).map_or_else(String::new, |n| format!(" OFFSET {n}"));
        format!("{limit}{offset}")
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::field::ValueShape;

    fn dialect() -> CommonDialect {
        CommonDialect::new()
    }

    struct Catalog {
        database: Option<String>,
        args: RefCell<Vec<String>>,
    }

    impl Catalog {
        fn new(database: Option<&str>) -> Self {
            Self {
                database: database.map(str::to_string),
                args: RefCell::new(Vec::new()),
            }
        }
    }

    impl CatalogConnection for Catalog {
        fn query_count(&self, _sql: &str, args: &[&str]) -> Result<i64> {
            *self.args.borrow_mut() = args.iter().map(ToString::to_string).collect();
            Ok(1)
        }

        fn query_text(&self, sql: &str, _args: &[&str]) -> Result<Option<String>> {
            assert_eq!(sql, "SELECT DATABASE()");
            Ok(self.database.clone())
        }
    }

    #[test]
    fn test_kind_mapping() {
        let d = dialect();
        assert_eq!(d.data_type_of(&FieldDescription::of::<bool>("a")), "BOOLEAN");
        assert_eq!(d.data_type_of(&FieldDescription::of::<i32>("a")), "INTEGER");
        assert_eq!(d.data_type_of(&FieldDescription::of::<u64>("a")), "BIGINT");
        assert_eq!(d.data_type_of(&FieldDescription::of::<f64>("a")), "FLOAT");
        assert_eq!(d.data_type_of(&FieldDescription::of::<String>("a")), "VARCHAR(255)");
        assert_eq!(
            d.data_type_of(&FieldDescription::of::<String>("a").size(70000)),
            "VARCHAR(65532)"
        );
        assert_eq!(d.data_type_of(&FieldDescription::of::<Vec<u8>>("a").size(16)), "BINARY(16)");
        assert_eq!(
            d.data_type_of(&FieldDescription::of::<chrono::NaiveDateTime>("a")),
            "TIMESTAMP"
        );
    }

    #[test]
    fn test_auto_increment() {
        let d = dialect();
        assert_eq!(
            d.data_type_of(&FieldDescription::of::<i64>("id").primary_key()),
            "BIGINT AUTO_INCREMENT"
        );
        assert_eq!(
            d.data_type_of(&FieldDescription::of::<i32>("id").primary_key().tag(tag::AUTO_INCREMENT, "false")),
            "INTEGER"
        );
        assert_eq!(
            d.data_type_of(&FieldDescription::of::<i32>("seq").tag(tag::AUTO_INCREMENT, "")),
            "INTEGER AUTO_INCREMENT"
        );
    }

    #[test]
    fn test_explicit_type_is_not_normalized() {
        let field = FieldDescription::of::<String>("id").type_override("bigint");
        assert_eq!(dialect().data_type_of(&field), "bigint");
    }

    #[test]
    fn test_default_comes_last() {
        let field = FieldDescription::of::<String>("status")
            .size(20)
            .default_value("'new'")
            .not_null()
            .unique();
        assert_eq!(
            dialect().data_type_of(&field),
            "VARCHAR(20) NOT NULL UNIQUE DEFAULT 'new'"
        );
    }

    #[test]
    fn test_unresolved_type() {
        let field = FieldDescription::new("payload", ValueShape::new(ScalarKind::Struct, "Payload"));
        assert!(dialect().try_data_type_of(&field).is_err());
    }

    #[test]
    fn test_existence_checks_use_current_database() {
        let d = dialect();
        let conn = Catalog::new(Some("shop"));
        assert!(d.has_table(&conn, "orders"));
        assert_eq!(*conn.args.borrow(), vec!["shop", "orders"]);

        assert!(d.has_column(&conn, "inventory.items", "sku"));
        assert_eq!(*conn.args.borrow(), vec!["inventory", "items", "sku"]);

        assert!(d.has_index(&conn, "orders", "idx_orders_total"));
        assert_eq!(*conn.args.borrow(), vec!["shop", "orders", "idx_orders_total"]);

        assert!(!d.has_foreign_key(&conn, "orders", "fk"));
    }

    #[test]
    fn test_current_database_missing() {
        assert_eq!(dialect().current_database(&Catalog::new(None)), "");
    }

    #[test]
    fn test_limit_and_offset() {
        let d = dialect();
        assert_eq!(d.limit_and_offset_sql(Some(&10), Some(&20)), " LIMIT 10 OFFSET 20");
        assert_eq!(d.limit_and_offset_sql(None, Some(&5)), " OFFSET 5");
        assert_eq!(d.limit_and_offset_sql(Some(&"x"), Some(&-1)), "");
    }

    #[test]
    fn test_defaults() {
        let d = dialect();
        assert_eq!(d.quote("users"), "\"users\"");
        assert_eq!(d.bind_var(3), "?");
        assert_eq!(d.select_from_dummy_table(), "");
        assert_eq!(d.build_key_name("idx", "users", &["email"]), "idx_users_email");
        assert_eq!(d.remove_index_sql("users", "idx_users_email"), "DROP INDEX \"idx_users_email\"");
        assert_eq!(
            d.modify_column_sql("users", "age", "BIGINT"),
            "ALTER TABLE \"users\" ALTER COLUMN \"age\" TYPE BIGINT"
        );
    }
}
