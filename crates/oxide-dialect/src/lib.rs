//! Database dialects for ORM schema generation.
//!
//! `oxide-dialect` answers the database-specific questions a schema generator
//! asks while it turns mapped entities into DDL:
//! - which column type a field gets, modifiers included
//! - what a generated index or constraint is called, within the database's
//!   identifier length limit
//! - whether a table, column, index or foreign key already exists
//! - how identifiers, bind markers and pagination are spelled
//!
//! # Dialects
//!
//! - **Oracle** - `NUMBER`/`VARCHAR2` types, upper-cased quoting, `:n` bind
//!   markers, `ROWNUM` pagination and 30-character identifiers shortened with
//!   a SHA-1 digest
//! - **Common** - generic SQL used when no product dialect applies
//!
//! # Example
//!
//! ```rust
//! use oxide_dialect::prelude::*;
//!
//! let oracle = OracleDialect::new();
//!
//! let status = FieldDescription::of::<String>("status")
//!     .size(20)
//!     .default_value("'new'")
//!     .not_null();
//! assert_eq!(oracle.data_type_of(&status), "VARCHAR2(20) DEFAULT 'new' NOT NULL");
//!
//! let id = FieldDescription::of::<i64>("id").primary_key();
//! assert_eq!(oracle.data_type_of(&id), "NUMBER(19)");
//!
//! assert_eq!(oracle.build_key_name("idx", "orders", &["status"]), "idx_orders_status");
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Resolve every field and index name of a model file
//! oxide-dialect types model.json
//!
//! # Name an index
//! oxide-dialect key-name idx customer_orders id created_at_timestamp
//!
//! # Use the common dialect instead
//! OXIDE_DIALECT=common oxide-dialect limit --limit 10 --offset 20
//! ```

pub mod catalog;
pub mod dialect;
pub mod error;
pub mod field;
pub mod model;
pub mod registry;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::catalog::CatalogConnection;
    pub use crate::dialect::{CommonDialect, Dialect, OracleDialect};
    pub use crate::error::{DialectError, Result};
    pub use crate::field::{
        tag, DeclaresDialectType, FieldDescription, FieldValue, ScalarKind, TagSettings,
        ValueShape,
    };
    pub use crate::model::{FieldModel, IndexModel, ModelFile, ShapeModel, TableModel};
    pub use crate::registry::DialectRegistry;
}
