//! JSON model files describing tables, their fields and their indexes.
//!
//! A model file is the serialized form of what an ORM would reflect from its
//! entity types. It lets dialect resolution run without compiling the
//! entities themselves.
//!
//! ```json
//! {
//!   "tables": [{
//!     "name": "orders",
//!     "fields": [
//!       { "name": "id", "kind": "i64", "primary_key": true },
//!       { "name": "status", "kind": "text", "tags": { "size": "20", "not null": "NOT NULL" } },
//!       { "name": "total", "kind": "struct", "type_name": "Money",
//!         "dialect_types": { "oracle": "NUMBER(12,2)" } }
//!     ],
//!     "indexes": [{ "kind": "idx", "fields": ["status"] }]
//!   }]
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::{DialectError, Result};
use crate::field::{DeclaresDialectType, FieldDescription, ScalarKind, TagSettings, ValueShape};

/// Contents of a model file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFile {
    /// Mapped tables.
    #[serde(default)]
    pub tables: Vec<TableModel>,
}

/// One mapped table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableModel {
    /// Table name.
    pub name: String,
    /// Mapped fields, in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldModel>,
    /// Indexes and constraints whose names are generated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<IndexModel>,
}

/// One mapped field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldModel {
    /// Field name.
    pub name: String,
    /// Value shape of the field.
    #[serde(flatten)]
    pub shape: ShapeModel,
    /// Tag settings.
    #[serde(default, skip_serializing_if = "TagSettings::is_empty")]
    pub tags: TagSettings,
    /// Whether this field is the primary key.
    #[serde(default)]
    pub primary_key: bool,
}

/// Serialized form of a [`ValueShape`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeModel {
    /// Reflected kind.
    pub kind: ScalarKind,
    /// Name of the value type, defaults to the kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// First member of a struct-shaped scanner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scans: Option<Box<Self>>,
    /// Column type the value declares per dialect name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dialect_types: BTreeMap<String, String>,
}

/// A generated index or constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexModel {
    /// Key kind prefix, such as `idx`, `uix` or `fk`.
    pub kind: String,
    /// Indexed fields.
    pub fields: Vec<String>,
}

/// Dialect type hook backed by a per-dialect lookup table.
///
/// Dialects missing from the table get `""`, so they fall back to inference.
#[derive(Debug, Clone)]
struct DialectTypeTable(BTreeMap<String, String>);

impl DeclaresDialectType for DialectTypeTable {
    fn dialect_type(&self, dialect: &dyn Dialect) -> String {
        self.0.get(dialect.name()).cloned().unwrap_or_default()
    }
}

impl ModelFile {
    /// Reads and validates a model file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, is not valid JSON, or describes an
    /// invalid model.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses and validates a model from JSON.
    ///
    /// # Errors
    ///
    /// Fails when `json` is malformed or describes an invalid model.
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Serializes the model as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Fails when serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks names and index references.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::InvalidModel`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        let mut tables = BTreeSet::new();
        for table in &self.tables {
            if table.name.trim().is_empty() {
                return Err(DialectError::InvalidModel("table with empty name".into()));
            }
            if !tables.insert(table.name.as_str()) {
                return Err(DialectError::InvalidModel(format!(
                    "duplicate table '{}'",
                    table.name
                )));
            }
            table.validate()?;
        }
        Ok(())
    }
}

impl TableModel {
    fn validate(&self) -> Result<()> {
        let mut fields = BTreeSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(DialectError::InvalidModel(format!(
                    "field with empty name in table '{}'",
                    self.name
                )));
            }
            if !fields.insert(field.name.as_str()) {
                return Err(DialectError::InvalidModel(format!(
                    "duplicate field '{}' in table '{}'",
                    field.name, self.name
                )));
            }
        }

        for index in &self.indexes {
            if index.kind.trim().is_empty() {
                return Err(DialectError::InvalidModel(format!(
                    "index with empty kind in table '{}'",
                    self.name
                )));
            }
            if let Some(missing) = index.fields.iter().find(|f| !fields.contains(f.as_str())) {
                return Err(DialectError::InvalidModel(format!(
                    "index '{}' on table '{}' references unknown field '{missing}'",
                    index.kind, self.name
                )));
            }
        }
        Ok(())
    }

    /// Returns the field descriptions of this table.
    #[must_use]
    pub fn descriptions(&self) -> Vec<FieldDescription> {
        self.fields.iter().map(FieldModel::to_description).collect()
    }
}

impl FieldModel {
    /// Converts the model into the description dialects resolve.
    #[must_use]
    pub fn to_description(&self) -> FieldDescription {
        let mut field = FieldDescription::new(self.name.clone(), self.shape.to_shape());
        field.tags = self.tags.clone();
        field.primary_key = self.primary_key;
        field
    }
}

impl ShapeModel {
    /// Creates a plain shape model of `kind`.
    #[must_use]
    pub const fn new(kind: ScalarKind) -> Self {
        Self {
            kind,
            type_name: None,
            scans: None,
            dialect_types: BTreeMap::new(),
        }
    }

    /// Builds the value shape, attaching the dialect type table as a hook.
    #[must_use]
    pub fn to_shape(&self) -> ValueShape {
        let type_name = self
            .type_name
            .clone()
            .unwrap_or_else(|| self.kind.as_str().to_string());
        let mut shape = ValueShape::new(self.kind, type_name);
        if !self.dialect_types.is_empty() {
            shape = shape.with_dialect_type(DialectTypeTable(self.dialect_types.clone()));
        }
        if let Some(inner) = &self.scans {
            shape = shape.scanning(inner.to_shape());
        }
        shape
    }
}

impl IndexModel {
    /// Generates the key name of this index on `table_name`.
    #[must_use]
    pub fn key_name(&self, dialect: &dyn Dialect, table_name: &str) -> String {
        let fields: Vec<&str> = self.fields.iter().map(String::as_str).collect();
        dialect.build_key_name(&self.kind, table_name, &fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{CommonDialect, OracleDialect};

    const ORDERS: &str = r#"{
        "tables": [{
            "name": "orders",
            "fields": [
                { "name": "id", "kind": "i64", "primary_key": true },
                { "name": "status", "kind": "text", "tags": { "size": "20", "not null": "NOT NULL" } },
                { "name": "total", "kind": "struct", "type_name": "Money",
                  "dialect_types": { "oracle": "NUMBER(12,2)" } },
                { "name": "shipped_at", "kind": "struct", "type_name": "NullTime",
                  "scans": { "kind": "timestamp" } }
            ],
            "indexes": [{ "kind": "idx", "fields": ["status"] }]
        }]
    }"#;

    #[test]
    fn test_parse_and_resolve() {
        let model = ModelFile::from_json(ORDERS).unwrap();
        let table = &model.tables[0];
        let oracle = OracleDialect::new();
        let types: Vec<String> = table
            .descriptions()
            .iter()
            .map(|f| oracle.data_type_of(f))
            .collect();
        assert_eq!(
            types,
            vec!["NUMBER(19)", "VARCHAR2(20) NOT NULL", "NUMBER(12,2)", "TIMESTAMP"]
        );
        assert_eq!(table.indexes[0].key_name(&oracle, &table.name), "idx_orders_status");
    }

    #[test]
    fn test_dialect_types_missing_for_dialect() {
        let model = ModelFile::from_json(ORDERS).unwrap();
        let total = model.tables[0].fields[2].to_description();
        assert!(CommonDialect::new().try_data_type_of(&total).is_err());
    }

    #[test]
    fn test_tags_are_case_insensitive() {
        let model = ModelFile::from_json(ORDERS).unwrap();
        let status = model.tables[0].fields[1].to_description();
        assert_eq!(status.tags.get("SIZE"), Some("20"));
        assert_eq!(status.modifier("NOT NULL"), "NOT NULL");
    }

    #[test]
    fn test_type_name_defaults_to_kind() {
        let shape = ShapeModel::new(ScalarKind::U16).to_shape();
        assert_eq!(shape.type_name(), "u16");
    }

    #[test]
    fn test_rejects_unknown_index_field() {
        let json = r#"{ "tables": [{ "name": "t", "fields": [{ "name": "a", "kind": "bool" }],
            "indexes": [{ "kind": "idx", "fields": ["b"] }] }] }"#;
        let err = ModelFile::from_json(json).unwrap_err();
        assert!(matches!(err, DialectError::InvalidModel(_)));
        assert!(err.to_string().contains("unknown field 'b'"));
    }

    #[test]
    fn test_rejects_duplicates() {
        let json = r#"{ "tables": [{ "name": "t", "fields": [
            { "name": "a", "kind": "bool" }, { "name": "a", "kind": "i32" } ] }] }"#;
        assert!(matches!(
            ModelFile::from_json(json),
            Err(DialectError::InvalidModel(_))
        ));

        let json = r#"{ "tables": [{ "name": "t" }, { "name": "t" }] }"#;
        assert!(matches!(
            ModelFile::from_json(json),
            Err(DialectError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ModelFile::from_json("{ \"tables\": [ "),
            Err(DialectError::Serialization(_))
        ));
        assert!(matches!(
            ModelFile::from_json(r#"{ "tables": [{ "name": "t", "fields": [{ "name": "a", "kind": "decimal" }] }] }"#),
            Err(DialectError::Serialization(_))
        ));
    }

    #[test]
    fn test_to_json_reparses() {
        let model = ModelFile::from_json(ORDERS).unwrap();
        let again = ModelFile::from_json(&model.to_json().unwrap()).unwrap();
        assert_eq!(model, again);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, ORDERS).unwrap();
        assert_eq!(ModelFile::from_path(&path).unwrap().tables.len(), 1);

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            ModelFile::from_path(missing),
            Err(DialectError::Io(_))
        ));
    }
}
