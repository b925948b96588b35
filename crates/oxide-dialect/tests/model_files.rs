//! Resolving JSON model files end to end.

mod common;
use common::*;

use std::fs;

use oxide_dialect::prelude::*;

const MODEL: &str = r#"{
    "tables": [
        {
            "name": "customer_orders",
            "fields": [
                { "name": "id", "kind": "i64", "primary_key": true },
                { "name": "status", "kind": "text", "tags": { "SIZE": "20", "NOT NULL": "NOT NULL", "DEFAULT": "'new'" } },
                { "name": "created_at_timestamp", "kind": "timestamp" },
                { "name": "legacy_code", "kind": "text", "tags": { "TYPE": "nvarchar(12)" } }
            ],
            "indexes": [
                { "kind": "idx", "fields": ["status"] },
                { "kind": "idx", "fields": ["id", "created_at_timestamp"] }
            ]
        }
    ]
}"#;

fn write_model(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("orders.json");
    fs::write(&path, MODEL).unwrap();
    path
}

#[test]
fn model_file_matches_hand_built_fields() {
    let dir = tempfile::tempdir().unwrap();
    let model = ModelFile::from_path(write_model(&dir)).unwrap();
    let fields = model.tables[0].descriptions();

    let by_hand = [
        FieldDescription::of::<i64>("id").primary_key(),
        FieldDescription::of::<String>("status")
            .size(20)
            .not_null()
            .default_value("'new'"),
        FieldDescription::of::<chrono::NaiveDateTime>("created_at_timestamp"),
        FieldDescription::of::<String>("legacy_code").type_override("nvarchar(12)"),
    ];

    for (loaded, built) in fields.iter().zip(&by_hand) {
        assert_eq!(oracle_type(loaded), oracle_type(built), "field {}", built.name);
    }
    assert_eq!(oracle_type(&fields[1]), "VARCHAR2(20) DEFAULT 'new' NOT NULL");
    assert_eq!(oracle_type(&fields[3]), "nvarchar2(12)");
}

#[test]
fn index_names_follow_dialect() {
    let model = ModelFile::from_json(MODEL).unwrap();
    let table = &model.tables[0];

    let oracle_names: Vec<String> = table
        .indexes
        .iter()
        .map(|index| index.key_name(&oracle(), &table.name))
        .collect();
    assert_eq!(
        oracle_names,
        vec!["idx_customer_orders_status", "idd317923fa85288843fe860917d9"]
    );

    let common = CommonDialect::new();
    assert_eq!(
        table.indexes[1].key_name(&common, &table.name),
        "idx_customer_orders_id_created_at_timestamp"
    );
}

#[test]
fn registry_resolves_whole_model() {
    let model = ModelFile::from_json(MODEL).unwrap();
    let registry = DialectRegistry::with_builtin();

    for name in registry.names() {
        let dialect = registry.require(name).unwrap();
        for field in model.tables[0].descriptions() {
            assert!(
                dialect.try_data_type_of(&field).is_ok(),
                "{name} failed on {}",
                field.name
            );
        }
    }
}

#[test]
fn invalid_model_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(
        &path,
        r#"{ "tables": [{ "name": "orders", "fields": [], "indexes": [{ "kind": "idx", "fields": ["status"] }] }] }"#,
    )
    .unwrap();

    let err = ModelFile::from_path(&path).unwrap_err();
    assert!(matches!(err, DialectError::InvalidModel(_)));
}
