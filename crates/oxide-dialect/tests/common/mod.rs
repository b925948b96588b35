#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeSet;

use oxide_dialect::prelude::*;

/// In-memory catalog answering existence queries by their bound arguments.
#[derive(Default)]
pub struct FakeCatalog {
    existing: BTreeSet<Vec<String>>,
    database: Option<String>,
    failing: bool,
    queries: RefCell<Vec<(String, Vec<String>)>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes any query bound with exactly `args` report a match.
    pub fn with_object(mut self, args: &[&str]) -> Self {
        self.existing
            .insert(args.iter().map(ToString::to_string).collect());
        self
    }

    pub fn with_database(mut self, name: &str) -> Self {
        self.database = Some(name.to_string());
        self
    }

    /// Makes every query fail.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn queries(&self) -> Vec<(String, Vec<String>)> {
        self.queries.borrow().clone()
    }

    pub fn last_query(&self) -> (String, Vec<String>) {
        self.queries
            .borrow()
            .last()
            .cloned()
            .unwrap_or_else(|| panic!("no query was run"))
    }

    fn record(&self, sql: &str, args: &[&str]) -> Result<Vec<String>> {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        self.queries
            .borrow_mut()
            .push((sql.to_string(), args.clone()));
        if self.failing {
            return Err(DialectError::Catalog("connection reset by peer".to_string()));
        }
        Ok(args)
    }
}

impl CatalogConnection for FakeCatalog {
    fn query_count(&self, sql: &str, args: &[&str]) -> Result<i64> {
        let args = self.record(sql, args)?;
        Ok(i64::from(self.existing.contains(&args)))
    }

    fn query_text(&self, sql: &str, args: &[&str]) -> Result<Option<String>> {
        self.record(sql, args)?;
        Ok(self.database.clone())
    }
}

pub fn oracle() -> OracleDialect {
    OracleDialect::new()
}

pub fn oracle_type(field: &FieldDescription) -> String {
    oracle().data_type_of(field)
}
