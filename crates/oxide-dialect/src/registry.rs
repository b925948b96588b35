//! Name-keyed set of available dialects.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::dialect::{CommonDialect, Dialect, OracleDialect};
use crate::error::{DialectError, Result};

/// Dialects addressable by their [`Dialect::name`].
#[derive(Clone, Default)]
pub struct DialectRegistry {
    dialects: BTreeMap<String, Arc<dyn Dialect>>,
}

impl DialectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the dialects shipped with this crate.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(CommonDialect::new());
        registry.register(OracleDialect::new());
        registry
    }

    /// Registers a dialect under its own name, returning the one it replaces.
    pub fn register(&mut self, dialect: impl Dialect + 'static) -> Option<Arc<dyn Dialect>> {
        let name = dialect.name();
        debug!(dialect = name, "Registering dialect");
        self.dialects.insert(name.to_string(), Arc::new(dialect))
    }

    /// Returns the dialect registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Dialect>> {
        self.dialects.get(name).cloned()
    }

    /// Returns the dialect registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::UnknownDialect`] when nothing is registered
    /// under that name.
    pub fn require(&self, name: &str) -> Result<Arc<dyn Dialect>> {
        self.get(name)
            .ok_or_else(|| DialectError::UnknownDialect(name.to_string()))
    }

    /// Returns the registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dialects.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectRegistry")
            .field("dialects", &self.dialects.keys().collect::<Vec<_>>())
            .finish()
    }
}
