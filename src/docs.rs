//! Field doc comment lookup with a per-module cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::decl::{DocTable, ModuleDocs};
use crate::error::DocError;
use crate::ir::QualifiedName;

/// Resolves the documentation of one field of one record.
pub trait DocLookup {
    fn resolve(&self, record: &QualifiedName, field: &str) -> Result<String, DocError>;
}

/// [`DocLookup`] over a [`ModuleDocs`] source.
///
/// The first lookup touching a module loads that module's whole doc table;
/// later lookups in the same module are served from the cache. The cache lives
/// as long as the resolver, which is meant to be one generation run. The lock
/// is held while a module loads, so concurrent workers never parse the same
/// module twice.
pub struct DocCommentResolver<S> {
    source: S,
    modules: Mutex<HashMap<String, Arc<DocTable>>>,
}

impl<S: ModuleDocs> DocCommentResolver<S> {
    pub fn new(source: S) -> Self {
        Self { source, modules: Mutex::new(HashMap::new()) }
    }

    /// Number of modules loaded so far.
    pub fn loaded_modules(&self) -> usize {
        self.modules.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn module_table(&self, module: &str) -> Result<Arc<DocTable>, DocError> {
        let mut modules = self.modules.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = modules.get(module) {
            return Ok(Arc::clone(table));
        }

        debug!(module, "loading doc comments");
        let table = self.source.module_docs(module).map_err(|source| DocError::Module {
            module: module.to_string(),
            source,
        })?;
        let table = Arc::new(table);
        modules.insert(module.to_string(), Arc::clone(&table));
        Ok(table)
    }
}

impl<S: ModuleDocs> DocLookup for DocCommentResolver<S> {
    fn resolve(&self, record: &QualifiedName, field: &str) -> Result<String, DocError> {
        let table = self.module_table(&record.module)?;
        let doc = table
            .get(&(record.name.clone(), field.to_string()))
            .ok_or(DocError::NotFound)?;

        let trimmed = doc.trim();
        if trimmed.is_empty() {
            return Err(DocError::Empty);
        }
        Ok(trimmed.to_string())
    }
}

impl<T: DocLookup + ?Sized> DocLookup for &T {
    fn resolve(&self, record: &QualifiedName, field: &str) -> Result<String, DocError> {
        (**self).resolve(record, field)
    }
}
