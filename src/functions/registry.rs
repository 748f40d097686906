//! # Function Registry

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::builtins::{AsTypeFunction, StringMatchFunction, TableFunction, UserFunction};
use super::errors::{FunctionError, FunctionResult};
use super::function::DelegableFunction;

/// Registry of callable functions by name
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    by_name: RwLock<HashMap<String, Arc<dyn DelegableFunction>>>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in functions
    pub fn with_builtins() -> FunctionResult<Self> {
        let registry = Self::new();
        registry.register(Arc::new(TableFunction::filter()))?;
        registry.register(Arc::new(TableFunction::lookup()))?;
        registry.register(Arc::new(TableFunction::sort()))?;
        registry.register(Arc::new(TableFunction::sort_by_columns()))?;
        registry.register(Arc::new(StringMatchFunction::starts_with()))?;
        registry.register(Arc::new(StringMatchFunction::ends_with()))?;
        registry.register(Arc::new(UserFunction))?;
        registry.register(Arc::new(AsTypeFunction))?;
        Ok(registry)
    }

    /// Register a function
    pub fn register(&self, function: Arc<dyn DelegableFunction>) -> FunctionResult<()> {
        let name = function.name().to_string();

        let mut by_name = self
            .by_name
            .write()
            .map_err(|_| FunctionError::Internal("Lock poisoned".into()))?;
        if by_name.contains_key(&name) {
            return Err(FunctionError::AlreadyExists(name));
        }
        by_name.insert(name, function);

        Ok(())
    }

    /// Get function by name
    pub fn get(&self, name: &str) -> FunctionResult<Arc<dyn DelegableFunction>> {
        let by_name = self
            .by_name
            .read()
            .map_err(|_| FunctionError::Internal("Lock poisoned".into()))?;
        by_name
            .get(name)
            .cloned()
            .ok_or_else(|| FunctionError::NotFound(name.to_string()))
    }

    /// Unregister a function
    pub fn unregister(&self, name: &str) -> FunctionResult<()> {
        let mut by_name = self
            .by_name
            .write()
            .map_err(|_| FunctionError::Internal("Lock poisoned".into()))?;
        by_name
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| FunctionError::NotFound(name.to_string()))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .by_name
            .read()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Get function count
    pub fn len(&self) -> usize {
        self.by_name.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
