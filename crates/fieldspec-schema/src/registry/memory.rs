use std::collections::BTreeMap;

use crate::error::Result;

use super::{Binding, BindingStore};

/// Session-scoped bindings, dropped with the registry.
#[derive(Debug, Default)]
pub struct MemoryBindings {
    bindings: BTreeMap<String, Binding>,
}

impl MemoryBindings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BindingStore for MemoryBindings {
    fn get(&self, field_name: &str) -> Result<Option<Binding>> {
        Ok(self.bindings.get(field_name).cloned())
    }

    fn list(&self) -> Result<Vec<Binding>> {
        Ok(self.bindings.values().cloned().collect())
    }

    fn insert_all(&mut self, bindings: &[Binding]) -> Result<()> {
        for binding in bindings {
            self.bindings
                .insert(binding.field_name.clone(), binding.clone());
        }
        Ok(())
    }
}
