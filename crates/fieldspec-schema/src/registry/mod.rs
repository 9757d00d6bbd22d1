mod memory;

#[cfg(feature = "redb")]
mod redb_store;

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SchemaError};
use crate::resolver::TypeTag;

pub use memory::MemoryBindings;

#[cfg(feature = "redb")]
pub use redb_store::RedbBindings;

/// A field name bound to a storage type by the first dataset that used it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub field_name: String,
    pub storage_type: TypeTag,
    pub source_dataset: String,
}

impl Binding {
    pub fn new(field_name: impl Into<String>, storage_type: TypeTag, dataset: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            storage_type,
            source_dataset: dataset.into(),
        }
    }
}

/// Persistence for registry bindings.
///
/// Stores do no conflict checking of their own; the registry serializes
/// every check-then-insert through its lock, so a store only has to make
/// `insert_all` all-or-nothing.
pub trait BindingStore: Send {
    fn get(&self, field_name: &str) -> Result<Option<Binding>>;
    fn list(&self) -> Result<Vec<Binding>>;
    fn insert_all(&mut self, bindings: &[Binding]) -> Result<()>;
}

/// Field name to storage type bindings shared by every dataset compiled in
/// one session. Bindings only accumulate: there is no removal.
pub struct ConsistencyRegistry<S: BindingStore = MemoryBindings> {
    store: Mutex<S>,
}

impl ConsistencyRegistry<MemoryBindings> {
    pub fn in_memory() -> Self {
        Self::with_store(MemoryBindings::new())
    }
}

impl Default for ConsistencyRegistry<MemoryBindings> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<S: BindingStore> ConsistencyRegistry<S> {
    pub fn with_store(store: S) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, S>> {
        self.store
            .lock()
            .map_err(|e| SchemaError::Store(format!("registry lock poisoned: {e}")))
    }

    /// Bind `field_name` to `storage_type`, or confirm an identical binding.
    pub fn register(&self, field_name: &str, storage_type: TypeTag, dataset: &str) -> Result<()> {
        self.register_all(&[Binding::new(field_name, storage_type, dataset)])
    }

    /// Register a batch atomically: either every binding is inserted or
    /// confirmed, or nothing is written and the first conflict is returned.
    pub fn register_all(&self, bindings: &[Binding]) -> Result<()> {
        let mut store = self.lock()?;
        let mut fresh: Vec<Binding> = Vec::new();

        for binding in bindings {
            let existing = match fresh.iter().find(|b| b.field_name == binding.field_name) {
                Some(pending) => Some(pending.clone()),
                None => store.get(&binding.field_name)?,
            };
            match existing {
                Some(existing) if existing.storage_type == binding.storage_type => {
                    debug!(
                        field = %binding.field_name,
                        dataset = %binding.source_dataset,
                        "binding confirmed"
                    );
                }
                Some(existing) => {
                    warn!(
                        field = %binding.field_name,
                        existing = %existing.storage_type,
                        attempted = %binding.storage_type,
                        "type conflict"
                    );
                    return Err(SchemaError::TypeConflict {
                        field: binding.field_name.clone(),
                        existing: existing.storage_type,
                        existing_dataset: existing.source_dataset,
                        attempted: binding.storage_type,
                        dataset: binding.source_dataset.clone(),
                    });
                }
                None => fresh.push(binding.clone()),
            }
        }

        if !fresh.is_empty() {
            store.insert_all(&fresh)?;
        }
        Ok(())
    }

    pub fn check(&self, field_name: &str) -> Result<Option<TypeTag>> {
        Ok(self.lock()?.get(field_name)?.map(|b| b.storage_type))
    }

    /// All bindings, ordered by field name.
    pub fn bindings(&self) -> Result<Vec<Binding>> {
        let mut all = self.lock()?.list()?;
        all.sort_by(|a, b| a.field_name.cmp(&b.field_name));
        Ok(all)
    }
}
