use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};

use crate::error::{Result, SchemaError};

use super::{Binding, BindingStore};

const BINDINGS: TableDefinition<&str, &[u8]> = TableDefinition::new("bindings");

fn storage<E: std::fmt::Display>(e: E) -> SchemaError {
    SchemaError::Store(e.to_string())
}

/// Bindings persisted in a redb file so consistency holds across sessions.
///
/// redb takes an exclusive lock on the file, so the registry's lock is the
/// only writer.
pub struct RedbBindings {
    db: Database,
}

impl RedbBindings {
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path).map_err(storage)?;
        let txn = db.begin_write().map_err(storage)?;
        txn.open_table(BINDINGS).map_err(storage)?;
        txn.commit().map_err(storage)?;
        Ok(Self { db })
    }
}

fn decode(bytes: &[u8]) -> Result<Binding> {
    serde_json::from_slice(bytes).map_err(|e| SchemaError::Store(format!("corrupt binding: {e}")))
}

impl BindingStore for RedbBindings {
    fn get(&self, field_name: &str) -> Result<Option<Binding>> {
        let txn = self.db.begin_read().map_err(storage)?;
        let table = txn.open_table(BINDINGS).map_err(storage)?;
        let value = table.get(field_name).map_err(storage)?;
        value.map(|v| decode(v.value())).transpose()
    }

    fn list(&self) -> Result<Vec<Binding>> {
        let txn = self.db.begin_read().map_err(storage)?;
        let table = txn.open_table(BINDINGS).map_err(storage)?;
        let mut out = Vec::new();
        for entry in table.iter().map_err(storage)? {
            let (_, value) = entry.map_err(storage)?;
            out.push(decode(value.value())?);
        }
        Ok(out)
    }

    fn insert_all(&mut self, bindings: &[Binding]) -> Result<()> {
        let txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = txn.open_table(BINDINGS).map_err(storage)?;
            for binding in bindings {
                let value = serde_json::to_vec(binding).map_err(storage)?;
                table
                    .insert(binding.field_name.as_str(), value.as_slice())
                    .map_err(storage)?;
            }
        }
        txn.commit().map_err(storage)?;
        Ok(())
    }
}
