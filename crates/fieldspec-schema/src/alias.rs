use tracing::debug;

use crate::assembler::DatasetSchema;
use crate::definition::AliasLookup;
use crate::error::{Result, SchemaError};

/// Add every alias from `lookup` that names this dataset.
///
/// Aliases are resolved by the backend at query time, so the target must be
/// a top-level field of the schema and the alias must not shadow one.
pub fn apply_aliases(schema: &mut DatasetSchema, lookup: &AliasLookup) -> Result<()> {
    for (alias, targets) in lookup {
        let Some(target) = targets.get(schema.name()) else {
            continue;
        };
        if schema.get(target).is_none() {
            return Err(SchemaError::UnknownAliasTarget {
                alias: alias.clone(),
                field: target.clone(),
            });
        }
        debug!(dataset = schema.name(), alias = %alias, target = %target, "adding alias");
        schema.insert_alias(alias.clone(), target.clone())?;
    }
    Ok(())
}
