use tracing::info;

use crate::alias::apply_aliases;
use crate::assembler::{CompileOptions, DatasetSchema, compile_dataset};
use crate::definition::DatasetDefinition;
use crate::error::Result;
use crate::registry::{Binding, BindingStore, ConsistencyRegistry};

/// Compile a dataset definition and bind its fields in the session registry.
///
/// Every top-level field and every nested child (under its dotted path) is
/// registered in one batch, so a type conflict leaves the registry as it was
/// and no schema is returned.
pub fn compile<S: BindingStore>(
    registry: &ConsistencyRegistry<S>,
    definition: &DatasetDefinition,
) -> Result<DatasetSchema> {
    let options = CompileOptions {
        strict: definition.strict.unwrap_or(true),
    };
    let mut schema = compile_dataset(&definition.name, &definition.fields, &options)?;
    apply_aliases(&mut schema, &definition.aliases)?;

    let bindings: Vec<Binding> = schema
        .storage_types()
        .into_iter()
        .map(|(field, ty)| Binding::new(field, ty, definition.name.as_str()))
        .collect();
    registry.register_all(&bindings)?;

    info!(
        dataset = %definition.name,
        fields = schema.len(),
        aliases = schema.aliases().len(),
        strict = schema.is_strict(),
        "compiled dataset"
    );
    Ok(schema)
}
