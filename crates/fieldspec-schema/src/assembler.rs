use std::collections::BTreeMap;

use tracing::debug;

use crate::definition::FieldSpec;
use crate::error::{Result, SchemaError};
use crate::identifier::FieldIdentifier;
use crate::resolver::{self, FieldDefinition, TypeTag};

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Reject documents carrying unmapped fields. Turn off only for
    /// exploratory datasets.
    pub strict: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// The compiled mapping for one dataset, ordered by field name.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSchema {
    name: String,
    strict: bool,
    fields: BTreeMap<String, FieldDefinition>,
    aliases: BTreeMap<String, String>,
}

impl DatasetSchema {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn get(&self, field: &str) -> Option<&FieldDefinition> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Alias name to target field, ordered by alias.
    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    pub(crate) fn insert_alias(&mut self, alias: String, target: String) -> Result<()> {
        if self.fields.contains_key(&alias) {
            return Err(SchemaError::DuplicateField {
                dataset: self.name.clone(),
                field: alias,
            });
        }
        self.aliases.insert(alias, target);
        Ok(())
    }

    /// Every concrete field with its storage type. Nested children appear
    /// under their dotted path (`json_funding_project.year`).
    pub fn storage_types(&self) -> BTreeMap<String, TypeTag> {
        let mut out = BTreeMap::new();
        for def in self.fields.values() {
            collect_types(def, None, &mut out);
        }
        out
    }
}

fn collect_types(def: &FieldDefinition, parent: Option<&str>, out: &mut BTreeMap<String, TypeTag>) {
    let path = match parent {
        Some(p) => format!("{p}.{}", def.name()),
        None => def.name().to_string(),
    };
    if let Some(children) = &def.nested_children {
        for child in children {
            collect_types(child, Some(&path), out);
        }
    }
    out.insert(path, def.storage_type);
}

/// Parse and resolve every declared field of a dataset into a schema.
///
/// Repeated names merge when they resolve identically and fail with
/// `DuplicateField` otherwise. Any error aborts the whole dataset.
pub fn compile_dataset(
    dataset: &str,
    fields: &[FieldSpec],
    options: &CompileOptions,
) -> Result<DatasetSchema> {
    let mut out: BTreeMap<String, FieldDefinition> = BTreeMap::new();

    for spec in fields {
        let identifier = FieldIdentifier::parse(&spec.name)?;
        let def = resolver::resolve_spec(&identifier, spec).map_err(|e| match e {
            SchemaError::DuplicateField { field, .. } => SchemaError::DuplicateField {
                dataset: dataset.to_string(),
                field,
            },
            other => other,
        })?;

        match out.get(&spec.name) {
            Some(existing) if *existing == def => {
                debug!(dataset, field = %spec.name, "merged identical duplicate field");
            }
            Some(_) => {
                return Err(SchemaError::DuplicateField {
                    dataset: dataset.to_string(),
                    field: spec.name.clone(),
                });
            }
            None => {
                out.insert(spec.name.clone(), def);
            }
        }
    }

    Ok(DatasetSchema {
        name: dataset.to_string(),
        strict: options.strict,
        fields: out,
        aliases: BTreeMap::new(),
    })
}
