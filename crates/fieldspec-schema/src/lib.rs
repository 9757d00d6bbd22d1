mod alias;
mod assembler;
mod compiler;
mod definition;
mod document;
mod error;
mod identifier;
mod index_name;
pub mod registry;
mod resolver;
mod transform;

pub use alias::apply_aliases;
pub use assembler::{CompileOptions, DatasetSchema, compile_dataset};
pub use compiler::compile;
pub use definition::{ALIAS_DIR, AliasLookup, DatasetDefinition, FieldSpec, load_aliases};
pub use document::{DOC_TYPE, storage_types};
pub use error::{Result, SchemaError};
pub use identifier::{DELIMITER, FieldIdentifier, RoleTag};
pub use index_name::{EsMode, next_index_name};
pub use registry::{Binding, BindingStore, ConsistencyRegistry, MemoryBindings};
pub use resolver::{DATE_FORMAT, FieldDefinition, TERMS_ANALYZER, TypeTag, resolve, resolve_spec};
pub use transform::FieldTransform;
