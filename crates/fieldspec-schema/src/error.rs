use crate::index_name::EsMode;
use crate::resolver::TypeTag;

/// Schema-authoring errors. None of these are transient: the fix is always
/// in the field names or dataset definition, never a retry.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("malformed field identifier {name:?}: {reason}")]
    MalformedIdentifier { name: String, reason: &'static str },

    #[error("unknown role {role:?} in field identifier {name:?}")]
    UnknownRole { name: String, role: String },

    #[error("duplicate field {field:?} in dataset {dataset:?} with a differing definition")]
    DuplicateField { dataset: String, field: String },

    #[error(
        "type conflict on field {field:?}: bound to {existing} by dataset {existing_dataset:?}, \
         dataset {dataset:?} tried {attempted}"
    )]
    TypeConflict {
        field: String,
        existing: TypeTag,
        existing_dataset: String,
        attempted: TypeTag,
        dataset: String,
    },

    #[error("alias {alias:?} points at {field:?}, which does not exist in the mapping")]
    UnknownAliasTarget { alias: String, field: String },

    #[error("column {column:?} renames onto {field:?}, which dataset {dataset:?} does not map")]
    UnknownTransformTarget {
        column: String,
        field: String,
        dataset: String,
    },

    #[error("invalid index name: {0}")]
    InvalidIndexName(String),

    #[error("in {mode} mode, {what} {name:?} must end with _{mode}")]
    ModeMismatch {
        mode: EsMode,
        what: &'static str,
        name: String,
    },

    #[error("invalid dataset definition: {0}")]
    Definition(String),

    #[error("binding store error: {0}")]
    Store(String),
}

impl SchemaError {
    pub(crate) fn malformed(name: &str, reason: &'static str) -> Self {
        SchemaError::MalformedIdentifier {
            name: name.to_string(),
            reason,
        }
    }
}

pub type Result<T, E = SchemaError> = std::result::Result<T, E>;
