use fieldspec_schema::SchemaError;

/// Harness failures are fatal to the job. Nothing here retries; an external
/// scheduler resubmits.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to fetch {key:?}: {message}")]
    Fetch { key: String, message: String },

    #[error("invalid job archive: {0}")]
    Archive(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to spawn {program:?}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("dependency install exited with {status}")]
    Install { status: String },

    #[error("schema compilation failed: {0}")]
    Schema(#[from] SchemaError),
}

impl From<zip::result::ZipError> for HarnessError {
    fn from(e: zip::result::ZipError) -> Self {
        HarnessError::Archive(e.to_string())
    }
}

pub type Result<T, E = HarnessError> = std::result::Result<T, E>;
