use std::env;
use std::path::PathBuf;

use crate::error::{HarnessError, Result};
use crate::store::{FsObjectStore, HttpObjectStore, ObjectStore};

pub const JOB_KEY_VAR: &str = "BATCHPAR_S3FILE_TIMESTAMP";
pub const SCHEMA_DIR_VAR: &str = "BATCHPAR_schema_dir";

const DEFAULT_OBJECT_STORE: &str = "http://127.0.0.1:9000/batch";
const DEFAULT_INTERPRETER: &str = "python3";
const DEFAULT_ENTRY_POINT: &str = "run.py";
const DEFAULT_INSTALL_CMD: &str = "pip install -r";
const DEFAULT_REQUIREMENTS: &str = "requirements.txt";

/// Where job archives are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Http(String),
    Dir(PathBuf),
}

impl StoreLocation {
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            StoreLocation::Http(value.to_string())
        } else {
            StoreLocation::Dir(PathBuf::from(value))
        }
    }

    pub fn open(&self) -> Box<dyn ObjectStore> {
        match self {
            StoreLocation::Http(url) => Box::new(HttpObjectStore::new(url.clone())),
            StoreLocation::Dir(root) => Box::new(FsObjectStore::new(root.clone())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Archive name in the object store, e.g. `1559729197714-nih.zip`.
    pub job_key: String,
    pub object_store: StoreLocation,
    /// Wiped and recreated for every job.
    pub work_dir: PathBuf,
    pub interpreter: String,
    pub entry_point: String,
    /// Program and leading arguments; the requirements file is appended.
    pub install_cmd: Vec<String>,
    pub requirements: String,
}

impl HarnessConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from any variable source. Unset or empty variables
    /// take their defaults; only the job key is required.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let job_key = get(JOB_KEY_VAR).ok_or(HarnessError::MissingEnv(JOB_KEY_VAR))?;
        let object_store = StoreLocation::parse(
            &get("FIELDSPEC_OBJECT_STORE").unwrap_or_else(|| DEFAULT_OBJECT_STORE.into()),
        );
        let work_dir = get("FIELDSPEC_WORK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("fieldspec-job"));
        let install_cmd: Vec<String> = get("FIELDSPEC_INSTALL_CMD")
            .unwrap_or_else(|| DEFAULT_INSTALL_CMD.into())
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if install_cmd.is_empty() {
            return Err(HarnessError::Config("FIELDSPEC_INSTALL_CMD is blank".into()));
        }

        Ok(Self {
            job_key,
            object_store,
            work_dir,
            interpreter: get("FIELDSPEC_INTERPRETER").unwrap_or_else(|| DEFAULT_INTERPRETER.into()),
            entry_point: get("FIELDSPEC_ENTRY_POINT").unwrap_or_else(|| DEFAULT_ENTRY_POINT.into()),
            install_cmd,
            requirements: get("FIELDSPEC_REQUIREMENTS")
                .unwrap_or_else(|| DEFAULT_REQUIREMENTS.into()),
        })
    }
}
