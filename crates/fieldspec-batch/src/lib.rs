mod config;
mod error;
mod harness;
mod runner;
mod schemas;
mod stage;
mod store;

pub use config::{HarnessConfig, JOB_KEY_VAR, SCHEMA_DIR_VAR, StoreLocation};
pub use error::{HarnessError, Result};
pub use harness::Harness;
pub use runner::{execute, install_dependencies};
pub use schemas::{SCHEMA_OUTPUT_DIR, SCHEMA_SOURCE_DIR, compile_schemas};
pub use stage::stage;
pub use store::{FsObjectStore, HttpObjectStore, ObjectStore};
