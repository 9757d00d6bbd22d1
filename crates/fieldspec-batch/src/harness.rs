use tracing::info;

use crate::config::{HarnessConfig, SCHEMA_DIR_VAR};
use crate::error::Result;
use crate::runner::{execute, install_dependencies};
use crate::schemas::compile_schemas;
use crate::stage::stage;
use crate::store::ObjectStore;

/// Download, unpack, compile schemas, install, execute. Strictly sequential.
pub struct Harness {
    config: HarnessConfig,
    store: Box<dyn ObjectStore>,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        let store = config.object_store.open();
        Self { config, store }
    }

    pub fn with_store(config: HarnessConfig, store: Box<dyn ObjectStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Returns the job's exit code. Harness-side failures are errors.
    pub fn run(&self) -> Result<i32> {
        let key = &self.config.job_key;
        let work_dir = &self.config.work_dir;

        info!(key = %key, "fetching job archive");
        let archive = self.store.fetch(key)?;

        info!(bytes = archive.len(), dir = %work_dir.display(), "staging job");
        stage(&archive, work_dir)?;

        let schema_dir = compile_schemas(work_dir)?;
        let mut env = Vec::new();
        if let Some(dir) = schema_dir.as_deref() {
            env.push((SCHEMA_DIR_VAR, dir));
        }

        install_dependencies(&self.config, work_dir)?;
        let code = execute(&self.config, work_dir, &env)?;
        info!(key = %key, code, "job exited");
        Ok(code)
    }
}
