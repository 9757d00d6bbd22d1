use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{HarnessError, Result};

/// Largest archive the HTTP store will buffer.
const MAX_ARCHIVE_BYTES: u64 = 512 * 1024 * 1024;

/// Source of packaged jobs, addressed by key.
pub trait ObjectStore: Send + Sync {
    fn fetch(&self, key: &str) -> Result<Vec<u8>>;
}

fn fetch_error(key: &str, message: impl ToString) -> HarnessError {
    HarnessError::Fetch {
        key: key.to_string(),
        message: message.to_string(),
    }
}

/// Keys may use `/` prefixes but never leave the store root.
fn check_key(key: &str) -> Result<()> {
    let path = Path::new(key);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if key.is_empty() || escapes {
        return Err(fetch_error(key, "invalid object key"));
    }
    Ok(())
}

/// Objects served over plain HTTP(S) GET at `<base_url>/<key>`, as exposed
/// by S3-compatible stores and presigned gateways.
pub struct HttpObjectStore {
    base_url: String,
}

impl HttpObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

impl ObjectStore for HttpObjectStore {
    fn fetch(&self, key: &str) -> Result<Vec<u8>> {
        check_key(key)?;
        let url = self.url_for(key);
        debug!(url = %url, "GET");
        let mut response = ureq::get(&url).call().map_err(|e| fetch_error(key, e))?;
        response
            .body_mut()
            .with_config()
            .limit(MAX_ARCHIVE_BYTES)
            .read_to_vec()
            .map_err(|e| fetch_error(key, e))
    }
}

/// Objects stored as files under a local root directory.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ObjectStore for FsObjectStore {
    fn fetch(&self, key: &str) -> Result<Vec<u8>> {
        check_key(key)?;
        let path = self.root.join(key);
        debug!(path = %path.display(), "read");
        std::fs::read(&path).map_err(|e| fetch_error(key, e))
    }
}
