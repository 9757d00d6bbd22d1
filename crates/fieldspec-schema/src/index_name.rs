use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Which deployment an index belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EsMode {
    Prod,
    Dev,
}

impl EsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EsMode::Prod => "prod",
            EsMode::Dev => "dev",
        }
    }

    /// Config section holding a dataset's index settings, e.g. `nih_dev`.
    pub fn config_key(&self, dataset: &str) -> String {
        format!("{dataset}_{}", self.as_str())
    }

    /// Check that a config section and the index it names belong to this
    /// mode. The key must carry this mode's suffix; in dev mode the index
    /// must also end with `_dev` so dev runs never write to a prod index.
    pub fn check_config(&self, key: &str, index: &str) -> Result<()> {
        let suffix = format!("_{}", self.as_str());
        if !key.ends_with(&suffix) {
            return Err(SchemaError::ModeMismatch {
                mode: *self,
                what: "config key",
                name: key.to_string(),
            });
        }
        if *self == EsMode::Dev && !index.ends_with("_dev") {
            return Err(SchemaError::ModeMismatch {
                mode: *self,
                what: "index",
                name: index.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for EsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EsMode {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "prod" => Ok(EsMode::Prod),
            "dev" => Ok(EsMode::Dev),
            other => Err(SchemaError::InvalidIndexName(format!(
                "mode must be one of 'prod' or 'dev', got {other:?}"
            ))),
        }
    }
}

/// The index name a new mapping version should be created under.
///
/// Prod indexes carry a trailing version number (`arxiv3` becomes `arxiv4`).
/// Dev indexes are unversioned copies, so a `0` is appended (`arxiv_dev`
/// becomes `arxiv_dev0`).
pub fn next_index_name(current: &str, mode: EsMode) -> Result<String> {
    if current.is_empty() {
        return Err(SchemaError::InvalidIndexName("empty index name".into()));
    }
    let (tag, next) = match mode {
        EsMode::Prod => {
            let tag = current.trim_end_matches(|c: char| c.is_ascii_digit());
            let digits = &current[tag.len()..];
            if tag.is_empty() || digits.is_empty() {
                return Err(SchemaError::InvalidIndexName(format!(
                    "could not find a tag and version in {current:?}"
                )));
            }
            let version: u64 = digits.parse().map_err(|_| {
                SchemaError::InvalidIndexName(format!("version {digits:?} out of range"))
            })?;
            let next = version.checked_add(1).ok_or_else(|| {
                SchemaError::InvalidIndexName(format!("version {digits:?} cannot be incremented"))
            })?;
            (tag, format!("{tag}{next}"))
        }
        EsMode::Dev => (current, format!("{current}0")),
    };

    if next == current || !next.starts_with(tag) || next.len() - current.len() > 1 {
        return Err(SchemaError::InvalidIndexName(format!(
            "could not create a new valid index from {current:?}, got {next:?}"
        )));
    }
    Ok(next)
}
