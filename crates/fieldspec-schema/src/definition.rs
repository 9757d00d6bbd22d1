use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::resolver::TypeTag;

/// One declared field: a raw name plus optional explicit overrides.
///
/// `children` is only meaningful for `json_*` fields, whose nested
/// properties are declared here rather than derived from the outer name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<TypeTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldSpec>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, storage_type: TypeTag) -> Self {
        self.storage_type = Some(storage_type);
        self
    }

    pub fn with_children(mut self, children: Vec<FieldSpec>) -> Self {
        self.children = children;
        self
    }
}

impl From<&str> for FieldSpec {
    fn from(name: &str) -> Self {
        FieldSpec::new(name)
    }
}

/// `{alias: {dataset: target_field}}`. An alias applies to a dataset only
/// when its inner map has an entry for that dataset.
pub type AliasLookup = BTreeMap<String, BTreeMap<String, String>>;

/// A dataset as authored on disk.
///
/// Fields may be written either as bare names or as full objects:
///
/// ```json
/// {
///   "name": "nih",
///   "fields": [
///     "title_of_project",
///     {"name": "json_funding_project", "children": ["cost_ref", "year"]}
///   ],
///   "alias_lookup": "health_scanner"
/// }
/// ```
///
/// `alias_lookup` names a lookup shared by several datasets, stored as
/// `aliases/<name>.json` beside the definition file. Inline `aliases` win
/// over the shared lookup for the same alias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(deserialize_with = "de_fields")]
    pub fields: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: AliasLookup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_lookup: Option<String>,
}

impl DatasetDefinition {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            strict: None,
            fields,
            aliases: AliasLookup::new(),
            alias_lookup: None,
        }
    }

    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(|e| SchemaError::Definition(e.to_string()))
    }

    /// Read a definition file, merging in its shared alias lookup if it
    /// names one.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Definition(format!("{}: {e}", path.display())))?;
        let mut def = Self::from_json(&data)?;
        if let Some(name) = &def.alias_lookup {
            let dir = path.parent().unwrap_or(Path::new("."));
            let shared = load_aliases(&dir.join(ALIAS_DIR).join(format!("{name}.json")))?;
            def.merge_aliases(shared);
        }
        Ok(def)
    }

    /// Add entries from `lookup` that this definition does not already set.
    pub fn merge_aliases(&mut self, lookup: AliasLookup) {
        for (alias, targets) in lookup {
            let entry = self.aliases.entry(alias).or_default();
            for (dataset, field) in targets {
                entry.entry(dataset).or_insert(field);
            }
        }
    }
}

/// Directory of shared alias lookups, relative to the definition files.
pub const ALIAS_DIR: &str = "aliases";

pub fn load_aliases(path: &Path) -> Result<AliasLookup> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| SchemaError::Definition(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&data).map_err(|e| SchemaError::Definition(e.to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
    Name(String),
    Spec(RawSpec),
}

#[derive(Deserialize)]
struct RawSpec {
    name: String,
    #[serde(default, rename = "type")]
    storage_type: Option<TypeTag>,
    #[serde(default)]
    analyzer: Option<String>,
    #[serde(default)]
    null_value: Option<serde_json::Value>,
    #[serde(default)]
    children: Vec<RawField>,
}

impl From<RawField> for FieldSpec {
    fn from(raw: RawField) -> Self {
        match raw {
            RawField::Name(name) => FieldSpec::new(name),
            RawField::Spec(spec) => FieldSpec {
                name: spec.name,
                storage_type: spec.storage_type,
                analyzer: spec.analyzer,
                null_value: spec.null_value,
                children: spec.children.into_iter().map(FieldSpec::from).collect(),
            },
        }
    }
}

fn de_fields<'de, D>(deserializer: D) -> std::result::Result<Vec<FieldSpec>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<RawField>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(FieldSpec::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_field_forms() {
        let def = DatasetDefinition::from_json(
            r#"{
                "name": "nih",
                "strict": false,
                "fields": [
                    "title_of_project",
                    {"name": "cost_total_project", "type": "integer"},
                    {"name": "json_funding_project", "children": ["cost_ref", {"name": "year"}]}
                ],
                "aliases": {"project_title": {"nih": "title_of_project"}}
            }"#,
        )
        .unwrap();

        assert_eq!(def.name, "nih");
        assert_eq!(def.strict, Some(false));
        assert_eq!(def.fields.len(), 3);
        assert_eq!(def.fields[0], FieldSpec::new("title_of_project"));
        assert_eq!(def.fields[1].storage_type, Some(TypeTag::Integer));
        assert_eq!(
            def.fields[2].children,
            vec![FieldSpec::new("cost_ref"), FieldSpec::new("year")]
        );
        assert_eq!(def.aliases["project_title"]["nih"], "title_of_project");
    }

    #[test]
    fn inline_aliases_win_over_shared_lookup() {
        let mut def = DatasetDefinition::new("nih", vec![]);
        def.aliases
            .entry("project_title".into())
            .or_default()
            .insert("nih".into(), "title_of_project".into());

        let mut shared = AliasLookup::new();
        shared.entry("project_title".into()).or_default().extend([
            ("nih".to_string(), "textBody_abstract_project".to_string()),
            ("gtr".to_string(), "title_of_grant".to_string()),
        ]);
        shared
            .entry("start".into())
            .or_default()
            .insert("nih".into(), "date_start_project".into());
        def.merge_aliases(shared);

        assert_eq!(def.aliases["project_title"]["nih"], "title_of_project");
        assert_eq!(def.aliases["project_title"]["gtr"], "title_of_grant");
        assert_eq!(def.aliases["start"]["nih"], "date_start_project");
    }

    #[test]
    fn missing_shared_lookup_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nih.json");
        std::fs::write(
            &path,
            r#"{"name": "nih", "fields": ["title_of_project"], "alias_lookup": "absent"}"#,
        )
        .unwrap();
        assert!(matches!(
            DatasetDefinition::from_path(&path),
            Err(SchemaError::Definition(_))
        ));
    }

    #[test]
    fn rejects_unknown_storage_type() {
        let err = DatasetDefinition::from_json(
            r#"{"name": "x", "fields": [{"name": "cost_total_project", "type": "decimal"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Definition(_)));
    }
}
