use std::fmt;

use serde::{Deserialize, Serialize};

use crate::definition::FieldSpec;
use crate::error::{Result, SchemaError};
use crate::identifier::{FieldIdentifier, RoleTag};

pub const DATE_FORMAT: &str = "yyyy-MM-dd";
pub const TERMS_ANALYZER: &str = "terms_analyzer";

/// Primitive storage types understood by the index backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Text,
    Keyword,
    Long,
    Integer,
    Float,
    Boolean,
    Date,
    GeoPoint,
    Nested,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Text => "text",
            TypeTag::Keyword => "keyword",
            TypeTag::Long => "long",
            TypeTag::Integer => "integer",
            TypeTag::Float => "float",
            TypeTag::Boolean => "boolean",
            TypeTag::Date => "date",
            TypeTag::GeoPoint => "geo_point",
            TypeTag::Nested => "nested",
        }
    }

    pub fn parse(s: &str) -> Option<TypeTag> {
        match s {
            "text" => Some(TypeTag::Text),
            "keyword" => Some(TypeTag::Keyword),
            "long" => Some(TypeTag::Long),
            "integer" => Some(TypeTag::Integer),
            "float" => Some(TypeTag::Float),
            "boolean" => Some(TypeTag::Boolean),
            "date" => Some(TypeTag::Date),
            "geo_point" => Some(TypeTag::GeoPoint),
            "nested" => Some(TypeTag::Nested),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A backend-ready field, produced deterministically from an identifier
/// and its declared overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub identifier: FieldIdentifier,
    pub storage_type: TypeTag,
    pub analyzer: Option<String>,
    pub date_format: Option<String>,
    pub null_value: Option<serde_json::Value>,
    pub has_keyword_subfield: bool,
    /// Declaration order is preserved. `Some` exactly when the field is nested.
    pub nested_children: Option<Vec<FieldDefinition>>,
}

impl FieldDefinition {
    fn base(identifier: FieldIdentifier, storage_type: TypeTag) -> Self {
        Self {
            identifier,
            storage_type,
            analyzer: None,
            date_format: None,
            null_value: None,
            has_keyword_subfield: false,
            nested_children: None,
        }
    }

    pub fn name(&self) -> &str {
        self.identifier.as_str()
    }

    pub fn is_nested(&self) -> bool {
        self.storage_type == TypeTag::Nested
    }
}

// ── Role policy ─────────────────────────────────────────────────

/// Names that take a role's text policy but must stay exact-match keywords.
/// A trailing `*` matches any continuation; otherwise the name must match
/// whole segments.
const KEYWORD_EXCLUSIONS: &[&str] = &[
    "currency*",
    "type_of_entity",
    "terms_of_countryTags",
    "terms_sdg_abstract",
    "placeName_zipcode*",
    "id_state*",
];

const ANALYZED_TERMS: &[&str] = &["terms_mesh*", "terms_of_funders"];

const NUMERIC_ID_MARKER: &str = "Numeric";

fn matches_pattern(name: &str, pattern: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => {
            name == pattern
                || name
                    .strip_prefix(pattern)
                    .is_some_and(|rest| rest.starts_with(crate::identifier::DELIMITER))
        }
    }
}

fn matches_any(name: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| matches_pattern(name, p))
}

fn text_with_keyword(identifier: FieldIdentifier) -> FieldDefinition {
    let analyzer = matches_any(identifier.as_str(), ANALYZED_TERMS).then(|| TERMS_ANALYZER.to_string());
    FieldDefinition {
        analyzer,
        has_keyword_subfield: true,
        ..FieldDefinition::base(identifier, TypeTag::Text)
    }
}

/// Apply the role default for `identifier`. Children are not resolved here.
fn role_default(identifier: FieldIdentifier) -> FieldDefinition {
    if matches_any(identifier.as_str(), KEYWORD_EXCLUSIONS) {
        return FieldDefinition::base(identifier, TypeTag::Keyword);
    }

    match identifier.role() {
        RoleTag::Id => {
            if identifier.as_str().ends_with(NUMERIC_ID_MARKER) {
                FieldDefinition::base(identifier, TypeTag::Integer)
            } else {
                FieldDefinition::base(identifier, TypeTag::Keyword)
            }
        }
        RoleTag::Title | RoleTag::TextBody | RoleTag::Terms | RoleTag::PlaceName => {
            text_with_keyword(identifier)
        }
        RoleTag::Type | RoleTag::Currency => FieldDefinition::base(identifier, TypeTag::Keyword),
        RoleTag::Date => FieldDefinition {
            date_format: Some(DATE_FORMAT.to_string()),
            ..FieldDefinition::base(identifier, TypeTag::Date)
        },
        RoleTag::Cost => FieldDefinition::base(identifier, TypeTag::Long),
        RoleTag::Year => FieldDefinition::base(identifier, TypeTag::Integer),
        RoleTag::Rank => FieldDefinition::base(identifier, TypeTag::Float),
        RoleTag::Coordinate => FieldDefinition::base(identifier, TypeTag::GeoPoint),
        RoleTag::BooleanFlag => FieldDefinition {
            null_value: Some(serde_json::Value::Bool(false)),
            ..FieldDefinition::base(identifier, TypeTag::Boolean)
        },
        RoleTag::Json => FieldDefinition::base(identifier, TypeTag::Nested),
    }
}

/// Re-type a definition, dropping extras that do not apply to the new type
/// and restoring the defaults that do.
fn retype(def: &mut FieldDefinition, storage_type: TypeTag) {
    if def.storage_type == storage_type {
        return;
    }
    def.storage_type = storage_type;
    def.has_keyword_subfield = storage_type == TypeTag::Text && def.has_keyword_subfield;
    if storage_type != TypeTag::Text {
        def.analyzer = None;
    }
    def.date_format = match storage_type {
        TypeTag::Date => Some(DATE_FORMAT.to_string()),
        _ => None,
    };
    def.null_value = match storage_type {
        TypeTag::Boolean => Some(serde_json::Value::Bool(false)),
        _ => None,
    };
}

fn apply_overrides(def: &mut FieldDefinition, spec: &FieldSpec) -> Result<()> {
    if let Some(storage_type) = spec.storage_type {
        retype(def, storage_type);
    }
    if let Some(analyzer) = &spec.analyzer {
        if def.storage_type != TypeTag::Text {
            return Err(SchemaError::Definition(format!(
                "field {:?}: analyzer {analyzer:?} requires type text, not {}",
                spec.name, def.storage_type
            )));
        }
        def.analyzer = Some(analyzer.clone());
    }
    if let Some(null_value) = &spec.null_value {
        def.null_value = Some(null_value.clone());
    }
    Ok(())
}

// ── Public API ──────────────────────────────────────────────────

/// Resolve an identifier with no overrides and no declared children.
pub fn resolve(identifier: &FieldIdentifier) -> FieldDefinition {
    let mut def = role_default(identifier.clone());
    if def.is_nested() {
        def.nested_children = Some(Vec::new());
    }
    def
}

/// Resolve a declared field: role default, then overrides, then children
/// (each resolved recursively by the same policy).
pub fn resolve_spec(identifier: &FieldIdentifier, spec: &FieldSpec) -> Result<FieldDefinition> {
    let mut def = role_default(identifier.clone());
    apply_overrides(&mut def, spec)?;

    if !def.is_nested() {
        if !spec.children.is_empty() {
            return Err(SchemaError::Definition(format!(
                "field {:?} declares children but resolves to {}, not nested",
                spec.name, def.storage_type
            )));
        }
        return Ok(def);
    }

    let mut children: Vec<FieldDefinition> = Vec::with_capacity(spec.children.len());
    for child_spec in &spec.children {
        let child_id = FieldIdentifier::parse_child(&child_spec.name)?;
        let child = resolve_spec(&child_id, child_spec)?;
        match children.iter().find(|c| c.name() == child.name()) {
            Some(existing) if *existing == child => continue,
            Some(_) => {
                // The assembler fills in the dataset name.
                return Err(SchemaError::DuplicateField {
                    dataset: String::new(),
                    field: format!("{identifier}.{}", child.name()),
                });
            }
            None => children.push(child),
        }
    }
    def.nested_children = Some(children);
    Ok(def)
}
