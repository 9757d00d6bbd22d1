use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::assembler::DatasetSchema;
use crate::error::{Result, SchemaError};
use crate::resolver::{FieldDefinition, TypeTag};

/// Document type key the index-creation body nests the mapping under.
pub const DOC_TYPE: &str = "_doc";

impl FieldDefinition {
    /// The backend type descriptor for this field.
    pub fn to_descriptor(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".into(), Value::String(self.storage_type.as_str().into()));
        if let Some(format) = &self.date_format {
            obj.insert("format".into(), Value::String(format.clone()));
        }
        if let Some(analyzer) = &self.analyzer {
            obj.insert("analyzer".into(), Value::String(analyzer.clone()));
        }
        if let Some(null_value) = &self.null_value {
            obj.insert("null_value".into(), null_value.clone());
        }
        if self.has_keyword_subfield {
            obj.insert("fields".into(), json!({ "keyword": { "type": "keyword" } }));
        }
        if let Some(children) = &self.nested_children {
            let props: Map<String, Value> = children
                .iter()
                .map(|c| (c.name().to_string(), c.to_descriptor()))
                .collect();
            obj.insert("properties".into(), Value::Object(props));
        }
        Value::Object(obj)
    }
}

impl DatasetSchema {
    /// `{"dynamic": "strict"|false, "properties": {...}}`
    pub fn to_document(&self) -> Value {
        let mut props = Map::new();
        for def in self.fields() {
            props.insert(def.name().to_string(), def.to_descriptor());
        }
        for (alias, target) in self.aliases() {
            props.insert(alias.clone(), json!({ "type": "alias", "path": target }));
        }
        let dynamic = if self.is_strict() {
            Value::String("strict".into())
        } else {
            Value::Bool(false)
        };
        json!({ "dynamic": dynamic, "properties": props })
    }

    /// The full index-creation body: `{"mappings": {"_doc": <document>}}`.
    pub fn to_index_body(&self) -> Value {
        json!({ "mappings": { DOC_TYPE: self.to_document() } })
    }
}

/// Re-derive field name to storage type from an emitted document.
///
/// Accepts either a bare document or a full index body. Alias properties
/// are skipped; nested children come back under dotted paths, matching
/// `DatasetSchema::storage_types`.
pub fn storage_types(document: &Value) -> Result<BTreeMap<String, TypeTag>> {
    let doc = document
        .pointer(&format!("/mappings/{DOC_TYPE}"))
        .unwrap_or(document);
    let props = doc
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| SchemaError::Definition("document has no properties object".into()))?;
    let mut out = BTreeMap::new();
    collect(props, None, &mut out)?;
    Ok(out)
}

fn collect(
    props: &Map<String, Value>,
    parent: Option<&str>,
    out: &mut BTreeMap<String, TypeTag>,
) -> Result<()> {
    for (name, descriptor) in props {
        let path = match parent {
            Some(p) => format!("{p}.{name}"),
            None => name.clone(),
        };
        let ty = descriptor
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::Definition(format!("property {path:?} has no type")))?;
        if ty == "alias" {
            continue;
        }
        let tag = TypeTag::parse(ty).ok_or_else(|| {
            SchemaError::Definition(format!("property {path:?} has unknown type {ty:?}"))
        })?;
        if let Some(children) = descriptor.get("properties").and_then(Value::as_object) {
            collect(children, Some(&path), out)?;
        }
        out.insert(path, tag);
    }
    Ok(())
}
