mod common;
use common::*;

use fieldspec_schema::{
    ALIAS_DIR, CompileOptions, ConsistencyRegistry, DatasetDefinition, FieldIdentifier, SchemaError, TypeTag,
    compile, compile_dataset, resolve, storage_types,
};
use serde_json::json;

// ── End-to-end ──────────────────────────────────────────────────

#[test]
fn project_dataset_matches_reference_mapping() {
    let registry = ConsistencyRegistry::in_memory();
    let def = dataset(
        NIH,
        &[
            "title_of_project",
            "date_start_project",
            "cost_total_project",
            "coordinate_of_organisation",
        ],
    );
    let schema = compile(&registry, &def).unwrap();

    assert_eq!(
        schema.to_document(),
        json!({
            "dynamic": "strict",
            "properties": {
                "title_of_project": {
                    "type": "text",
                    "fields": { "keyword": { "type": "keyword" } }
                },
                "date_start_project": { "type": "date", "format": "yyyy-MM-dd" },
                "cost_total_project": { "type": "long" },
                "coordinate_of_organisation": { "type": "geo_point" }
            }
        })
    );
}

#[test]
fn nested_funding_field() {
    let schema = compile_dataset(NIH, &[funding_field()], &CompileOptions::default()).unwrap();
    let doc = schema.to_document();
    let funding = &doc["properties"]["json_funding_project"];

    assert_eq!(funding["type"], "nested");
    assert_eq!(funding["properties"]["cost_ref"], json!({ "type": "long" }));
    assert_eq!(funding["properties"]["year"], json!({ "type": "integer" }));
    assert_eq!(
        funding["properties"]["start_date"],
        json!({ "type": "date", "format": "yyyy-MM-dd" })
    );
    assert_eq!(
        funding["properties"]["end_date"],
        json!({ "type": "date", "format": "yyyy-MM-dd" })
    );
}

// ── Round trip ──────────────────────────────────────────────────

#[test]
fn emitted_document_reproduces_resolved_types() {
    let fields = nih_fields();
    let schema = compile_dataset(NIH, &fields, &CompileOptions::default()).unwrap();
    let from_doc = storage_types(&schema.to_document()).unwrap();
    assert_eq!(from_doc, schema.storage_types());

    for spec in fields.iter().filter(|s| s.children.is_empty()) {
        let resolved = resolve(&FieldIdentifier::parse(&spec.name).unwrap());
        assert_eq!(from_doc[&spec.name], resolved.storage_type, "{}", spec.name);
    }
}

#[test]
fn resolution_is_deterministic_across_passes() {
    let a = compile_dataset(NIH, &nih_fields(), &CompileOptions::default()).unwrap();
    let b = compile_dataset(NIH, &nih_fields(), &CompileOptions::default()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_document(), b.to_document());
}

// ── Rejection ───────────────────────────────────────────────────

#[test]
fn malformed_identifiers_abort_the_dataset() {
    for (bad, expect_unknown_role) in [
        ("", false),
        ("single", false),
        ("_leadingdelim", false),
        ("unknownrole_x_y", true),
    ] {
        let fields = specs(&["title_of_project", bad]);
        let result = compile_dataset(NIH, &fields, &CompileOptions::default());
        match result {
            Err(SchemaError::UnknownRole { .. }) if expect_unknown_role => {}
            Err(SchemaError::MalformedIdentifier { .. }) if !expect_unknown_role => {}
            other => panic!("{bad:?}: unexpected result {other:?}"),
        }
    }
}

#[test]
fn failed_compile_leaves_registry_untouched() {
    let registry = ConsistencyRegistry::in_memory();
    let def = dataset(NIH, &["title_of_project", "unknownrole_x_y"]);
    assert!(compile(&registry, &def).is_err());
    assert!(registry.bindings().unwrap().is_empty());
}

// ── Cross-dataset consistency ───────────────────────────────────

#[test]
fn shared_fields_must_agree_across_datasets() {
    let registry = ConsistencyRegistry::in_memory();
    compile(&registry, &dataset("nih", &["title_of_project", "cost_total_project"])).unwrap();
    compile(&registry, &dataset("gtr", &["title_of_project", "year_fiscal_project"])).unwrap();

    let mut crunchbase = dataset("crunchbase", &["title_of_project"]);
    crunchbase.fields[0].storage_type = Some(TypeTag::Keyword);
    match compile(&registry, &crunchbase) {
        Err(SchemaError::TypeConflict {
            field,
            existing_dataset,
            dataset,
            ..
        }) => {
            assert_eq!(field, "title_of_project");
            assert_eq!(existing_dataset, "nih");
            assert_eq!(dataset, "crunchbase");
        }
        other => panic!("expected TypeConflict, got {other:?}"),
    }

    let names: Vec<String> = registry
        .bindings()
        .unwrap()
        .into_iter()
        .map(|b| b.field_name)
        .collect();
    assert_eq!(
        names,
        vec!["cost_total_project", "title_of_project", "year_fiscal_project"]
    );
}

#[test]
fn isolated_registries_do_not_share_bindings() {
    let a = ConsistencyRegistry::in_memory();
    let b = ConsistencyRegistry::in_memory();
    a.register("x_y", TypeTag::Keyword, "A").unwrap();
    b.register("x_y", TypeTag::Long, "B").unwrap();
    assert_eq!(a.check("x_y").unwrap(), Some(TypeTag::Keyword));
    assert_eq!(b.check("x_y").unwrap(), Some(TypeTag::Long));
}

// ── Definitions on disk ─────────────────────────────────────────

#[test]
fn compiles_definition_file_with_aliases() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nih.json");
    std::fs::write(
        &path,
        r#"{
            "name": "nih",
            "strict": false,
            "fields": [
                "title_of_project",
                {"name": "json_funding_project", "children": ["cost_ref", "year"]}
            ],
            "aliases": {
                "project_title": {"nih": "title_of_project", "gtr": "title_of_grant"}
            }
        }"#,
    )
    .unwrap();

    let def = DatasetDefinition::from_path(&path).unwrap();
    let registry = ConsistencyRegistry::in_memory();
    let schema = compile(&registry, &def).unwrap();
    let body = schema.to_index_body();

    assert_eq!(body["mappings"]["_doc"]["dynamic"], json!(false));
    assert_eq!(
        body["mappings"]["_doc"]["properties"]["project_title"],
        json!({ "type": "alias", "path": "title_of_project" })
    );
    assert_eq!(registry.check("project_title").unwrap(), None);
}

#[test]
fn shared_alias_lookup_applies_per_dataset() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(ALIAS_DIR)).unwrap();
    std::fs::write(
        dir.path().join(ALIAS_DIR).join("health_scanner.json"),
        r#"{
            "project_title": {"nih": "title_of_project"},
            "grant_title": {"gtr": "title_of_grant"}
        }"#,
    )
    .unwrap();
    for (name, field) in [("nih", "title_of_project"), ("gtr", "title_of_grant")] {
        std::fs::write(
            dir.path().join(format!("{name}.json")),
            format!(
                r#"{{"name": "{name}", "fields": ["{field}"], "alias_lookup": "health_scanner"}}"#
            ),
        )
        .unwrap();
    }

    let registry = ConsistencyRegistry::in_memory();
    let load = |name: &str| {
        DatasetDefinition::from_path(&dir.path().join(format!("{name}.json"))).unwrap()
    };
    let nih = compile(&registry, &load("nih")).unwrap();
    let gtr = compile(&registry, &load("gtr")).unwrap();

    assert_eq!(
        nih.aliases().get("project_title").map(String::as_str),
        Some("title_of_project")
    );
    assert!(!nih.aliases().contains_key("grant_title"));
    assert_eq!(
        gtr.aliases().get("grant_title").map(String::as_str),
        Some("title_of_grant")
    );
    assert!(!gtr.aliases().contains_key("project_title"));
}

#[test]
fn missing_definition_file() {
    let err = DatasetDefinition::from_path(std::path::Path::new("/nonexistent/nih.json"))
        .unwrap_err();
    assert!(matches!(err, SchemaError::Definition(_)));
}
