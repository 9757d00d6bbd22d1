#![allow(dead_code)]

use fieldspec_schema::{DatasetDefinition, FieldSpec};

pub const NIH: &str = "nih";

pub fn specs(names: &[&str]) -> Vec<FieldSpec> {
    names.iter().map(|n| FieldSpec::new(*n)).collect()
}

pub fn dataset(name: &str, names: &[&str]) -> DatasetDefinition {
    DatasetDefinition::new(name, specs(names))
}

pub fn funding_field() -> FieldSpec {
    FieldSpec::new("json_funding_project").with_children(specs(&[
        "cost_ref",
        "year",
        "start_date",
        "end_date",
    ]))
}

/// A representative project dataset covering every role.
pub fn nih_fields() -> Vec<FieldSpec> {
    let mut fields = specs(&[
        "id_of_project",
        "id_of_projectNumeric",
        "title_of_project",
        "textBody_abstract_project",
        "terms_mesh_abstract",
        "terms_of_funders",
        "terms_of_countryTags",
        "date_start_project",
        "cost_total_project",
        "currency_total_cost",
        "rank_rhodonite_abstract",
        "coordinate_of_organisation",
        "booleanFlag_eu_organisation",
        "placeName_city_organisation",
        "placeName_zipcode_organisation",
        "year_fiscal_project",
        "type_of_entity",
    ]);
    fields.push(funding_field());
    fields
}
