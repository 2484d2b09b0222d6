use crate::filter::path::lookup_field;
use crate::filter::{CompiledFilter, SortSpec};
use crate::schema::{EntitySchema, SchemaRegistry};
use colored::Colorize;
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};
use serde_json::{Value as Json, json};
use std::fmt::Write;

fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h)));
    table
}

fn render_cell(value: Option<&Json>) -> String {
    match value {
        None | Some(Json::Null) => String::new(),
        Some(Json::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Matched documents as a table of the entity's scalar fields
pub fn format_results_text(schema: &EntitySchema, docs: &[Json]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} matched",
        docs.len().to_string().bold().green(),
        if docs.len() == 1 { "entity" } else { "entities" }
    );

    if docs.is_empty() {
        return out;
    }

    let columns: Vec<&str> = schema
        .fields
        .iter()
        .filter(|field| field.ty.is_scalar())
        .map(|field| field.name.as_str())
        .collect();

    let mut table = create_table(&columns);
    for doc in docs {
        table.add_row(
            columns
                .iter()
                .map(|column| Cell::new(render_cell(lookup_field(doc, column)))),
        );
    }
    let _ = writeln!(out, "{table}");
    out
}

pub fn format_results_json(entity: &str, docs: &[Json]) -> String {
    let body = json!({
        "entity": entity,
        "count": docs.len(),
        "results": docs,
    });
    serde_json::to_string_pretty(&body).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_explain_text(filter: &CompiledFilter, sort: Option<&SortSpec>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "Entity:".bold().bright_blue(), filter.entity);
    let _ = writeln!(out, "{} {}", "Where:".bold().bright_blue(), filter.predicate);
    match sort {
        Some(sort) => {
            let direction = if sort.descending { "descending" } else { "ascending" };
            let _ = writeln!(
                out,
                "{} {} ({})",
                "Order:".bold().bright_blue(),
                sort.path,
                direction
            );
        }
        None => {
            let _ = writeln!(out, "{} unordered", "Order:".bold().bright_blue());
        }
    }
    out
}

pub fn format_explain_json(filter: &CompiledFilter, sort: Option<&SortSpec>) -> String {
    let body = json!({
        "filter": filter,
        "sort": sort,
    });
    serde_json::to_string_pretty(&body).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_schema_text(registry: &SchemaRegistry) -> String {
    let mut out = String::new();
    for schema in registry.entities() {
        let _ = writeln!(out, "{}", schema.name.bold().yellow());
        let mut table = create_table(&["Field", "Type"]);
        for field in &schema.fields {
            table.add_row(vec![Cell::new(&field.name), Cell::new(field.ty.to_string())]);
        }
        let _ = writeln!(out, "{table}\n");
    }
    out
}

pub fn format_schema_json(registry: &SchemaRegistry) -> String {
    let entities: Vec<Json> = registry
        .entities()
        .into_iter()
        .map(|schema| {
            json!({
                "name": schema.name,
                "fields": schema
                    .fields
                    .iter()
                    .map(|field| json!({"name": field.name, "type": field.ty.to_string()}))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    serde_json::to_string_pretty(&json!({ "entities": entities }))
        .unwrap_or_else(|_| "{}".to_string())
}
