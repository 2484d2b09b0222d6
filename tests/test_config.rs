use dynamic_filter::config::{ConfigError, load_data, load_schema};
use dynamic_filter::filter::FilterEngine;
use dynamic_filter::schema::{FieldType, SchemaProvider};
use std::fs;
use std::path::Path;

use tempfile::tempdir;

const SCHEMA: &str = r#"
[[enum]]
name = "Genre"
variants = ["Fiction", "Science", "History"]

[[entity]]
name = "Book"
fields = [
  { name = "Title", type = "string" },
  { name = "Genre", type = "Genre" },
  { name = "Published", type = "date" },
  { name = "Rating", type = "float?" },
  { name = "Authors", type = "list<Author>" },
]

[[entity]]
name = "Author"
fields = [
  { name = "Name", type = "string" },
  { name = "Born", type = "datetime" },
]
"#;

fn write_file(path: &Path, content: &str) {
    fs::write(path, content).expect("failed to write test file");
}

#[test]
fn test_load_schema_from_file() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("schema.toml");
    write_file(&path, SCHEMA);

    let registry = load_schema(&path).expect("schema should load");
    let book = registry.entity("BOOK").expect("book registered");

    assert_eq!(book.fields.len(), 5);
    assert_eq!(book.field("published").unwrap().ty, FieldType::Date);
    assert_eq!(
        book.field("rating").unwrap().ty,
        FieldType::nullable(FieldType::Float)
    );
    assert_eq!(book.field("genre").unwrap().ty.to_string(), "Genre");
    assert_eq!(
        registry
            .entities()
            .iter()
            .map(|schema| schema.name.as_str())
            .collect::<Vec<_>>(),
        vec!["Author", "Book"]
    );
}

#[test]
fn test_loaded_schema_compiles_filters() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("schema.toml");
    write_file(&path, SCHEMA);
    let registry = load_schema(&path).unwrap();

    let engine = FilterEngine::new(&registry);
    let (filter, sort) = engine
        .compile("book", "genre=science,authors.name=Sagan,sortby=published")
        .expect("filter compiles");

    assert!(sort.is_some());
    assert!(filter.matches(&serde_json::json!({
        "Genre": "Science",
        "Authors": [{"Name": "Druyan"}, {"Name": "Sagan"}],
    })));
}

#[test]
fn test_missing_schema_file() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("missing.toml");

    let err = load_schema(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(
        err.to_string().contains("missing.toml"),
        "error should name the file, got: {err}"
    );
}

#[test]
fn test_schema_with_unknown_type() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("schema.toml");
    write_file(
        &path,
        r#"
[[entity]]
name = "Book"
fields = [{ name = "Publisher", type = "list<Publisher>" }]
"#,
    );

    let err = load_schema(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Schema { .. }), "got: {err:?}");
}

#[test]
fn test_load_data_file() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("data.json");
    write_file(
        &path,
        r#"{
  "Book": [{"Title": "Cosmos"}, {"Title": "Contact"}],
  "Author": [{"Name": "Sagan"}]
}"#,
    );

    let backend = load_data(&path).expect("data should load");
    assert_eq!(backend.len("book"), 2);
    assert_eq!(backend.len("Author"), 1);
    assert!(backend.is_empty("Publisher"));
}

#[test]
fn test_malformed_data_file() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("data.json");
    write_file(&path, "{ not json");

    let err = load_data(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Json { .. }));
}
