use super::error::FilterError;
use super::path::{ResolvedPath, walk};
use super::value::Value;
use crate::schema::{EntitySchema, SchemaProvider};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::cmp::Ordering;

/// Ordering by a single resolved path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub path: ResolvedPath,
    pub descending: bool,
}

impl SortSpec {
    /// Extract the sort key from a document
    pub fn key(&self, doc: &Json) -> Option<Value> {
        let ty = self.path.terminal_type()?;
        self.path
            .read(doc)
            .and_then(|node| Value::from_json(node, ty))
    }

    pub fn compare(&self, a: &Json, b: &Json) -> Ordering {
        let ordering = Value::sort_cmp(self.key(a).as_ref(), self.key(b).as_ref());
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }

    /// Stable sort in place
    pub fn apply(&self, docs: &mut [Json]) {
        docs.sort_by(|a, b| self.compare(a, b));
    }
}

/// Resolve a sort path. Every segment must be a plain field access: a path
/// crossing a collection or ending on a non-scalar field is rejected.
pub fn resolve_sort<P: SchemaProvider + ?Sized>(
    provider: &P,
    root: &EntitySchema,
    path: &str,
    descending: bool,
) -> Result<SortSpec, FilterError> {
    let resolved = walk(provider, root, path).map_err(|err| {
        FilterError::invalid(format!("Sort field '{}' does not exist", err.segment))
    })?;

    if let Some(pivot) = resolved.pivot() {
        return Err(FilterError::invalid(format!(
            "Sort field '{}' crosses collection '{}'",
            path,
            resolved.steps()[pivot].field_name
        )));
    }

    if let Some(ty) = resolved.terminal_type()
        && !ty.is_scalar()
    {
        return Err(FilterError::invalid(format!(
            "Sort field '{}' of type {} is not sortable",
            path, ty
        )));
    }

    Ok(SortSpec {
        path: resolved,
        descending,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, SchemaRegistry};
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
            .with_entity(
                EntitySchema::new("Product")
                    .with_field("price", FieldType::Float)
                    .with_field("category", FieldType::object("Category"))
                    .with_field("reviews", FieldType::list(FieldType::object("Review"))),
            )
            .unwrap()
            .with_entity(EntitySchema::new("Category").with_field("name", FieldType::String))
            .unwrap()
            .with_entity(EntitySchema::new("Review").with_field("rating", FieldType::Int))
            .unwrap()
    }

    #[test]
    fn test_sort_by_nested_field() {
        let registry = registry();
        let root = registry.entity("product").unwrap();
        let spec = resolve_sort(&registry, root, "category.name", true).unwrap();
        let mut docs = vec![
            json!({"category": {"name": "b"}}),
            json!({"category": {"name": "c"}}),
            json!({"category": null}),
            json!({"category": {"name": "a"}}),
        ];
        spec.apply(&mut docs);
        assert_eq!(docs[0], json!({"category": {"name": "c"}}));
        assert_eq!(docs[2], json!({"category": {"name": "a"}}));
        assert_eq!(docs[3], json!({"category": null}));
    }

    #[test]
    fn test_sort_is_stable() {
        let registry = registry();
        let root = registry.entity("product").unwrap();
        let spec = resolve_sort(&registry, root, "price", false).unwrap();
        let mut docs = vec![
            json!({"id": 1, "price": 2.0}),
            json!({"id": 2, "price": 1.0}),
            json!({"id": 3, "price": 2.0}),
        ];
        spec.apply(&mut docs);
        let ids: Vec<_> = docs.iter().map(|d| d["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_unknown_sort_field() {
        let registry = registry();
        let root = registry.entity("product").unwrap();
        let err = resolve_sort(&registry, root, "category.missing", false).unwrap_err();
        assert_eq!(err, FilterError::invalid("Sort field 'missing' does not exist"));
    }

    #[test]
    fn test_sort_through_collection_fails_fast() {
        let registry = registry();
        let root = registry.entity("product").unwrap();
        let err = resolve_sort(&registry, root, "reviews.rating", false).unwrap_err();
        assert_eq!(
            err,
            FilterError::invalid("Sort field 'reviews.rating' crosses collection 'reviews'")
        );
    }

    #[test]
    fn test_sort_by_object_rejected() {
        let registry = registry();
        let root = registry.entity("product").unwrap();
        assert!(resolve_sort(&registry, root, "category", false).is_err());
    }
}
