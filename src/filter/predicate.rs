//! Predicate construction and evaluation.
//!
//! Predicates form a small serializable tree. The in-memory backend evaluates
//! it directly against JSON documents; other backends can translate it into
//! their native query form.

use super::coerce::coerce;
use super::error::FilterError;
use super::path::ResolvedPath;
use super::value::Value;
use crate::schema::FieldType;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::cmp::Ordering;
use std::fmt;

/// Direction of a range bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    /// Field value >= bound
    Min,
    /// Field value <= bound
    Max,
}

impl Bound {
    pub fn symbol(self) -> &'static str {
        match self {
            Bound::Min => ">=",
            Bound::Max => "<=",
        }
    }

    fn admits(self, ordering: Ordering) -> bool {
        match self {
            Bound::Min => ordering != Ordering::Less,
            Bound::Max => ordering != Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// String field contains the needle
    Contains { path: ResolvedPath, needle: String },
    /// Field equals the value
    Equals { path: ResolvedPath, value: Value },
    /// Field compared against a bound
    Range {
        path: ResolvedPath,
        bound: Bound,
        value: Value,
    },
    /// Some element of the collection, with `element` applied, equals the value
    Any {
        collection: ResolvedPath,
        element: ResolvedPath,
        value: Value,
    },
    /// Every predicate holds; empty is always true
    And { predicates: Vec<Predicate> },
}

impl Default for Predicate {
    fn default() -> Self {
        Predicate::always()
    }
}

impl Predicate {
    /// The predicate that matches every entity
    pub fn always() -> Self {
        Predicate::And {
            predicates: Vec::new(),
        }
    }

    /// Build the predicate for a `key=value` criterion on a resolved path
    ///
    /// Paths crossing a collection compile to an existential equality on the
    /// element path. A flat string field compiles to substring containment;
    /// anything else to equality on the coerced value. Nullable strings count
    /// as strings.
    pub fn build(path: &ResolvedPath, raw: &str) -> Result<Predicate, FilterError> {
        if let Some((collection, element)) = path.split_at_pivot() {
            let value = coerce(terminal(&element)?, raw)?;
            return Ok(Predicate::Any {
                collection,
                element,
                value,
            });
        }

        let ty = terminal(path)?;
        if path.len() == 1 && ty.unwrap_nullable().is_textual() {
            return Ok(Predicate::Contains {
                path: path.clone(),
                needle: raw.to_string(),
            });
        }

        Ok(Predicate::Equals {
            path: path.clone(),
            value: coerce(ty, raw)?,
        })
    }

    /// Build a range predicate on a flat field path
    pub fn range(path: &ResolvedPath, raw: &str, bound: Bound) -> Result<Predicate, FilterError> {
        let ty = terminal(path)?;
        if !ty.is_ordered() {
            return Err(FilterError::invalid(format!(
                "Range filter is not supported for field '{}' of type {}",
                path, ty
            )));
        }

        Ok(Predicate::Range {
            path: path.clone(),
            bound,
            value: coerce(ty, raw)?,
        })
    }

    /// Conjoin two predicates, flattening nested conjunctions
    pub fn and(self, other: Predicate) -> Predicate {
        let mut predicates = match self {
            Predicate::And { predicates } => predicates,
            single => vec![single],
        };
        match other {
            Predicate::And { predicates: more } => predicates.extend(more),
            single => predicates.push(single),
        }
        Predicate::And { predicates }
    }

    /// Evaluate against an entity document
    pub fn matches(&self, doc: &Json) -> bool {
        match self {
            Predicate::Contains { path, needle } => path
                .read(doc)
                .and_then(Json::as_str)
                .is_some_and(|s| s.contains(needle.as_str())),
            Predicate::Equals { path, value } => read_typed(path, doc)
                .is_some_and(|actual| actual.equals(value)),
            Predicate::Range { path, bound, value } => read_typed(path, doc)
                .and_then(|actual| actual.compare(value))
                .is_some_and(|ordering| bound.admits(ordering)),
            Predicate::Any {
                collection,
                element,
                value,
            } => collection
                .read(doc)
                .and_then(Json::as_array)
                .is_some_and(|items| {
                    items.iter().any(|item| {
                        read_typed(element, item).is_some_and(|actual| actual.equals(value))
                    })
                }),
            Predicate::And { predicates } => predicates.iter().all(|p| p.matches(doc)),
        }
    }
}

fn terminal(path: &ResolvedPath) -> Result<&FieldType, FilterError> {
    path.terminal_type()
        .ok_or_else(|| FilterError::invalid("Empty field path"))
}

fn read_typed(path: &ResolvedPath, doc: &Json) -> Option<Value> {
    let ty = path.terminal_type()?;
    path.read(doc).and_then(|node| Value::from_json(node, ty))
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Contains { path, needle } => write!(f, "{} contains {:?}", path, needle),
            Predicate::Equals { path, value } => write!(f, "{} == {}", path, value),
            Predicate::Range { path, bound, value } => {
                write!(f, "{} {} {}", path, bound.symbol(), value)
            }
            Predicate::Any {
                collection,
                element,
                value,
            } => write!(f, "any({}: {} == {})", collection, element, value),
            Predicate::And { predicates } if predicates.is_empty() => write!(f, "true"),
            Predicate::And { predicates } => {
                let parts: Vec<String> = predicates.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(" AND "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::path::{resolve, resolve_field};
    use crate::schema::{EntitySchema, SchemaProvider, SchemaRegistry};
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
            .with_entity(
                EntitySchema::new("Product")
                    .with_field("name", FieldType::String)
                    .with_field("price", FieldType::Float)
                    .with_field("active", FieldType::Bool)
                    .with_field("discount", FieldType::nullable(FieldType::Float))
                    .with_field("category", FieldType::object("Category"))
                    .with_field("reviews", FieldType::list(FieldType::object("Review"))),
            )
            .unwrap()
            .with_entity(EntitySchema::new("Category").with_field("name", FieldType::String))
            .unwrap()
            .with_entity(EntitySchema::new("Review").with_field("rating", FieldType::Int))
            .unwrap()
    }

    fn path(dotted: &str) -> ResolvedPath {
        let registry = registry();
        let root = registry.entity("Product").unwrap().clone();
        resolve(&registry, &root, dotted).unwrap()
    }

    #[test]
    fn test_flat_string_uses_contains() {
        let predicate = Predicate::build(&path("name"), "idg").unwrap();
        assert!(matches!(predicate, Predicate::Contains { .. }));
        assert!(predicate.matches(&json!({"name": "Widget"})));
        assert!(!predicate.matches(&json!({"name": "WIDGET"})));
        assert!(!predicate.matches(&json!({"name": null})));
    }

    #[test]
    fn test_nested_string_uses_equality() {
        let predicate = Predicate::build(&path("category.name"), "Tools").unwrap();
        assert!(matches!(predicate, Predicate::Equals { .. }));
        assert!(predicate.matches(&json!({"category": {"name": "Tools"}})));
        assert!(!predicate.matches(&json!({"category": {"name": "Power Tools"}})));
    }

    #[test]
    fn test_equality_on_coerced_value() {
        let predicate = Predicate::build(&path("active"), "TRUE").unwrap();
        assert!(predicate.matches(&json!({"active": true})));
        assert!(!predicate.matches(&json!({"active": false})));
        assert!(Predicate::build(&path("price"), "cheap").is_err());
    }

    #[test]
    fn test_any_over_collection() {
        let predicate = Predicate::build(&path("reviews.rating"), "5").unwrap();
        assert!(predicate.matches(&json!({"reviews": [{"rating": 3}, {"rating": 5}]})));
        assert!(!predicate.matches(&json!({"reviews": [{"rating": 3}]})));
        assert!(!predicate.matches(&json!({"reviews": []})));
        assert!(!predicate.matches(&json!({"reviews": null})));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let registry = registry();
        let root = registry.entity("product").unwrap();
        let price = resolve_field(root, "price").unwrap();
        let min = Predicate::range(&price, "5", Bound::Min).unwrap();
        let max = Predicate::range(&price, "20", Bound::Max).unwrap();

        assert!(min.matches(&json!({"price": 5.0})));
        assert!(!min.matches(&json!({"price": 4.99})));
        assert!(max.matches(&json!({"price": 20})));
        assert!(!max.matches(&json!({"price": 21})));
    }

    #[test]
    fn test_null_never_satisfies_range() {
        let registry = registry();
        let root = registry.entity("product").unwrap();
        let discount = resolve_field(root, "discount").unwrap();
        let min = Predicate::range(&discount, "0", Bound::Min).unwrap();
        assert!(!min.matches(&json!({"discount": null})));
        assert!(min.matches(&json!({"discount": 0.1})));
    }

    #[test]
    fn test_range_rejected_for_bool() {
        let registry = registry();
        let root = registry.entity("product").unwrap();
        let active = resolve_field(root, "active").unwrap();
        let err = Predicate::range(&active, "true", Bound::Min).unwrap_err();
        assert_eq!(
            err,
            FilterError::invalid("Range filter is not supported for field 'active' of type bool")
        );
    }

    #[test]
    fn test_and_flattens() {
        let a = Predicate::build(&path("active"), "true").unwrap();
        let b = Predicate::build(&path("name"), "W").unwrap();
        let combined = Predicate::always().and(a).and(b);
        match &combined {
            Predicate::And { predicates } => assert_eq!(predicates.len(), 2),
            other => panic!("expected conjunction, got {other:?}"),
        }
        assert_eq!(combined.to_string(), "active == true AND name contains \"W\"");
        assert!(Predicate::always().matches(&json!({})));
    }
}
