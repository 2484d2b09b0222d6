//! Dotted path resolution against schema metadata.
//!
//! A path such as `reviews.author.name` is walked segment by segment. When a
//! segment lands on a collection-valued field and more segments follow, that
//! step becomes the collection pivot: the remaining segments are resolved
//! against the element type, and predicates built on the path match if any
//! element satisfies them. Only the first collection step pivots.

use super::error::FilterError;
use crate::schema::{EntitySchema, FieldType, SchemaProvider};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    /// Declared field name, as registered
    pub field_name: String,
    pub declared_type: FieldType,
    /// True for the step where traversal crosses into collection elements
    pub is_collection_step: bool,
}

/// A validated, typed chain of field accesses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPath {
    steps: Vec<PathStep>,
}

impl ResolvedPath {
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Declared type of the last step
    pub fn terminal_type(&self) -> Option<&FieldType> {
        self.steps.last().map(|step| &step.declared_type)
    }

    /// Index of the collection pivot step, if the path crosses one
    pub fn pivot(&self) -> Option<usize> {
        self.steps.iter().position(|step| step.is_collection_step)
    }

    /// Split into the path up to and including the pivot, and the path
    /// applied to each element
    pub fn split_at_pivot(&self) -> Option<(ResolvedPath, ResolvedPath)> {
        let pivot = self.pivot()?;
        let (collection, element) = self.steps.split_at(pivot + 1);
        Some((
            ResolvedPath {
                steps: collection.to_vec(),
            },
            ResolvedPath {
                steps: element.to_vec(),
            },
        ))
    }

    /// Walk the document along this path. Missing fields and null
    /// intermediate values yield `None`.
    pub fn read<'a>(&self, doc: &'a Json) -> Option<&'a Json> {
        let mut node = doc;
        for (idx, step) in self.steps.iter().enumerate() {
            if idx > 0 && node.is_null() {
                return None;
            }
            node = lookup_field(node, &step.field_name)?;
        }
        Some(node)
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.steps.iter().map(|s| s.field_name.as_str()).collect();
        write!(f, "{}", names.join("."))
    }
}

/// Exact key first, then a case-insensitive match
pub(crate) fn lookup_field<'a>(node: &'a Json, name: &str) -> Option<&'a Json> {
    let object = node.as_object()?;
    object.get(name).or_else(|| {
        object
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

/// A segment that did not resolve, and the type it was looked up on
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Unresolved {
    pub segment: String,
    pub owner: String,
}

/// Walk dotted segments. The first collection step that is not the last
/// segment switches resolution to the element type.
pub(crate) fn walk<P: SchemaProvider + ?Sized>(
    provider: &P,
    root: &EntitySchema,
    path: &str,
) -> Result<ResolvedPath, Unresolved> {
    let segments: Vec<&str> = path.split('.').map(str::trim).collect();
    let last = segments.len() - 1;

    let mut steps: Vec<PathStep> = Vec::with_capacity(segments.len());
    let mut owner_name = root.name.clone();
    let mut owner = Some(root);
    let mut pivoted = false;

    for (idx, segment) in segments.iter().enumerate() {
        let field = owner
            .and_then(|schema| schema.field(segment))
            .ok_or_else(|| Unresolved {
                segment: segment.to_string(),
                owner: owner_name.clone(),
            })?;

        let is_collection_step = !pivoted && idx < last && field.ty.is_collection();
        let next_type = if is_collection_step {
            pivoted = true;
            field.ty.element_type().unwrap_or(&field.ty)
        } else {
            &field.ty
        };

        steps.push(PathStep {
            field_name: field.name.clone(),
            declared_type: field.ty.clone(),
            is_collection_step,
        });

        owner_name = next_type.to_string();
        owner = provider.fields_of(next_type);
    }

    Ok(ResolvedPath { steps })
}

/// Resolve a dotted filter path against the root entity
pub fn resolve<P: SchemaProvider + ?Sized>(
    provider: &P,
    root: &EntitySchema,
    path: &str,
) -> Result<ResolvedPath, FilterError> {
    walk(provider, root, path).map_err(|err| {
        FilterError::invalid(format!(
            "Property '{}' not found on type '{}'",
            err.segment, err.owner
        ))
    })
}

/// Resolve a single flat field name
pub fn resolve_field(root: &EntitySchema, name: &str) -> Option<ResolvedPath> {
    root.field(name).map(|field| ResolvedPath {
        steps: vec![PathStep {
            field_name: field.name.clone(),
            declared_type: field.ty.clone(),
            is_collection_step: false,
        }],
    })
}
