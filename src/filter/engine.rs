use super::error::FilterError;
use super::parser::{CriterionKind, FilterCriterion, FilterParts};
use super::path::{resolve, resolve_field};
use super::predicate::{Bound, Predicate};
use super::sort::{SortSpec, resolve_sort};
use crate::schema::{EntitySchema, SchemaProvider};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// AND-combined predicate scoped to one entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledFilter {
    pub entity: String,
    pub predicate: Predicate,
}

impl CompiledFilter {
    pub fn matches(&self, doc: &Json) -> bool {
        self.predicate.matches(doc)
    }
}

/// Compiles filter strings against a schema provider
///
/// The engine holds no state besides the provider reference, so one engine
/// can serve concurrent compilations.
pub struct FilterEngine<'a, P: SchemaProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: SchemaProvider + ?Sized> FilterEngine<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Compile a filter string for the named entity type
    pub fn compile(
        &self,
        entity_name: &str,
        filter: &str,
    ) -> Result<(CompiledFilter, Option<SortSpec>), FilterError> {
        let root = self
            .provider
            .entity(entity_name)
            .ok_or_else(|| FilterError::EntityNotFound(entity_name.to_string()))?;
        self.compile_for(root, filter)
    }

    /// Compile a filter string against an already resolved root type
    pub fn compile_for(
        &self,
        root: &EntitySchema,
        filter: &str,
    ) -> Result<(CompiledFilter, Option<SortSpec>), FilterError> {
        let parts = FilterParts::parse(filter)?;
        tracing::debug!(
            entity = %root.name,
            criteria = parts.criteria.len(),
            "compiling filter"
        );

        let sort = match &parts.sort_by {
            Some(path) => {
                let spec = resolve_sort(self.provider, root, path, parts.sort_descending)?;
                tracing::debug!(path = %spec.path, descending = spec.descending, "resolved sort");
                Some(spec)
            }
            None => None,
        };

        let mut predicate = Predicate::always();

        for criterion in parts.plain() {
            if criterion.is_dotted() {
                let path = resolve(self.provider, root, &criterion.field_key)?;
                tracing::trace!(key = %criterion.field_key, pivot = ?path.pivot(), "nested criterion");
                predicate = predicate.and(Predicate::build(&path, &criterion.raw_value)?);
                continue;
            }

            let path = resolve_field(root, &criterion.field_key).ok_or_else(|| {
                FilterError::invalid(format!("Field '{}' does not exist", criterion.field_key))
            })?;

            let field_name = path.to_string().to_lowercase();
            if parts.has_bound(&field_name) {
                tracing::trace!(field = %field_name, "plain criterion superseded by range bound");
                continue;
            }

            predicate = predicate.and(Predicate::build(&path, &criterion.raw_value)?);
        }

        for criterion in parts.min_bounds().chain(parts.max_bounds()) {
            predicate = predicate.and(range_predicate(root, criterion)?);
        }

        tracing::debug!(predicate = %predicate, "compiled filter");
        Ok((
            CompiledFilter {
                entity: root.name.clone(),
                predicate,
            },
            sort,
        ))
    }
}

fn range_predicate(root: &EntitySchema, criterion: &FilterCriterion) -> Result<Predicate, FilterError> {
    let (bound, label) = match criterion.kind {
        CriterionKind::Min => (Bound::Min, "min"),
        CriterionKind::Max => (Bound::Max, "max"),
        CriterionKind::Plain => {
            return Err(FilterError::invalid(format!(
                "'{}' is not a range criterion",
                criterion.field_key
            )));
        }
    };

    let path = resolve_field(root, criterion.target()).ok_or_else(|| {
        FilterError::invalid(format!(
            "Field '{}' does not exist for {} filter",
            criterion.target(),
            label
        ))
    })?;

    Predicate::range(&path, &criterion.raw_value, bound)
}
