use crate::backend::{BackendError, ExecutionBackend};
use crate::filter::{FilterEngine, FilterError};
use crate::schema::SchemaProvider;
use serde_json::Value as Json;
use thiserror::Error;

/// Failure of an end-to-end filter request
///
/// Filter problems and backend problems stay distinct so a caller can map
/// them to different responses.
#[derive(Debug, Error, PartialEq)]
pub enum ServiceError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ServiceError {
    /// The entity type is unknown
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Filter(FilterError::EntityNotFound(_)))
    }

    /// The filter string is malformed
    pub fn is_bad_request(&self) -> bool {
        matches!(self, ServiceError::Filter(FilterError::InvalidFilter(_)))
    }
}

/// Filters stored entities by name, given a filter string
pub struct FilterService<P, B> {
    schema: P,
    backend: B,
}

impl<P, B> FilterService<P, B>
where
    P: SchemaProvider + Send + Sync,
    B: ExecutionBackend,
{
    pub fn new(schema: P, backend: B) -> Self {
        Self { schema, backend }
    }

    pub fn schema(&self) -> &P {
        &self.schema
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Compile `filter` for `entity_name` and run it on the backend
    ///
    /// Availability is checked before compiling; nothing reaches the backend
    /// unless compilation succeeds in full.
    pub async fn filter_entities(
        &self,
        filter: &str,
        entity_name: &str,
    ) -> Result<Vec<Json>, ServiceError> {
        if !self.backend.can_connect().await {
            tracing::warn!(entity = entity_name, "backend unavailable");
            return Err(BackendError::Unavailable(
                "Database connection is not available".to_string(),
            )
            .into());
        }

        let engine = FilterEngine::new(&self.schema);
        let (compiled, sort) = engine.compile(entity_name, filter)?;
        let docs = self.backend.execute(&compiled, sort.as_ref()).await?;

        tracing::info!(
            entity = %compiled.entity,
            filter,
            results = docs.len(),
            "filtered entities"
        );
        Ok(docs)
    }
}
