use crate::filter::{CompiledFilter, SortSpec};
use async_trait::async_trait;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Failures reported by an execution backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("Cannot connect to backend: {0}")]
    Unavailable(String),

    #[error("Backend execution failed: {0}")]
    Execution(String),
}

/// Evaluates compiled filters against stored entities
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn can_connect(&self) -> bool;

    /// Return every stored entity of `filter.entity` matching the predicate,
    /// ordered by `sort` when present
    async fn execute(
        &self,
        filter: &CompiledFilter,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Json>, BackendError>;
}

#[async_trait]
impl<T: ExecutionBackend + ?Sized> ExecutionBackend for Arc<T> {
    async fn can_connect(&self) -> bool {
        (**self).can_connect().await
    }

    async fn execute(
        &self,
        filter: &CompiledFilter,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Json>, BackendError> {
        (**self).execute(filter, sort).await
    }
}

/// In-memory document store keyed by entity name
#[derive(Debug)]
pub struct MemoryBackend {
    collections: RwLock<HashMap<String, Vec<Json>>>,
    online: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            online: AtomicBool::new(true),
        }
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(self, entity: &str, docs: impl IntoIterator<Item = Json>) -> Self {
        self.extend(entity, docs);
        self
    }

    pub fn extend(&self, entity: &str, docs: impl IntoIterator<Item = Json>) {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collections
            .entry(entity.to_lowercase())
            .or_default()
            .extend(docs);
    }

    /// Number of stored documents for an entity
    pub fn len(&self, entity: &str) -> usize {
        self.collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&entity.to_lowercase())
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self, entity: &str) -> bool {
        self.len(entity) == 0
    }

    /// Simulate losing or regaining the connection
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

#[async_trait]
impl ExecutionBackend for MemoryBackend {
    async fn can_connect(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    async fn execute(
        &self,
        filter: &CompiledFilter,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Json>, BackendError> {
        if !self.can_connect().await {
            return Err(BackendError::Unavailable(
                "in-memory store is offline".to_string(),
            ));
        }

        let mut matched: Vec<Json> = {
            let collections = self
                .collections
                .read()
                .map_err(|_| BackendError::Execution("store lock poisoned".to_string()))?;
            collections
                .get(&filter.entity.to_lowercase())
                .map(|docs| {
                    docs.iter()
                        .filter(|doc| filter.matches(doc))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        if let Some(sort) = sort {
            sort.apply(&mut matched);
        }

        tracing::debug!(entity = %filter.entity, matched = matched.len(), "executed filter");
        Ok(matched)
    }
}
