//! In-memory document store for tests and embedding.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future::BoxFuture;
use parking_lot::RwLock;

use basalt_codec::Record;

use crate::{DocumentStore, DocumentSummary, StoreError, StoreResult};

struct StoredDocument {
    name: String,
    records: Vec<Record>,
}

/// Map-backed store. Ids are assigned sequentially per instance.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, StoredDocument>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn save<'a>(
        &'a self,
        name: &'a str,
        records: &'a [Record],
    ) -> BoxFuture<'a, StoreResult<String>> {
        Box::pin(async move {
            let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
            self.documents.write().insert(
                id.clone(),
                StoredDocument {
                    name: name.to_string(),
                    records: records.to_vec(),
                },
            );
            log::info!("saved document '{}' as {}", name, id);
            Ok(id)
        })
    }

    fn load<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<Vec<Record>>> {
        Box::pin(async move {
            self.documents
                .read()
                .get(id)
                .map(|doc| doc.records.clone())
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        })
    }

    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<DocumentSummary>>> {
        Box::pin(async move {
            let mut summaries: Vec<DocumentSummary> = self
                .documents
                .read()
                .iter()
                .map(|(id, doc)| DocumentSummary {
                    id: id.clone(),
                    name: doc.name.clone(),
                    record_count: doc.records.len(),
                })
                .collect();
            summaries.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(summaries)
        })
    }

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            match self.documents.write().remove(id) {
                Some(_) => Ok(()),
                None => Err(StoreError::NotFound(id.to_string())),
            }
        })
    }
}
