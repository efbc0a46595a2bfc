// SPDX-License-Identifier: MIT

//! In-process document store used by tests and `STORE_BACKEND=memory`.

use super::{Document, DocumentStore, FieldFilter};
use crate::error::AppError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;

/// Documents live in one ordered map per collection, so listings come back
/// sorted by id.
#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<String, BTreeMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AppError> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id).cloned()))
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, AppError> {
        self.query(collection, &[]).await
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<(String, Document)>, AppError> {
        let Some(docs) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(docs
            .iter()
            .filter(|(_, doc)| filters.iter().all(|f| f.matches(doc)))
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect())
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<String, AppError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), doc);
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, doc: Document) -> Result<(), AppError> {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
        Ok(())
    }

    async fn merge(&self, collection: &str, id: &str, fields: Document) -> Result<(), AppError> {
        let mut docs = self.collections.entry(collection.to_string()).or_default();
        let doc = docs.get_mut(id).ok_or_else(|| {
            AppError::NotFound(format!("No document to update: {collection}/{id}"))
        })?;
        doc.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        if let Some(mut docs) = self.collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}
