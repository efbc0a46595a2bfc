//! Database layer: a schemaless document store with Firestore and in-memory
//! backends.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::error::AppError;
use async_trait::async_trait;

/// Document body: a JSON object keyed by field name.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TASKS: &str = "tasks";
}

/// Equality predicate on a top-level string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: &'static str,
    pub value: String,
}

impl FieldFilter {
    pub fn eq(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        doc.get(self.field).and_then(|v| v.as_str()) == Some(self.value.as_str())
    }
}

/// Per-collection key→document persistence.
///
/// Every method is a single-document operation except `list` and `query`.
/// There are no transactions: concurrent `merge` calls on one document are
/// last-write-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AppError>;

    /// All documents in a collection as `(id, body)` pairs.
    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, AppError>;

    /// Documents matching every filter (AND). An empty filter list behaves
    /// like `list`.
    async fn query(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<(String, Document)>, AppError>;

    /// Store a new document under a generated id and return the id.
    async fn insert(&self, collection: &str, doc: Document) -> Result<String, AppError>;

    /// Create a document under a caller-chosen id, replacing any existing one.
    async fn set(&self, collection: &str, id: &str, doc: Document) -> Result<(), AppError>;

    /// Overwrite only the given top-level fields of an existing document.
    /// Fails with `NotFound` and writes nothing if the document is missing.
    async fn merge(&self, collection: &str, id: &str, fields: Document) -> Result<(), AppError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError>;
}
