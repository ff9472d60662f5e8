pub mod csv_export;
pub mod local;
pub mod worker;

use serde_json::Value;
use thiserror::Error;

pub use local::LocalStore;
pub use worker::{spawn_store_worker, StoreCommand, StoreEvent, StoreHandle};

/// The two document collections the scheduler reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Tasks,
    Milestones,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Tasks => "tasks",
            Collection::Milestones => "milestones",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed document data: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("no document {id} in {collection}")]
    NotFound { collection: &'static str, id: String },
}

/// Generic document CRUD the scheduler is written against. Documents are
/// JSON objects carrying at least an `"id"` string field.
///
/// `update` has partial-field semantics: callers send only the fields being
/// changed and the store merges them into the stored document and stamps
/// `updated_at`.
pub trait DocumentStore: Send {
    fn get_all(&self, collection: Collection) -> Result<Vec<Value>, StoreError>;

    /// All documents whose fields equal every `(field, value)` filter.
    fn query(
        &self,
        collection: Collection,
        filters: &[(String, Value)],
    ) -> Result<Vec<Value>, StoreError>;

    /// Insert a document, minting an id and `created_at`/`updated_at` stamps.
    /// Returns the stored document.
    fn create(&self, collection: Collection, data: Value) -> Result<Value, StoreError>;

    /// Merge `patch`'s fields into the document and stamp `updated_at`.
    /// Returns the updated document.
    fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<Value, StoreError>;

    /// Returns whether a document was deleted.
    fn remove(&self, collection: Collection, id: &str) -> Result<bool, StoreError>;
}
