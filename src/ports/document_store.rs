use std::collections::BTreeMap;

use crate::error::StoreError;

/// A single change to a stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentUpdate {
    Write(String),
    Delete,
}

/// Filename to content of every document currently in the store.
pub type Documents = BTreeMap<String, String>;

/// Filename to change, applied together in one request.
pub type DocumentUpdates = BTreeMap<String, DocumentUpdate>;

/// Port trait wrapping the remote document store holding the snapshots.
///
/// Implementations live in `services::gist::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch_documents(&self) -> Result<Documents, StoreError>;

    async fn apply_updates(&self, updates: DocumentUpdates) -> Result<(), StoreError>;
}
