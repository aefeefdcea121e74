//! Document-store boundary.
//!
//! The core never talks to a backend directly; it goes through the
//! [`MedicineStore`] trait, injected into the service layer. Medicines
//! live in a per-user collection (`config::medicines_collection_path`)
//! and are only ever archived, never hard-deleted.

pub mod memory;

pub use memory::MemoryStore;

use serde_json::Value;
use thiserror::Error;

use crate::models::Medicine;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("medicine not found: {id}")]
    NotFound { id: String },

    #[error("invalid medicine: {0}")]
    InvalidMedicine(String),

    #[error("store write failed: {0}")]
    WriteFailed(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Async CRUD surface of the remote medicine collection.
///
/// `update_field` is the incremental write path; `replace_document` is the
/// whole-document fallback used when an incremental update fails (for
/// instance because the document has gone missing on the backend).
#[allow(async_fn_in_trait)]
pub trait MedicineStore {
    async fn list_medicines(&self, user_id: &str) -> Result<Vec<Medicine>, StoreError>;

    async fn get_medicine(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<Medicine>, StoreError>;

    /// Persists a new medicine and returns the store-assigned id.
    async fn create_medicine(
        &self,
        user_id: &str,
        medicine: &Medicine,
    ) -> Result<String, StoreError>;

    /// Overwrites a single named field of one document.
    async fn update_field(
        &self,
        user_id: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError>;

    /// Writes the whole document, creating it if it no longer exists.
    async fn replace_document(
        &self,
        user_id: &str,
        id: &str,
        medicine: &Medicine,
    ) -> Result<(), StoreError>;

    /// Archival is the deletion substitute: flips `active` to false.
    async fn archive(&self, user_id: &str, id: &str) -> Result<(), StoreError> {
        self.update_field(user_id, id, "active", Value::Bool(false))
            .await
    }
}
