//! In-memory [`MedicineStore`].
//!
//! Backs the service tests and serves as the offline fallback store. Ids
//! are minted as v4 UUIDs, mirroring the opaque ids the real backend
//! assigns. Write failures can be injected per path to exercise the
//! update-then-replace fallback at the boundary.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde_json::Value;
use uuid::Uuid;

use super::{MedicineStore, StoreError};
use crate::models::Medicine;

type Collections = HashMap<String, HashMap<String, Medicine>>;

#[derive(Default)]
pub struct MemoryStore {
    // user id -> medicine id -> document
    documents: Mutex<Collections>,
    fail_field_updates: AtomicBool,
    fail_replaces: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `update_field` calls fail.
    pub fn set_fail_field_updates(&self, fail: bool) {
        self.fail_field_updates.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `replace_document` calls fail.
    pub fn set_fail_replaces(&self, fail: bool) {
        self.fail_replaces.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Collections>, StoreError> {
        self.documents
            .lock()
            .map_err(|_| StoreError::Backend("store mutex poisoned".into()))
    }
}

impl MedicineStore for MemoryStore {
    async fn list_medicines(&self, user_id: &str) -> Result<Vec<Medicine>, StoreError> {
        let documents = self.lock()?;
        let mut medicines: Vec<Medicine> = documents
            .get(user_id)
            .map(|collection| collection.values().cloned().collect())
            .unwrap_or_default();
        // HashMap iteration order is arbitrary; present oldest first.
        medicines.sort_by_key(|m| m.created_at);
        Ok(medicines)
    }

    async fn get_medicine(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<Medicine>, StoreError> {
        let documents = self.lock()?;
        Ok(documents
            .get(user_id)
            .and_then(|collection| collection.get(id))
            .cloned())
    }

    async fn create_medicine(
        &self,
        user_id: &str,
        medicine: &Medicine,
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut stored = medicine.clone();
        stored.id = id.clone();

        let mut documents = self.lock()?;
        documents
            .entry(user_id.to_owned())
            .or_default()
            .insert(id.clone(), stored);
        Ok(id)
    }

    async fn update_field(
        &self,
        user_id: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        if self.fail_field_updates.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed("field updates unavailable".into()));
        }

        let mut documents = self.lock()?;
        let medicine = documents
            .get_mut(user_id)
            .and_then(|collection| collection.get_mut(id))
            .ok_or_else(|| StoreError::NotFound { id: id.to_owned() })?;

        // Patch through the document representation so any named field
        // can be overwritten, like the real backend does.
        let mut document =
            serde_json::to_value(&*medicine).map_err(|e| StoreError::Backend(e.to_string()))?;
        document[field] = value;
        *medicine = serde_json::from_value(document)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        Ok(())
    }

    async fn replace_document(
        &self,
        user_id: &str,
        id: &str,
        medicine: &Medicine,
    ) -> Result<(), StoreError> {
        if self.fail_replaces.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed("replace unavailable".into()));
        }

        let mut stored = medicine.clone();
        stored.id = id.to_owned();

        // Set semantics: recreates the document if it went missing.
        let mut documents = self.lock()?;
        documents
            .entry(user_id.to_owned())
            .or_default()
            .insert(id.to_owned(), stored);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const USER: &str = "user-1";

    fn medicine(name: &str) -> Medicine {
        Medicine::new(
            name,
            vec!["08:00".into()],
            true,
            7,
            Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn create_assigns_fresh_id() {
        let store = MemoryStore::new();
        let id = store.create_medicine(USER, &medicine("Amoxicillin")).await.unwrap();
        assert!(!id.is_empty());

        let fetched = store.get_medicine(USER, &id).await.unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.name, "Amoxicillin");
    }

    #[tokio::test]
    async fn list_is_scoped_to_user() {
        let store = MemoryStore::new();
        store.create_medicine(USER, &medicine("Amoxicillin")).await.unwrap();
        store.create_medicine("user-2", &medicine("Ibuprofen")).await.unwrap();

        let medicines = store.list_medicines(USER).await.unwrap();
        assert_eq!(medicines.len(), 1);
        assert_eq!(medicines[0].name, "Amoxicillin");
        assert!(store.list_medicines("user-3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_field_patches_named_field() {
        let store = MemoryStore::new();
        let id = store.create_medicine(USER, &medicine("Amoxicillin")).await.unwrap();

        store
            .update_field(USER, &id, "active", Value::Bool(false))
            .await
            .unwrap();
        let fetched = store.get_medicine(USER, &id).await.unwrap().unwrap();
        assert!(!fetched.active);
    }

    #[tokio::test]
    async fn update_field_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_field(USER, "no-such-id", "active", Value::Bool(false))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn replace_recreates_missing_document() {
        let store = MemoryStore::new();
        let med = medicine("Amoxicillin");
        store
            .replace_document(USER, "restored-id", &med)
            .await
            .unwrap();

        let fetched = store.get_medicine(USER, "restored-id").await.unwrap().unwrap();
        assert_eq!(fetched.id, "restored-id");
        assert_eq!(fetched.name, "Amoxicillin");
    }

    #[tokio::test]
    async fn archive_flips_active_flag() {
        let store = MemoryStore::new();
        let id = store.create_medicine(USER, &medicine("Amoxicillin")).await.unwrap();

        store.archive(USER, &id).await.unwrap();
        let fetched = store.get_medicine(USER, &id).await.unwrap().unwrap();
        assert!(!fetched.active);
    }

    #[tokio::test]
    async fn injected_failures_surface_as_write_failed() {
        let store = MemoryStore::new();
        let id = store.create_medicine(USER, &medicine("Amoxicillin")).await.unwrap();

        store.set_fail_field_updates(true);
        let err = store
            .update_field(USER, &id, "active", Value::Bool(false))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed(_)));

        store.set_fail_replaces(true);
        let err = store
            .replace_document(USER, &id, &medicine("Amoxicillin"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed(_)));
    }
}
