//! Medicine service — boundary between the pure scheduling core and the
//! document store.
//!
//! Owns the policy the pure functions cannot: fetching and ordering the
//! user's collection, validating new prescriptions, and persisting a
//! take/skip decision with the incremental-update-then-full-replace
//! fallback. The store and the clock are injected; nothing here reaches
//! for globals.

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::models::Medicine;
use crate::schedule::{self, ScheduleEntry, TimeSlotGroup};
use crate::store::{MedicineStore, StoreError};

pub struct MedicineService<S, C> {
    store: S,
    clock: C,
}

impl<S: MedicineStore, C: Clock> MedicineService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetches the user's medicines, active ones first. Archived and
    /// expired records stay in the list so their history remains
    /// browsable.
    pub async fn list_medicines(&self, user_id: &str) -> Result<Vec<Medicine>, StoreError> {
        let mut medicines = self.store.list_medicines(user_id).await?;
        medicines.sort_by_key(|m| !m.active);
        debug!(user = %user_id, count = medicines.len(), "fetched medicines");
        Ok(medicines)
    }

    /// Creates a new prescription starting now. The store assigns the id;
    /// the returned value carries it.
    pub async fn add_medicine(
        &self,
        user_id: &str,
        name: &str,
        times: Vec<String>,
        with_food: bool,
        duration_days: i64,
    ) -> Result<Medicine, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::InvalidMedicine("name must not be empty".into()));
        }
        if times.is_empty() {
            return Err(StoreError::InvalidMedicine(
                "at least one time slot is required".into(),
            ));
        }
        if duration_days <= 0 {
            return Err(StoreError::InvalidMedicine(
                "duration must be a positive number of days".into(),
            ));
        }

        let mut medicine = Medicine::new(name, times, with_food, duration_days, self.clock.now());
        let id = self.store.create_medicine(user_id, &medicine).await?;
        debug!(user = %user_id, %id, name = %medicine.name, "added medicine");
        medicine.id = id;
        Ok(medicine)
    }

    /// Records a take/skip decision for one dose slot today and persists
    /// it.
    ///
    /// The medicine is resolved from the caller's current snapshot; an id
    /// absent from it is a [`StoreError::NotFound`] and nothing is
    /// written. Persistence first tries an incremental update of the
    /// ledger field alone, then falls back to rewriting the whole
    /// document. The updated medicine is returned so the caller can
    /// refresh its snapshot optimistically while any re-fetch completes.
    pub async fn mark_dose(
        &self,
        user_id: &str,
        snapshot: &[Medicine],
        medicine_id: &str,
        time_slot: &str,
        taken: bool,
    ) -> Result<Medicine, StoreError> {
        let medicine = snapshot
            .iter()
            .find(|m| m.id == medicine_id)
            .ok_or_else(|| StoreError::NotFound {
                id: medicine_id.to_owned(),
            })?;

        let updated = schedule::record_dose_action(medicine, time_slot, taken, self.clock.now());
        debug!(user = %user_id, id = %medicine_id, slot = %time_slot, taken, "recording dose action");

        let history = serde_json::to_value(&updated.taken_history)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        if let Err(error) = self
            .store
            .update_field(user_id, medicine_id, "takenHistory", history)
            .await
        {
            warn!(id = %medicine_id, %error, "ledger update failed, rewriting document");
            self.store
                .replace_document(user_id, medicine_id, &updated)
                .await?;
        }
        Ok(updated)
    }

    /// Archives a medicine in place of deleting it.
    pub async fn archive_medicine(&self, user_id: &str, medicine_id: &str) -> Result<(), StoreError> {
        debug!(user = %user_id, id = %medicine_id, "archiving medicine");
        self.store.archive(user_id, medicine_id).await
    }

    /// (taken, total) recorded doses for one medicine, fetched fresh from
    /// the store.
    pub async fn adherence(
        &self,
        user_id: &str,
        medicine_id: &str,
    ) -> Result<(u32, u32), StoreError> {
        let medicine = self
            .store
            .get_medicine(user_id, medicine_id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                id: medicine_id.to_owned(),
            })?;
        Ok(medicine.adherence_counts())
    }

    /// Today's unified dose schedule for the user, from a fresh fetch.
    pub async fn today_schedule(&self, user_id: &str) -> Result<Vec<ScheduleEntry>, StoreError> {
        let medicines = self.store.list_medicines(user_id).await?;
        Ok(schedule::today_schedule(&medicines, self.clock.now()))
    }

    /// The user's medicines grouped by dose time, from a fresh fetch.
    pub async fn time_slot_groups(&self, user_id: &str) -> Result<Vec<TimeSlotGroup>, StoreError> {
        let medicines = self.store.list_medicines(user_id).await?;
        Ok(schedule::medicines_by_time_slot(&medicines))
    }
}
