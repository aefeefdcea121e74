//! Remedi — medicine scheduling and adherence core.
//!
//! The crate turns a user's prescribed medicines (dosing times, validity
//! window, per-day taken/skipped ledger) into actionable views: today's
//! deduplicated dose schedule, medicines grouped by time slot, and
//! adherence statistics. All derivations are pure functions over an
//! immutable snapshot; the surrounding app fetches and persists records
//! through the [`store::MedicineStore`] trait and reacts to the values
//! returned here.

pub mod clock;
pub mod config;
pub mod medicines;
pub mod models;
pub mod schedule;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use medicines::MedicineService;
pub use models::{Medicine, TakenStatus};
pub use schedule::{ScheduleEntry, TimeSlotGroup};
pub use store::{MedicineStore, StoreError};
