//! Medicine entity — a prescribed medication schedule owned by one user.
//!
//! Holds the configured dose times, the validity window and the sparse
//! taken/skipped ledger, and exposes the pure derivations over them
//! (active state, days remaining, per-slot status, adherence). No I/O.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Per-medicine dose ledger: date key → time slot → taken (`true`) or
/// explicitly skipped (`false`). A missing date or slot key means no
/// action was recorded: the third state, never defaulted to `false`.
pub type TakenHistory = BTreeMap<String, BTreeMap<String, bool>>;

/// Recorded state of one dose slot on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TakenStatus {
    Taken,
    Skipped,
    Unrecorded,
}

impl TakenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Taken => "taken",
            Self::Skipped => "skipped",
            Self::Unrecorded => "unrecorded",
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_duration_days() -> i64 {
    7
}

fn default_now() -> DateTime<Utc> {
    Utc::now()
}

/// A prescribed medicine.
///
/// Serializes with the document field names used by the store
/// (`withFood`, `durationDays`, `startDate`, `createdAt`, `takenHistory`)
/// so existing records round-trip unchanged. Deserialization is lenient:
/// fields absent from older documents fall back to the same defaults the
/// mobile client applies when hand-parsing a document map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    /// Store-assigned document id; empty until created.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Dose slots in `HH:mm`, kept in storage order. Derived views
    /// re-sort by time of day.
    #[serde(default)]
    pub times: Vec<String>,
    #[serde(default = "default_true")]
    pub with_food: bool,
    /// Length of the course in days, counted from `start_date`.
    #[serde(default = "default_duration_days")]
    pub duration_days: i64,
    #[serde(default = "default_now")]
    pub start_date: DateTime<Utc>,
    /// Bookkeeping only; plays no part in scheduling.
    #[serde(default = "default_now")]
    pub created_at: DateTime<Utc>,
    /// `false` means manually archived, regardless of the date window.
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub taken_history: TakenHistory,
}

impl Medicine {
    /// A fresh prescription starting now, with an empty ledger. The id is
    /// left empty for the store to assign on creation.
    pub fn new(
        name: impl Into<String>,
        times: Vec<String>,
        with_food: bool,
        duration_days: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            times,
            with_food,
            duration_days,
            start_date: now,
            created_at: now,
            active: true,
            taken_history: TakenHistory::new(),
        }
    }

    /// Instant the course ends. The end instant itself still counts as
    /// within the course.
    pub fn end_instant(&self) -> DateTime<Utc> {
        self.start_date + Duration::days(self.duration_days)
    }

    /// Whether this medicine participates in scheduling at `now`.
    ///
    /// False when manually archived, when no dose times are configured,
    /// or when `now` is strictly past the end of the course.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.times.is_empty() && self.active && now <= self.end_instant()
    }

    /// Whole days left until the course ends, floored. Never negative.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        let end = self.end_instant();
        if now > end {
            0
        } else {
            (end - now).num_days()
        }
    }

    /// Ledger key for the calendar date of `instant`: `YYYY-M-D` with
    /// month and day NOT zero-padded. Existing documents were written
    /// with this exact shape; lookups are by string equality, so writer
    /// and reader must both come through here.
    pub fn date_key(instant: DateTime<Utc>) -> String {
        format!("{}-{}-{}", instant.year(), instant.month(), instant.day())
    }

    /// Recorded state of `time_slot` on the calendar day of `now`.
    pub fn taken_status(&self, time_slot: &str, now: DateTime<Utc>) -> TakenStatus {
        match self
            .taken_history
            .get(&Self::date_key(now))
            .and_then(|day| day.get(time_slot))
        {
            Some(true) => TakenStatus::Taken,
            Some(false) => TakenStatus::Skipped,
            None => TakenStatus::Unrecorded,
        }
    }

    /// (taken, total) counts over the whole ledger, every date and slot,
    /// with both taken and skipped counting as recorded. No window
    /// filtering; history past the active window is included.
    pub fn adherence_counts(&self) -> (u32, u32) {
        let mut taken = 0;
        let mut total = 0;
        for day in self.taken_history.values() {
            for &was_taken in day.values() {
                total += 1;
                if was_taken {
                    taken += 1;
                }
            }
        }
        (taken, total)
    }

    /// Fraction of recorded doses actually taken, in [0, 1]. A medicine
    /// with nothing recorded yet reads as fully adherent.
    pub fn adherence_rate(&self) -> f64 {
        let (taken, total) = self.adherence_counts();
        if total == 0 {
            1.0
        } else {
            f64::from(taken) / f64::from(total)
        }
    }
}
