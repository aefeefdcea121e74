//! Schedule aggregation — turns a snapshot of medicines into per-day views.
//!
//! Stateless with respect to persistence: every function takes the caller's
//! in-memory snapshot and the current instant, and returns a new value. The
//! take/skip mutation produces the updated medicine for the caller to
//! persist. Malformed dose-time strings are recovered locally (logged and
//! skipped) so one bad record never blanks out the whole schedule.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::Medicine;

/// Why a dose-time string failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DoseTimeError {
    #[error("blank time slot")]
    Blank,
    #[error("missing ':' separator in {0:?}")]
    MissingSeparator(String),
    #[error("non-numeric hour or minute in {0:?}")]
    NotNumeric(String),
}

/// A parsed `HH:mm` time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DoseTime {
    pub hour: u32,
    pub minute: u32,
}

impl DoseTime {
    /// Lenient `hour:minute` parse. Accepts extra `:`-separated parts
    /// beyond the first two and unpadded hours, matching what the stored
    /// slot strings have historically looked like.
    pub fn parse(slot: &str) -> Result<Self, DoseTimeError> {
        if slot.trim().is_empty() {
            return Err(DoseTimeError::Blank);
        }
        if !slot.contains(':') {
            return Err(DoseTimeError::MissingSeparator(slot.to_owned()));
        }
        let mut parts = slot.split(':');
        let (hour_part, minute_part) = match (parts.next(), parts.next()) {
            (Some(h), Some(m)) => (h, m),
            _ => return Err(DoseTimeError::MissingSeparator(slot.to_owned())),
        };
        let hour = hour_part
            .trim()
            .parse()
            .map_err(|_| DoseTimeError::NotNumeric(slot.to_owned()))?;
        let minute = minute_part
            .trim()
            .parse()
            .map_err(|_| DoseTimeError::NotNumeric(slot.to_owned()))?;
        Ok(Self { hour, minute })
    }

    pub fn minute_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }
}

/// One row of today's schedule: a dose time and whether it has already
/// arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub time_slot: String,
    pub is_past: bool,
}

/// Medicines sharing one raw dose-time string, for the detail list where
/// each row can be taken or skipped per medicine.
#[derive(Debug, Clone, Serialize)]
pub struct TimeSlotGroup {
    pub time_slot: String,
    pub medicines: Vec<Medicine>,
}

/// Today's unified dose schedule across all active medicines.
///
/// Slots are deduplicated by their raw string (two medicines sharing
/// "08:00" produce one row) and sorted ascending by time of day.
/// `is_past` compares hour and minute only; a slot equal to the current
/// time counts as past, its dose time having arrived. Inactive medicines
/// contribute nothing.
pub fn today_schedule(medicines: &[Medicine], now: DateTime<Utc>) -> Vec<ScheduleEntry> {
    let current = (now.hour(), now.minute());

    let mut entries: Vec<(DoseTime, ScheduleEntry)> = Vec::new();
    for medicine in medicines.iter().filter(|m| m.is_active(now)) {
        for slot in &medicine.times {
            let time = match DoseTime::parse(slot) {
                Ok(time) => time,
                Err(error) => {
                    warn!(medicine = %medicine.name, slot = %slot, %error, "skipping malformed dose time");
                    continue;
                }
            };
            if entries.iter().any(|(_, entry)| entry.time_slot == *slot) {
                continue;
            }
            let is_past = (time.hour, time.minute) <= current;
            entries.push((
                time,
                ScheduleEntry {
                    time_slot: slot.clone(),
                    is_past,
                },
            ));
        }
    }

    entries.sort_by_key(|(time, _)| time.minute_of_day());
    entries.into_iter().map(|(_, entry)| entry).collect()
}

/// Groups medicines by raw dose-time string, ordered by ascending time of
/// day. A medicine with several times appears under each of them.
///
/// Unlike [`today_schedule`] this applies no active filter: archived and
/// expired medicines keep their rows so their history stays browsable.
pub fn medicines_by_time_slot(medicines: &[Medicine]) -> Vec<TimeSlotGroup> {
    let mut groups: Vec<(DoseTime, TimeSlotGroup)> = Vec::new();
    for medicine in medicines {
        for slot in &medicine.times {
            let time = match DoseTime::parse(slot) {
                Ok(time) => time,
                Err(error) => {
                    warn!(medicine = %medicine.name, slot = %slot, %error, "skipping malformed dose time");
                    continue;
                }
            };
            match groups.iter_mut().find(|(_, group)| group.time_slot == *slot) {
                Some((_, group)) => group.medicines.push(medicine.clone()),
                None => groups.push((
                    time,
                    TimeSlotGroup {
                        time_slot: slot.clone(),
                        medicines: vec![medicine.clone()],
                    },
                )),
            }
        }
    }

    groups.sort_by_key(|(time, _)| time.minute_of_day());
    groups.into_iter().map(|(_, group)| group).collect()
}

/// Records a take/skip decision for one dose slot on the calendar day of
/// `now`, returning the updated medicine. Touches exactly one
/// `(date, slot)` ledger entry; idempotent, last write wins. The slot is
/// not validated against the medicine's configured times; any key the
/// caller hands in is accepted, as the stored ledgers already contain
/// such entries.
pub fn record_dose_action(
    medicine: &Medicine,
    time_slot: &str,
    taken: bool,
    now: DateTime<Utc>,
) -> Medicine {
    let mut updated = medicine.clone();
    updated
        .taken_history
        .entry(Medicine::date_key(now))
        .or_default()
        .insert(time_slot.to_owned(), taken);
    updated
}
