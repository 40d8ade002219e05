use log::{debug, warn};
use serde_json::Value;
use crate::error::{ReservationError, StorageError};
use super::backend::BlobStorage;
use super::types::{Reservation, ReservationDatabase};
use crate::transfer::merge::reservation_from_value;

/// Key the reservations document is stored under
pub const DEFAULT_STORAGE_KEY: &str = "reservas_estrella_tour_v1";

/// Reservations per time slot, persisted as one JSON document under one key.
///
/// Every mutation reads the whole document, changes a copy and writes the
/// whole document back.
#[derive(Debug)]
pub struct ReservationStore<S: BlobStorage> {
    storage: S,
    key: String,
}

impl<S: BlobStorage> ReservationStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        ReservationStore { storage, key: key.into() }
    }

    /// Reads the persisted database.
    ///
    /// Missing content, or content that is not a JSON object, is an empty
    /// database. Inside an object, slots whose value is not a list and entries
    /// without a seat are skipped; every other entry is kept.
    pub fn load(&self) -> ReservationDatabase {
        let Some(text) = self.storage.get(&self.key) else {
            return ReservationDatabase::new();
        };
        parse_database(&text).unwrap_or_else(|| {
            warn!("stored reservations under '{}' are malformed; using an empty database", self.key);
            ReservationDatabase::new()
        })
    }

    /// Replaces the persisted document with `db`
    pub fn save(&mut self, db: &ReservationDatabase) -> Result<(), StorageError> {
        let text = serde_json::to_string(db)?;
        self.storage.set(&self.key, &text)?;
        debug!("saved {} slot(s) under '{}'", db.len(), self.key);
        Ok(())
    }

    /// The persisted text exactly as stored, even if `load` would reject it
    pub fn raw_blob(&self) -> Option<String> {
        self.storage.get(&self.key)
    }

    pub fn list_for_slot(&self, slot: &str) -> Vec<Reservation> {
        self.load().remove(slot).unwrap_or_default()
    }

    pub fn is_seat_taken(&self, slot: &str, seat: &str) -> bool {
        self.list_for_slot(slot).iter().any(|r| r.seat == seat)
    }

    pub fn find(&self, slot: &str, seat: &str) -> Option<Reservation> {
        self.list_for_slot(slot).into_iter().find(|r| r.seat == seat)
    }

    /// Claims `seat` in `slot`, stamped with the current time
    pub fn create(
        &mut self,
        slot: &str,
        seat: &str,
        holder_name: Option<&str>,
        holder_id: Option<&str>,
    ) -> Result<Reservation, ReservationError> {
        let mut db = self.load();
        let list = db.entry(slot.to_string()).or_default();
        if list.iter().any(|r| r.seat == seat) {
            return Err(ReservationError::SeatAlreadyReserved {
                slot: slot.to_string(),
                seat: seat.to_string(),
            });
        }

        let reservation = Reservation::new(seat, holder_name.unwrap_or(""), holder_id.unwrap_or(""));
        list.push(reservation.clone());
        self.save(&db)?;
        Ok(reservation)
    }

    /// Frees `seat` in `slot`, removing every entry for it
    pub fn cancel(&mut self, slot: &str, seat: &str) -> Result<(), ReservationError> {
        let mut db = self.load();
        let Some(list) = db.get_mut(slot) else {
            return Err(ReservationError::SlotNotFound { slot: slot.to_string() });
        };

        let before = list.len();
        list.retain(|r| r.seat != seat);
        if list.len() == before {
            return Err(ReservationError::ReservationNotFound {
                slot: slot.to_string(),
                seat: seat.to_string(),
            });
        }

        self.save(&db)?;
        Ok(())
    }

    /// Erases the whole persisted document
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.storage.remove(&self.key)?;
        debug!("removed all reservations under '{}'", self.key);
        Ok(())
    }

    /// (slot, reservation count) for every slot present in the document
    pub fn slot_summaries(&self) -> Vec<(String, usize)> {
        self.load()
            .into_iter()
            .map(|(slot, list)| (slot, list.len()))
            .collect()
    }
}

/// Parses a stored document; None when it is not a JSON object
fn parse_database(text: &str) -> Option<ReservationDatabase> {
    let Value::Object(slots) = serde_json::from_str::<Value>(text).ok()? else {
        return None;
    };

    let mut db = ReservationDatabase::new();
    for (slot, entries) in slots {
        let Value::Array(entries) = entries else {
            warn!("skipping stored slot '{}': not a list", slot);
            continue;
        };
        let list = entries
            .iter()
            .filter_map(|entry| reservation_from_value(entry, ""))
            .collect();
        db.insert(slot, list);
    }
    Some(db)
}
