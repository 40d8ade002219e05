use std::path::{Path, PathBuf};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use crate::config::AppConfig;
use crate::display::format_holder;
use crate::error::{ExportError, ImportError, ReservationError, StorageError};
use crate::seating::{compare_seat_labels, SeatGridConfig};
use crate::store::{BlobStorage, Reservation, ReservationStore};
use crate::transfer;

/// Asks the user a yes/no question before a destructive action
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("choose a time slot first")]
    NoSlotSelected,
    #[error("choose a time slot and a seat")]
    NoSeatSelected,
    #[error("seat {0} does not exist on this bus")]
    UnknownSeat(String),
    #[error("seat {0} is already taken")]
    SeatOccupied(String),
    #[error("seat {0} is free")]
    SeatFree(String),
    #[error(transparent)]
    Reservation(#[from] ReservationError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatState {
    Free,
    Occupied,
    Selected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatView {
    pub seat: String,
    pub state: SeatState,
}

/// One row of the seat map, split at the aisle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatRowView {
    pub left: Vec<SeatView>,
    pub right: Vec<SeatView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Declined,
}

/// Drives the seat map and reservation list for one user session
pub struct Controller<S: BlobStorage> {
    store: ReservationStore<S>,
    grid: SeatGridConfig,
    slots: Vec<String>,
    entity: String,
    selected_slot: Option<String>,
    selected_seat: Option<String>,
}

impl<S: BlobStorage> Controller<S> {
    pub fn new(store: ReservationStore<S>, config: &AppConfig) -> Self {
        Controller {
            store,
            grid: config.grid,
            slots: config.slots.clone(),
            entity: config.entity.clone(),
            selected_slot: None,
            selected_seat: None,
        }
    }

    pub fn store(&self) -> &ReservationStore<S> {
        &self.store
    }

    pub fn grid(&self) -> &SeatGridConfig {
        &self.grid
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn selected_seat(&self) -> Option<&str> {
        self.selected_seat.as_deref()
    }

    /// Switching slots drops any seat selection
    pub fn select_slot(&mut self, slot: &str) {
        self.selected_slot = Some(slot.to_string());
        self.selected_seat = None;
    }

    pub fn select_seat(&mut self, seat: &str) -> Result<(), ControllerError> {
        let slot = self.selected_slot.as_deref().ok_or(ControllerError::NoSlotSelected)?;
        if !self.grid.contains(seat) {
            return Err(ControllerError::UnknownSeat(seat.to_string()));
        }
        if self.store.is_seat_taken(slot, seat) {
            return Err(ControllerError::SeatOccupied(seat.to_string()));
        }
        self.selected_seat = Some(seat.to_string());
        Ok(())
    }

    /// Seat map of the selected slot; all seats free when none is selected
    pub fn seat_map(&self) -> Vec<SeatRowView> {
        match self.selected_slot.as_deref() {
            Some(slot) => self.seat_map_for(slot, self.selected_seat.as_deref()),
            None => self.grid_with(|_| SeatState::Free),
        }
    }

    pub fn seat_map_for(&self, slot: &str, selected: Option<&str>) -> Vec<SeatRowView> {
        let taken: Vec<String> = self.store.list_for_slot(slot).into_iter().map(|r| r.seat).collect();
        self.grid_with(|seat| {
            if taken.iter().any(|t| t == seat) {
                SeatState::Occupied
            } else if selected == Some(seat) {
                SeatState::Selected
            } else {
                SeatState::Free
            }
        })
    }

    fn grid_with(&self, state: impl Fn(&str) -> SeatState) -> Vec<SeatRowView> {
        let view = |ids: Vec<String>| -> Vec<SeatView> {
            ids.into_iter()
                .map(|seat| SeatView { state: state(seat.as_str()), seat })
                .collect()
        };
        self.grid
            .layout()
            .into_iter()
            .map(|(left, right)| SeatRowView { left: view(left), right: view(right) })
            .collect()
    }

    /// Reservations of the selected slot ordered by seat label
    pub fn reservations(&self) -> Result<Vec<Reservation>, ControllerError> {
        let slot = self.selected_slot.as_deref().ok_or(ControllerError::NoSlotSelected)?;
        Ok(self.reservations_for(slot))
    }

    pub fn reservations_for(&self, slot: &str) -> Vec<Reservation> {
        let mut list = self.store.list_for_slot(slot);
        list.sort_by(|a, b| compare_seat_labels(&a.seat, &b.seat));
        list
    }

    /// Books the selected seat. The seat selection is cleared whatever the result.
    pub fn reserve(&mut self, holder_name: &str, holder_id: &str) -> Result<Reservation, ControllerError> {
        let (Some(slot), Some(seat)) = (self.selected_slot.clone(), self.selected_seat.take()) else {
            return Err(ControllerError::NoSeatSelected);
        };
        self.reserve_seat(&slot, &seat, holder_name, holder_id)
    }

    /// Books `seat` in `slot` with trimmed holder details
    pub fn reserve_seat(
        &mut self,
        slot: &str,
        seat: &str,
        holder_name: &str,
        holder_id: &str,
    ) -> Result<Reservation, ControllerError> {
        if !self.grid.contains(seat) {
            return Err(ControllerError::UnknownSeat(seat.to_string()));
        }
        let reservation = self
            .store
            .create(slot, seat, Some(holder_name.trim()), Some(holder_id.trim()))?;
        Ok(reservation)
    }

    /// Who holds an occupied seat in the selected slot
    pub fn inspect(&self, seat: &str) -> Result<Reservation, ControllerError> {
        let slot = self.selected_slot.as_deref().ok_or(ControllerError::NoSlotSelected)?;
        self.inspect_in(slot, seat)
    }

    pub fn inspect_in(&self, slot: &str, seat: &str) -> Result<Reservation, ControllerError> {
        self.store
            .find(slot, seat)
            .ok_or_else(|| ControllerError::SeatFree(seat.to_string()))
    }

    /// Cancels a reservation in the selected slot after the user confirms
    pub fn cancel(&mut self, seat: &str, confirm: &mut impl Confirm) -> Result<Outcome, ControllerError> {
        let slot = self.selected_slot.clone().ok_or(ControllerError::NoSlotSelected)?;
        self.cancel_in(&slot, seat, confirm)
    }

    pub fn cancel_in(&mut self, slot: &str, seat: &str, confirm: &mut impl Confirm) -> Result<Outcome, ControllerError> {
        let prompt = match self.store.find(slot, seat) {
            Some(r) => format!(
                "Seat {} is reserved by {} (ID: {}). Cancel this reservation?",
                r.seat,
                format_holder(&r.holder_name),
                if r.holder_id.is_empty() { "-" } else { r.holder_id.as_str() }
            ),
            None => format!("Cancel the reservation for seat {}?", seat),
        };
        if !confirm.confirm(&prompt) {
            return Ok(Outcome::Declined);
        }
        self.store.cancel(slot, seat)?;
        Ok(Outcome::Done)
    }

    pub fn import_str(&mut self, text: &str) -> Result<usize, ControllerError> {
        self.selected_seat = None;
        Ok(transfer::import_str(&mut self.store, text)?)
    }

    pub fn import_file(&mut self, path: &Path) -> Result<usize, ControllerError> {
        self.selected_seat = None;
        Ok(transfer::import_file(&mut self.store, path)?)
    }

    pub fn export_blob(&self) -> String {
        transfer::export_blob(&self.store)
    }

    pub fn export_file_name(&self) -> String {
        transfer::export_file_name(&self.entity, Utc::now())
    }

    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf, ControllerError> {
        Ok(transfer::export_to_dir(&self.store, dir, &self.entity, Utc::now())?)
    }

    /// Erases every reservation in every slot after the user confirms
    pub fn reset_all(&mut self, confirm: &mut impl Confirm) -> Result<Outcome, ControllerError> {
        if !confirm.confirm("This will delete ALL reservations. Are you sure?") {
            return Ok(Outcome::Declined);
        }
        self.store.reset()?;
        self.selected_seat = None;
        Ok(Outcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;

    fn controller() -> Controller<MemoryStorage> {
        Controller::new(ReservationStore::new(MemoryStorage::new()), &AppConfig::default())
    }

    fn state_of(map: &[SeatRowView], seat: &str) -> SeatState {
        map.iter()
            .flat_map(|row| row.left.iter().chain(row.right.iter()))
            .find(|v| v.seat == seat)
            .map(|v| v.state)
            .unwrap()
    }

    #[test]
    fn reserve_requires_slot_and_seat() {
        let mut c = controller();
        assert!(matches!(c.select_seat("A1"), Err(ControllerError::NoSlotSelected)));
        c.select_slot("08:00");
        assert!(matches!(c.reserve("Jane", "1"), Err(ControllerError::NoSeatSelected)));
    }

    #[test]
    fn reserve_trims_holder_and_clears_selection() {
        let mut c = controller();
        c.select_slot("08:00");
        c.select_seat("B3").unwrap();
        assert_eq!(state_of(&c.seat_map(), "B3"), SeatState::Selected);

        let r = c.reserve("  Jane  ", " 123 ").unwrap();
        assert_eq!(r.holder_name, "Jane");
        assert_eq!(r.holder_id, "123");
        assert_eq!(c.selected_seat(), None);
        assert_eq!(state_of(&c.seat_map(), "B3"), SeatState::Occupied);
        assert!(matches!(c.select_seat("B3"), Err(ControllerError::SeatOccupied(_))));
    }

    #[test]
    fn unknown_seats_are_rejected() {
        let mut c = controller();
        c.select_slot("08:00");
        assert!(matches!(c.select_seat("E1"), Err(ControllerError::UnknownSeat(_))));
        assert!(matches!(c.reserve_seat("08:00", "A13", "", ""), Err(ControllerError::UnknownSeat(_))));
    }

    #[test]
    fn changing_slot_clears_seat_and_shows_that_slot() {
        let mut c = controller();
        c.reserve_seat("08:00", "A1", "Jane", "").unwrap();
        c.select_slot("08:00");
        c.select_seat("A2").unwrap();
        c.select_slot("10:00");
        assert_eq!(c.selected_seat(), None);
        assert_eq!(state_of(&c.seat_map(), "A1"), SeatState::Free);
    }

    #[test]
    fn reservations_are_sorted_by_label() {
        let mut c = controller();
        for seat in ["B1", "A2", "A10"] {
            c.reserve_seat("08:00", seat, "", "").unwrap();
        }
        c.select_slot("08:00");
        let seats: Vec<_> = c.reservations().unwrap().into_iter().map(|r| r.seat).collect();
        assert_eq!(seats, vec!["A10", "A2", "B1"]);
    }

    #[test]
    fn cancel_asks_first_and_names_the_holder() {
        let mut c = controller();
        c.reserve_seat("08:00", "C4", "Jane", "123").unwrap();
        c.select_slot("08:00");

        let mut asked = Vec::new();
        let mut decline = |prompt: &str| {
            asked.push(prompt.to_string());
            false
        };
        assert_eq!(c.cancel("C4", &mut decline).unwrap(), Outcome::Declined);
        assert!(asked[0].contains("Jane"));
        assert!(asked[0].contains("123"));
        assert!(c.store().is_seat_taken("08:00", "C4"));

        assert_eq!(c.cancel("C4", &mut |_: &str| true).unwrap(), Outcome::Done);
        assert!(!c.store().is_seat_taken("08:00", "C4"));
    }

    #[test]
    fn cancel_of_missing_reservation_reports_store_error() {
        let mut c = controller();
        c.select_slot("08:00");
        let err = c.cancel("B5", &mut |_: &str| true).unwrap_err();
        assert!(matches!(err, ControllerError::Reservation(ReservationError::SlotNotFound { .. })));
    }

    #[test]
    fn inspect_reports_free_seats() {
        let mut c = controller();
        c.reserve_seat("08:00", "A1", "Jane", "").unwrap();
        c.select_slot("08:00");
        assert_eq!(c.inspect("A1").unwrap().holder_name, "Jane");
        assert!(matches!(c.inspect("A2"), Err(ControllerError::SeatFree(_))));
    }

    #[test]
    fn reset_needs_confirmation() {
        let mut c = controller();
        c.reserve_seat("08:00", "A1", "", "").unwrap();
        assert_eq!(c.reset_all(&mut |_: &str| false).unwrap(), Outcome::Declined);
        assert!(c.store().is_seat_taken("08:00", "A1"));
        assert_eq!(c.reset_all(&mut |_: &str| true).unwrap(), Outcome::Done);
        assert_eq!(c.store().raw_blob(), None);
    }

    #[test]
    fn import_through_controller_counts_changes() {
        let mut c = controller();
        let doc = r#"{"08:00":[{"asiento":"A1","nombre":"X"},{"asiento":"A2"}]}"#;
        assert_eq!(c.import_str(doc).unwrap(), 2);
        assert_eq!(c.import_str(doc).unwrap(), 0);
        assert!(matches!(c.import_str("[1,2,3]"), Err(ControllerError::Import(ImportError::InvalidFormat))));
    }
}
