use std::cmp::Ordering;
use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};
use crate::error::ConfigError;

/// Most columns a grid can have: one per letter A-Z
pub const MAX_COLUMNS: u8 = 26;

/// Shape of the bus: lettered columns, numbered rows, one aisle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatGridConfig {
    pub columns: u8,
    pub rows: u8,
    /// Number of columns left of the aisle
    pub aisle_after: u8,
}

impl Default for SeatGridConfig {
    /// 2 + aisle + 2, 12 rows
    fn default() -> Self {
        SeatGridConfig { columns: 4, rows: 12, aisle_after: 2 }
    }
}

impl SeatGridConfig {
    pub fn new(columns: u8, rows: u8, aisle_after: u8) -> Result<Self, ConfigError> {
        if columns == 0 || columns > MAX_COLUMNS || rows == 0 {
            return Err(ConfigError::InvalidGrid);
        }
        Ok(SeatGridConfig { columns, rows, aisle_after: aisle_after.min(columns) })
    }

    /// Column letters; anything past Z is ignored
    pub fn column_letters(&self) -> Vec<char> {
        (0..self.columns.min(MAX_COLUMNS)).map(|i| (b'A' + i) as char).collect()
    }

    pub fn seat_count(&self) -> usize {
        self.column_letters().len() * self.rows as usize
    }

    pub fn contains(&self, seat: &str) -> bool {
        let mut chars = seat.chars();
        let Some(column) = chars.next() else {
            return false;
        };
        let row = chars.as_str();
        // reject "A01" and "A+1", which parse but never appear on the grid
        if row.starts_with('0') || !row.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        let Ok(row) = row.parse::<u8>() else {
            return false;
        };
        self.column_letters().contains(&column) && (1..=self.rows).contains(&row)
    }

    /// Seat ids row by row, each row split at the aisle into (left, right)
    pub fn layout(&self) -> Vec<(Vec<String>, Vec<String>)> {
        let letters = self.column_letters();
        let split = (self.aisle_after as usize).min(letters.len());
        (1..=self.rows)
            .map(|row| {
                let ids: Vec<String> = letters.iter().map(|c| seat_id(*c, row)).collect();
                let right = ids[split..].to_vec();
                let mut left = ids;
                left.truncate(split);
                (left, right)
            })
            .collect()
    }
}

pub fn seat_id(column: char, row: u8) -> String {
    format!("{}{}", column, row)
}

/// Orders seat labels the way a browser's `localeCompare` does for ASCII
/// labels: letters compare case-insensitively, lowercase first on a tie.
pub fn compare_seat_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Every seat id the grid defines
pub fn all_seat_ids(config: &SeatGridConfig) -> BTreeSet<String> {
    config
        .column_letters()
        .into_iter()
        .flat_map(|c| (1..=config.rows).map(move |row| seat_id(c, row)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_has_48_seats() {
        let config = SeatGridConfig::default();
        let ids = all_seat_ids(&config);
        assert_eq!(ids.len(), 48);
        assert_eq!(config.seat_count(), 48);
        assert!(ids.contains("A1"));
        assert!(ids.contains("D12"));
        assert!(!ids.contains("E1"));
        assert!(!ids.contains("A13"));
    }

    #[test]
    fn grid_size_follows_config() {
        let config = SeatGridConfig { columns: 3, rows: 2, aisle_after: 1 };
        let ids: Vec<_> = all_seat_ids(&config).into_iter().collect();
        assert_eq!(ids, vec!["A1", "A2", "B1", "B2", "C1", "C2"]);
    }

    #[test]
    fn layout_splits_rows_at_the_aisle() {
        let layout = SeatGridConfig::default().layout();
        assert_eq!(layout.len(), 12);
        assert_eq!(layout[0].0, vec!["A1", "B1"]);
        assert_eq!(layout[0].1, vec!["C1", "D1"]);
        assert_eq!(layout[11].1, vec!["C12", "D12"]);
    }

    #[test]
    fn checked_constructor_rejects_impossible_grids() {
        assert!(matches!(SeatGridConfig::new(27, 12, 2), Err(ConfigError::InvalidGrid)));
        assert!(matches!(SeatGridConfig::new(0, 12, 2), Err(ConfigError::InvalidGrid)));
        assert!(matches!(SeatGridConfig::new(4, 0, 2), Err(ConfigError::InvalidGrid)));
        assert_eq!(SeatGridConfig::new(4, 12, 2).unwrap(), SeatGridConfig::default());
        assert_eq!(SeatGridConfig::new(2, 1, 5).unwrap().aisle_after, 2);
    }

    #[test]
    fn oversized_literal_grid_stops_at_z() {
        let config = SeatGridConfig { columns: 200, rows: 1, aisle_after: 1 };
        assert_eq!(config.column_letters().len(), 26);
        assert_eq!(config.seat_count(), 26);
        assert!(all_seat_ids(&config).contains("Z1"));
    }

    #[test]
    fn labels_sort_like_locale_compare() {
        let mut seats = vec!["B1", "a1", "A10", "A2", "A1"];
        seats.sort_by(|a, b| compare_seat_labels(a, b));
        assert_eq!(seats, vec!["a1", "A1", "A10", "A2", "B1"]);
    }

    #[test]
    fn contains_checks_column_and_row() {
        let config = SeatGridConfig::default();
        assert!(config.contains("C7"));
        assert!(!config.contains("C0"));
        assert!(!config.contains("C07"));
        assert!(!config.contains("c7"));
        assert!(!config.contains("Z1"));
        assert!(!config.contains(""));
        assert!(!config.contains("A"));
    }
}
