use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of the underlying blob storage
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to remove {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
    #[error("failed to serialize reservations: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Expected outcomes of create/cancel that leave the data untouched
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("seat {seat} is already reserved for {slot}")]
    SeatAlreadyReserved { slot: String, seat: String },
    #[error("there are no reservations for {slot}")]
    SlotNotFound { slot: String },
    #[error("no reservation found for seat {seat} at {slot}")]
    ReservationNotFound { slot: String, seat: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid file: the JSON must be an object keyed by time slot")]
    InvalidFormat,
    #[error("could not read {path}: {source}")]
    FileRead { path: PathBuf, source: io::Error },
    #[error("could not parse import file as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write export to {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("could not write CSV export: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid time slot '{0}', expected HH:MM")]
    InvalidSlot(String),
    #[error("invalid value for {name}: '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("seat grid needs between 1 and 26 columns and at least one row")]
    InvalidGrid,
}
