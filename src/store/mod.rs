pub mod types;
pub mod backend;
pub mod reservations;

pub use types::{Reservation, ReservationDatabase, now_timestamp};
pub use backend::{BlobStorage, FileStorage, MemoryStorage};
pub use reservations::{ReservationStore, DEFAULT_STORAGE_KEY};
