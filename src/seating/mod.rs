pub mod grid;
pub mod slots;

pub use grid::{all_seat_ids, compare_seat_labels, seat_id, SeatGridConfig};
pub use slots::parse_slot_list;
