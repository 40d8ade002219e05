use crate::controller::{SeatRowView, SeatState, SeatView};
use crate::store::Reservation;

/// Holder name for display, with a placeholder when none was given
pub fn format_holder(name: &str) -> String {
    if name.is_empty() {
        "(no name)".to_string()
    } else {
        name.to_string()
    }
}

/// One reservation as a list line: `A1 — Jane — ID: 123`
pub fn format_reservation(r: &Reservation) -> String {
    let id = if r.holder_id.is_empty() { "-" } else { r.holder_id.as_str() };
    format!("{} — {} — ID: {}", r.seat, format_holder(&r.holder_name), id)
}

fn format_seat(view: &SeatView) -> String {
    let mark = match view.state {
        SeatState::Free => ' ',
        SeatState::Occupied => 'x',
        SeatState::Selected => '*',
    };
    format!("[{:>3}{}]", view.seat, mark)
}

/// Renders the seat map with the aisle between the two halves of each row
pub fn render_seat_map(rows: &[SeatRowView]) -> String {
    let mut out = String::new();
    for row in rows {
        let left: Vec<String> = row.left.iter().map(format_seat).collect();
        let right: Vec<String> = row.right.iter().map(format_seat).collect();
        out.push_str(&left.join(" "));
        out.push_str("   ");
        out.push_str(&right.join(" "));
        out.push('\n');
    }
    out.push_str("[  x] occupied  [  *] selected\n");
    out
}

/// Renders the reservation list of a slot, or a hint when it is empty
pub fn render_reservations(slot: &str, list: &[Reservation]) -> String {
    if list.is_empty() {
        return format!("No reservations for {}.\n", slot);
    }
    let mut out = format!("Reservations for {} ({}):\n", slot, list.len());
    for r in list {
        out.push_str("  ");
        out.push_str(&format_reservation(r));
        out.push('\n');
    }
    out
}

/// Printed after an import finishes
pub fn import_summary(changes: usize) -> String {
    format!("Import finished. New reservations added: {}.", changes)
}
