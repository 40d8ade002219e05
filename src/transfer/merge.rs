use std::collections::HashSet;
use serde_json::{Map, Value};
use crate::error::ImportError;
use crate::store::{Reservation, ReservationDatabase};

/// Folds an untrusted import document into `db`.
///
/// Seats already present in a slot win over imported ones, and within the
/// import the first record for a seat wins. Returns how many reservations
/// were added. `now` stamps records that carry no creation time.
pub fn merge_import(db: &mut ReservationDatabase, incoming: &Value, now: &str) -> Result<usize, ImportError> {
    let Value::Object(slots) = incoming else {
        return Err(ImportError::InvalidFormat);
    };

    let mut changes = 0;
    for (slot, records) in slots {
        let Value::Array(records) = records else {
            continue;
        };

        let list = db.entry(slot.clone()).or_default();
        let mut occupied: HashSet<String> = list.iter().map(|r| r.seat.clone()).collect();

        for record in records {
            let Some(reservation) = reservation_from_value(record, now) else {
                continue;
            };
            if occupied.contains(&reservation.seat) {
                continue;
            }
            occupied.insert(reservation.seat.clone());
            list.push(reservation);
            changes += 1;
        }
    }

    Ok(changes)
}

/// Builds a reservation from a loosely typed record.
///
/// None for non-objects and for records whose seat is missing or blank.
/// `default_created_at` fills in a missing creation time.
pub(crate) fn reservation_from_value(record: &Value, default_created_at: &str) -> Option<Reservation> {
    let Value::Object(fields) = record else {
        return None;
    };
    let seat = field_text(fields, "asiento", "seat").trim().to_string();
    if seat.is_empty() {
        return None;
    }

    let created_at = field_text(fields, "created_at", "createdAt");
    Some(Reservation {
        seat,
        holder_name: field_text(fields, "nombre", "holderName"),
        holder_id: field_text(fields, "dni", "holderId"),
        created_at: if created_at.is_empty() { default_created_at.to_string() } else { created_at },
    })
}

/// Reads a field by its stored name, falling back to the English alias
fn field_text(fields: &Map<String, Value>, name: &str, alias: &str) -> String {
    let stored = coerce_text(fields.get(name));
    if !stored.is_empty() {
        return stored;
    }
    coerce_text(fields.get(alias))
}

/// String form of a loosely typed value; null, false, 0 and "" read as empty
fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(other) => other.to_string(),
    }
}
