use std::collections::BTreeMap;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A seat claimed within one time slot
///
/// Field names on disk are the Spanish ones used by existing export files, so
/// those files keep importing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(rename = "asiento", alias = "seat")]
    pub seat: String,
    #[serde(rename = "nombre", alias = "holderName", default)]
    pub holder_name: String,
    #[serde(rename = "dni", alias = "holderId", default)]
    pub holder_id: String,
    #[serde(rename = "created_at", alias = "createdAt", default)]
    pub created_at: String,
}

impl Reservation {
    pub fn new(seat: &str, holder_name: &str, holder_id: &str) -> Self {
        Reservation {
            seat: seat.to_string(),
            holder_name: holder_name.to_string(),
            holder_id: holder_id.to_string(),
            created_at: now_timestamp(),
        }
    }
}

/// slot id -> reservations in insertion order
pub type ReservationDatabase = BTreeMap<String, Vec<Reservation>>;

/// Current UTC time as an ISO-8601 string with millisecond precision
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_persisted_field_names() {
        let r = Reservation {
            seat: "A1".into(),
            holder_name: "Jane".into(),
            holder_id: "123".into(),
            created_at: "2024-05-01T08:00:00.000Z".into(),
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["asiento"], "A1");
        assert_eq!(json["nombre"], "Jane");
        assert_eq!(json["dni"], "123");
        assert_eq!(json["created_at"], "2024-05-01T08:00:00.000Z");
    }

    #[test]
    fn accepts_english_aliases_and_missing_holder_fields() {
        let r: Reservation = serde_json::from_str(r#"{"seat":"B2","createdAt":"x"}"#).unwrap();
        assert_eq!(r.seat, "B2");
        assert_eq!(r.holder_name, "");
        assert_eq!(r.holder_id, "");
        assert_eq!(r.created_at, "x");
    }

    #[test]
    fn timestamp_is_utc_with_millis() {
        let ts = now_timestamp();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2024-05-01T08:00:00.000Z".len());
    }
}
