use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use crate::error::ExportError;
use crate::seating::compare_seat_labels;
use crate::store::{BlobStorage, ReservationDatabase, ReservationStore};

/// Export file name: `reservas-<entity>-<YYYY-MM-DD-hh-mm-ss>.json`
pub fn export_file_name(entity: &str, now: DateTime<Utc>) -> String {
    format!("reservas-{}-{}.json", entity, now.format("%Y-%m-%d-%H-%M-%S"))
}

/// The persisted document byte for byte, or `{}` when nothing is stored.
///
/// No validation happens here: a blob that `load` would discard still exports as is.
pub fn export_blob<S: BlobStorage>(store: &ReservationStore<S>) -> String {
    store.raw_blob().unwrap_or_else(|| "{}".to_string())
}

/// Writes the export file into `dir` and returns its path
pub fn export_to_dir<S: BlobStorage>(
    store: &ReservationStore<S>,
    dir: &Path,
    entity: &str,
    now: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(export_file_name(entity, now));
    fs::write(&path, export_blob(store)).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Writes every reservation as a CSV row, slots in key order and seats by label
pub fn export_csv<W: Write>(db: &ReservationDatabase, writer: W) -> Result<(), ExportError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(["slot", "seat", "holder_name", "holder_id", "created_at"])?;

    for (slot, list) in db {
        let mut sorted: Vec<_> = list.iter().collect();
        sorted.sort_by(|a, b| compare_seat_labels(&a.seat, &b.seat));
        for r in sorted {
            wtr.write_record([slot, &r.seat, &r.holder_name, &r.holder_id, &r.created_at])?;
        }
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}
