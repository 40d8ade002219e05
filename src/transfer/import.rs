use std::fs;
use std::path::Path;
use log::info;
use serde_json::Value;
use crate::error::ImportError;
use crate::store::{now_timestamp, BlobStorage, ReservationStore};
use super::merge::merge_import;

/// Merges an import document given as text and persists the result in one write
pub fn import_str<S: BlobStorage>(store: &mut ReservationStore<S>, text: &str) -> Result<usize, ImportError> {
    let incoming: Value = serde_json::from_str(text)?;

    let mut db = store.load();
    let changes = merge_import(&mut db, &incoming, &now_timestamp())?;
    store.save(&db)?;

    info!("import merged {} new reservation(s)", changes);
    Ok(changes)
}

/// Reads `path` and merges it; the store is untouched if reading or parsing fails
pub fn import_file<S: BlobStorage>(store: &mut ReservationStore<S>, path: &Path) -> Result<usize, ImportError> {
    let text = fs::read_to_string(path).map_err(|source| ImportError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    import_str(store, &text)
}
