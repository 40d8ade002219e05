pub mod merge;
pub mod import;
pub mod export;

pub use merge::merge_import;
pub use import::{import_file, import_str};
pub use export::{export_blob, export_csv, export_file_name, export_to_dir};
