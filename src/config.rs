use std::path::PathBuf;
use crate::error::ConfigError;
use crate::seating::{parse_slot_list, SeatGridConfig};
use crate::store::DEFAULT_STORAGE_KEY;

pub const DEFAULT_SLOTS: &str = "08:00,10:00,12:00,14:00,16:00,18:00";
pub const DEFAULT_ENTITY: &str = "estrella-tour";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub storage_key: String,
    /// Operator name used in export file names
    pub entity: String,
    /// Departures offered to the user, HH:MM, sorted
    pub slots: Vec<String>,
    pub grid: SeatGridConfig,
    pub admin_password: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from("data"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            entity: DEFAULT_ENTITY.to_string(),
            slots: DEFAULT_SLOTS.split(',').map(str::to_string).collect(),
            grid: SeatGridConfig::default(),
            admin_password: "admin123".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads RESERVAS_* and ADMIN_PASSWORD from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; unset variables keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(dir) = lookup("RESERVAS_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup("RESERVAS_STORAGE_KEY") {
            config.storage_key = key;
        }
        if let Some(entity) = lookup("RESERVAS_ENTITY") {
            config.entity = entity;
        }
        if let Some(slots) = lookup("RESERVAS_SLOTS") {
            config.slots = parse_slot_list(&slots).map_err(ConfigError::InvalidSlot)?;
        }
        if let Some(value) = lookup("RESERVAS_COLUMNS") {
            config.grid.columns = parse_number("RESERVAS_COLUMNS", value)?;
            config.grid.aisle_after = config.grid.columns / 2;
        }
        if let Some(value) = lookup("RESERVAS_ROWS") {
            config.grid.rows = parse_number("RESERVAS_ROWS", value)?;
        }
        if let Some(password) = lookup("ADMIN_PASSWORD") {
            config.admin_password = password;
        }

        let grid = config.grid;
        config.grid = SeatGridConfig::new(grid.columns, grid.rows, grid.aisle_after)?;
        Ok(config)
    }
}

fn parse_number(name: &'static str, value: String) -> Result<u8, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { name, value })
}
