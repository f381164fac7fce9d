//! Application state managed by Tauri.

use std::sync::Mutex;

use crate::db::RecordDb;

pub struct AppState {
    pub db: Mutex<Option<RecordDb>>,
}

impl AppState {
    pub fn new() -> Self {
        let db = match RecordDb::open() {
            Ok(db) => Some(db),
            Err(e) => {
                log::warn!("Failed to open records database: {e}. Record commands disabled.");
                None
            }
        };
        Self { db: Mutex::new(db) }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
