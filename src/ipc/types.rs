use std::path::PathBuf;

use crate::store::sqlite::SqliteStore;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<SqliteStore>,
    pub export_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(export_dir: Option<PathBuf>) -> Self {
        Self {
            workspace: None,
            store: None,
            export_dir,
        }
    }
}
