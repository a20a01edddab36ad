use std::path::PathBuf;

use serde::Deserialize;

use crate::attendance::Session;
use crate::history::HistoryStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct OpenWorkspace {
    pub session: Session,
    pub history: Box<dyn HistoryStore>,
    pub export_dir: PathBuf,
}

#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub open: Option<OpenWorkspace>,
}
