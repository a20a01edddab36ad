pub mod core;
pub mod history;
pub mod session;

use crate::ipc::error::HandlerErr;
use crate::ipc::types::{AppState, OpenWorkspace};

pub(crate) fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::new("bad_params", format!("missing {}", key)))
}

pub(crate) fn get_optional_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

pub(crate) fn get_required_i64(params: &serde_json::Value, key: &str) -> Result<i64, HandlerErr> {
    let Some(v) = params.get(key) else {
        return Err(HandlerErr::new("bad_params", format!("missing {}", key)));
    };
    v.as_i64()
        .ok_or_else(|| HandlerErr::new("bad_params", format!("{} must be an integer", key)))
}

pub(crate) fn require_open(state: &mut AppState) -> Result<&mut OpenWorkspace, HandlerErr> {
    state
        .open
        .as_mut()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}
