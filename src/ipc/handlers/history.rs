use crate::history::summarize;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::handlers::{get_required_i64, require_open};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn history_list(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let ws = require_open(state)?;
    let records = ws
        .history
        .load()
        .map_err(|e| HandlerErr::new("history_corrupt", format!("{e:#}")))?;
    Ok(json!({ "records": summarize(&records) }))
}

fn history_get(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let index = get_required_i64(params, "index")?;
    let ws = require_open(state)?;
    let records = ws
        .history
        .load()
        .map_err(|e| HandlerErr::new("history_corrupt", format!("{e:#}")))?;
    let record = usize::try_from(index)
        .ok()
        .and_then(|i| records.get(i))
        .ok_or_else(|| {
            HandlerErr::new("not_found", "history record not found")
                .with_details(json!({ "index": index, "historyLength": records.len() }))
        })?;
    Ok(json!({ "record": record }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "history.list" => history_list(state),
        "history.get" => history_get(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, res))
}
