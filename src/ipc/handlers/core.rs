use crate::attendance::{self, Session};
use crate::db;
use crate::history::{HistoryStore, SettingsHistory};
use crate::ipc::error::{ok, respond, HandlerErr};
use crate::ipc::handlers::{get_optional_str, get_required_str};
use crate::ipc::types::{AppState, OpenWorkspace, Request};
use crate::roster;
use serde_json::json;
use std::path::{Path, PathBuf};

pub const EXPORT_DIR_KEY: &str = "export.dir";
const DEFAULT_EXPORT_SUBDIR: &str = "exports";

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn workspace_select(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let path = PathBuf::from(get_required_str(params, "path")?);

    let conn = db::open_db(&path)
        .map_err(|e| HandlerErr::new("db_open_failed", format!("{e:#}")))?;

    let roster_path =
        get_optional_str(params, "rosterPath").map(|p| within_workspace(&path, &p));
    let roster = roster::resolve_roster(&path, roster_path.as_deref())
        .map_err(|e| HandlerErr::new("roster_invalid", format!("{e:#}")))?;

    let history = SettingsHistory::open(conn)
        .map_err(|e| HandlerErr::new("history_corrupt", format!("{e:#}")))?;
    let history_len = history
        .load()
        .map_err(|e| HandlerErr::new("history_corrupt", format!("{e:#}")))?
        .len();

    // Stored as given; relative values stay relative to the workspace.
    let export_dir = match get_optional_str(params, "exportDir") {
        Some(dir) => {
            db::settings_set_json(history.conn(), EXPORT_DIR_KEY, &json!(dir))
                .map_err(|e| HandlerErr::new("db_query_failed", format!("{e:#}")))?;
            within_workspace(&path, &dir)
        }
        None => remembered_export_dir(history.conn(), &path)?,
    };

    let session = Session::new(roster, attendance::today());
    let result = json!({
        "workspacePath": path.to_string_lossy(),
        "rosterSize": session.roster().len(),
        "historyLength": history_len,
        "date": session.date(),
        "exportDir": export_dir.to_string_lossy(),
    });
    tracing::info!(
        workspace = %path.display(),
        roster = session.roster().len(),
        history = history_len,
        "workspace opened"
    );

    state.workspace = Some(path);
    state.open = Some(OpenWorkspace {
        session,
        history: Box::new(history),
        export_dir,
    });
    Ok(result)
}

fn remembered_export_dir(conn: &rusqlite::Connection, workspace: &Path) -> Result<PathBuf, HandlerErr> {
    let stored = db::settings_get_json(conn, EXPORT_DIR_KEY)
        .map_err(|e| HandlerErr::new("db_query_failed", format!("{e:#}")))?;
    Ok(stored
        .as_ref()
        .and_then(|v| v.as_str())
        .map(|dir| within_workspace(workspace, dir))
        .unwrap_or_else(|| workspace.join(DEFAULT_EXPORT_SUBDIR)))
}

fn within_workspace(workspace: &Path, p: &str) -> PathBuf {
    let p = Path::new(p);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        workspace.join(p)
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(respond(&req.id, workspace_select(state, &req.params))),
        _ => None,
    }
}
