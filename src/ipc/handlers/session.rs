use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::handlers::{get_required_i64, get_required_str, require_open};
use crate::ipc::types::{AppState, Request};
use crate::sink::{self, SaveError, SAVED_MESSAGE};
use serde_json::json;

fn roster_list(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let ws = require_open(state)?;
    Ok(json!({ "students": ws.session.roster().students() }))
}

fn session_get(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let ws = require_open(state)?;
    let session = &ws.session;
    let rows: Vec<serde_json::Value> = session
        .roster()
        .students()
        .iter()
        .map(|s| {
            json!({
                "rollNo": s.id,
                "name": s.name,
                "present": session.is_present(s.id),
            })
        })
        .collect();
    Ok(json!({
        "date": session.date(),
        "rows": rows,
        "presentCount": session.present_count(),
        "total": session.roster().len(),
    }))
}

fn session_select_date(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = get_required_str(params, "date")?;
    let ws = require_open(state)?;
    ws.session.select_date(date);
    Ok(json!({ "date": ws.session.date() }))
}

fn session_toggle(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_i64(params, "studentId")?;
    let ws = require_open(state)?;
    let Some(present) = ws.session.toggle(student_id) else {
        return Err(HandlerErr::new("not_found", "student not on roster")
            .with_details(json!({ "studentId": student_id })));
    };
    Ok(json!({ "studentId": student_id, "present": present }))
}

fn session_snapshot(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let ws = require_open(state)?;
    Ok(json!({ "record": ws.session.snapshot() }))
}

fn attendance_save(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let ws = require_open(state)?;
    let outcome = sink::save(&ws.session, ws.history.as_mut(), &ws.export_dir).map_err(|e| {
        let message = e.to_string();
        match e {
            SaveError::Export(_) => HandlerErr::new("export_failed", message),
            SaveError::Persist { export, .. } => HandlerErr::new("persist_failed", message)
                .with_details(json!({ "exportPath": export.path.to_string_lossy() })),
        }
    })?;
    Ok(json!({
        "message": SAVED_MESSAGE,
        "date": outcome.record.date,
        "exportPath": outcome.export.path.to_string_lossy(),
        "bytes": outcome.export.bytes,
        "sha256": outcome.export.sha256,
        "rowCount": outcome.export.row_count,
        "historyLength": outcome.history_len,
        "summary": outcome.record.summary(),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "roster.list" => roster_list(state),
        "session.get" => session_get(state),
        "session.selectDate" => session_select_date(state, &req.params),
        "session.toggle" => session_toggle(state, &req.params),
        "session.snapshot" => session_snapshot(state),
        "attendance.save" => attendance_save(state),
        _ => return None,
    };
    Some(respond(&req.id, res))
}
