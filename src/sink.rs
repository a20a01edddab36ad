use crate::attendance::{AttendanceRecord, Session};
use crate::export::{self, ExportSummary};
use crate::history::HistoryStore;
use std::path::Path;

pub const SAVED_MESSAGE: &str = "Attendance saved successfully!";

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("spreadsheet export failed: {0:#}")]
    Export(anyhow::Error),
    #[error("history persistence failed: {source:#}")]
    Persist {
        export: ExportSummary,
        source: anyhow::Error,
    },
}

#[derive(Debug)]
pub struct SaveOutcome {
    pub record: AttendanceRecord,
    pub export: ExportSummary,
    pub history_len: usize,
}

/// Export first, then append to history. Marks in `session` are left as they are.
pub fn save(
    session: &Session,
    store: &mut dyn HistoryStore,
    export_dir: &Path,
) -> Result<SaveOutcome, SaveError> {
    let record = session.snapshot();
    let export = export::export_workbook(&record, export_dir).map_err(SaveError::Export)?;
    tracing::debug!(path = %export.path.display(), bytes = export.bytes, "workbook written");

    let history_len = match store.append(record.clone()) {
        Ok(n) => n,
        Err(source) => return Err(SaveError::Persist { export, source }),
    };
    tracing::info!(date = %record.date, history_len, "attendance saved");

    Ok(SaveOutcome {
        record,
        export,
        history_len,
    })
}
