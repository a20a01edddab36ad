use crate::attendance::AttendanceRecord;
use crate::db;
use anyhow::Context;
use rusqlite::Connection;
use serde::Serialize;

pub const HISTORY_KEY: &str = "attendanceHistory";

/// Append-only store of saved records.
pub trait HistoryStore {
    fn load(&self) -> anyhow::Result<Vec<AttendanceRecord>>;
    fn append(&mut self, record: AttendanceRecord) -> anyhow::Result<usize>;
}

/// Whole history serialized as one JSON array under a fixed settings key.
/// Every append rewrites the array.
pub struct SettingsHistory {
    conn: Connection,
    cached: Vec<AttendanceRecord>,
}

impl SettingsHistory {
    pub fn open(conn: Connection) -> anyhow::Result<Self> {
        let cached = read_history(&conn)?;
        Ok(Self { conn, cached })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

pub fn read_history(conn: &Connection) -> anyhow::Result<Vec<AttendanceRecord>> {
    let raw = db::settings_get_raw(conn, HISTORY_KEY)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(text) => serde_json::from_str(text).context("stored attendance history is invalid"),
    }
}

impl HistoryStore for SettingsHistory {
    fn load(&self) -> anyhow::Result<Vec<AttendanceRecord>> {
        Ok(self.cached.clone())
    }

    /// The in-memory history grows before the write, so a failed write
    /// still leaves the record listed for this session.
    fn append(&mut self, record: AttendanceRecord) -> anyhow::Result<usize> {
        self.cached.push(record);
        let text = serde_json::to_string(&self.cached).context("failed to serialize history")?;
        db::settings_set_raw(&self.conn, HISTORY_KEY, &text)
            .context("failed to write attendance history")?;
        Ok(self.cached.len())
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryHistory {
    records: Vec<AttendanceRecord>,
}

#[cfg(test)]
impl HistoryStore for MemoryHistory {
    fn load(&self) -> anyhow::Result<Vec<AttendanceRecord>> {
        Ok(self.records.clone())
    }

    fn append(&mut self, record: AttendanceRecord) -> anyhow::Result<usize> {
        self.records.push(record);
        Ok(self.records.len())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub index: usize,
    pub date: String,
    pub present: usize,
    pub total: usize,
    pub summary: String,
}

pub fn summarize(records: &[AttendanceRecord]) -> Vec<HistorySummary> {
    records
        .iter()
        .enumerate()
        .map(|(index, r)| HistorySummary {
            index,
            date: r.date.clone(),
            present: r.present_count(),
            total: r.data.len(),
            summary: r.summary(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::Session;
    use crate::roster::Roster;

    fn memory_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        conn.execute(
            "CREATE TABLE workspace_settings(key TEXT PRIMARY KEY, value_json TEXT NOT NULL)",
            [],
        )
        .expect("create settings");
        conn
    }

    #[test]
    fn missing_key_loads_empty_history() {
        let store = SettingsHistory::open(memory_conn()).expect("open history");
        assert!(store.load().expect("load").is_empty());
    }

    #[test]
    fn same_date_appends_twice() {
        let session = Session::new(Roster::builtin(), "2024-01-10");
        let mut store = SettingsHistory::open(memory_conn()).expect("open history");
        assert_eq!(store.append(session.snapshot()).expect("append"), 1);
        assert_eq!(store.append(session.snapshot()).expect("append"), 2);

        let records = read_history(store.conn()).expect("re-read history");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], records[1]);
    }

    #[test]
    fn persisted_layout_uses_date_and_data() {
        let mut session = Session::new(Roster::builtin(), "2024-01-10");
        session.toggle(3);
        let mut store = SettingsHistory::open(memory_conn()).expect("open history");
        store.append(session.snapshot()).expect("append");

        let raw = db::settings_get_raw(store.conn(), HISTORY_KEY)
            .expect("read raw")
            .expect("history row");
        let v: serde_json::Value = serde_json::from_str(&raw).expect("parse raw");
        assert_eq!(v[0]["date"], "2024-01-10");
        assert_eq!(v[0]["data"].as_array().map(|a| a.len()), Some(8));
        assert_eq!(v[0]["data"][2]["Status"], "Present");
    }

    #[test]
    fn failed_write_keeps_record_in_session_history() {
        let session = Session::new(Roster::builtin(), "2024-01-10");
        let mut store = SettingsHistory::open(memory_conn()).expect("open history");
        store
            .conn()
            .execute("DROP TABLE workspace_settings", [])
            .expect("drop settings");

        assert!(store.append(session.snapshot()).is_err());
        let records = store.load().expect("load");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "2024-01-10");
    }

    #[test]
    fn corrupt_history_is_an_error() {
        let conn = memory_conn();
        db::settings_set_raw(&conn, HISTORY_KEY, "{not json").expect("write raw");
        assert!(SettingsHistory::open(conn).is_err());
    }

    #[test]
    fn summaries_count_present_entries() {
        let mut store = MemoryHistory::default();
        let mut session = Session::new(Roster::builtin(), "2024-01-10");
        store.append(session.snapshot()).expect("append");
        for id in [1, 2, 3] {
            session.toggle(id);
        }
        session.select_date("2024-01-11");
        store.append(session.snapshot()).expect("append");

        let rows = summarize(&store.load().expect("load"));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].summary, "0 / 8 Present");
        assert_eq!(rows[1].summary, "3 / 8 Present");
        assert_eq!(rows[1].date, "2024-01-11");
        assert_eq!(rows[1].index, 1);
    }
}
