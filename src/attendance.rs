use crate::roster::Roster;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn from_mark(present: bool) -> Self {
        if present {
            AttendanceStatus::Present
        } else {
            AttendanceStatus::Absent
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }
}

/// One row of a saved record. Field names match the persisted history and
/// the spreadsheet header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    #[serde(rename = "RollNo")]
    pub roll_no: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Status")]
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub date: String,
    pub data: Vec<AttendanceEntry>,
}

impl AttendanceRecord {
    pub fn present_count(&self) -> usize {
        self.data
            .iter()
            .filter(|e| e.status == AttendanceStatus::Present)
            .count()
    }

    pub fn summary(&self) -> String {
        format!("{} / {} Present", self.present_count(), self.data.len())
    }
}

pub fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// In-progress marks for one sitting. Marks are keyed by student only, so
/// they survive date changes and saves.
#[derive(Debug, Clone)]
pub struct Session {
    roster: Roster,
    date: String,
    marks: HashMap<i64, bool>,
}

impl Session {
    pub fn new(roster: Roster, date: impl Into<String>) -> Self {
        let marks = roster.students().iter().map(|s| (s.id, false)).collect();
        Self {
            roster,
            date: date.into(),
            marks,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn select_date(&mut self, new_date: impl Into<String>) {
        self.date = new_date.into();
    }

    /// Returns the new mark, or `None` when the id is not on the roster.
    pub fn toggle(&mut self, student_id: i64) -> Option<bool> {
        let mark = self.marks.get_mut(&student_id)?;
        *mark = !*mark;
        Some(*mark)
    }

    pub fn is_present(&self, student_id: i64) -> bool {
        self.marks.get(&student_id).copied().unwrap_or(false)
    }

    pub fn present_count(&self) -> usize {
        self.marks.values().filter(|v| **v).count()
    }

    pub fn snapshot(&self) -> AttendanceRecord {
        AttendanceRecord {
            date: self.date.clone(),
            data: self
                .roster
                .students()
                .iter()
                .map(|s| AttendanceEntry {
                    roll_no: s.id,
                    name: s.name.clone(),
                    status: AttendanceStatus::from_mark(self.is_present(s.id)),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Student;

    fn roster_of(n: i64) -> Roster {
        Roster::new(
            (0..n)
                .map(|i| Student {
                    id: 100 - i,
                    name: format!("Student {}", i),
                })
                .collect(),
        )
        .expect("roster")
    }

    #[test]
    fn snapshot_covers_every_student_in_roster_order() {
        for n in [0, 1, 5, 40] {
            let mut s = Session::new(roster_of(n), "2024-01-10");
            if n > 1 {
                s.toggle(99);
            }
            let rec = s.snapshot();
            assert_eq!(rec.data.len(), n as usize);
            let ids: Vec<i64> = rec.data.iter().map(|e| e.roll_no).collect();
            let expected: Vec<i64> = s.roster().students().iter().map(|st| st.id).collect();
            assert_eq!(ids, expected);
        }
    }

    #[test]
    fn double_toggle_returns_to_absent() {
        let mut s = Session::new(Roster::builtin(), "2024-01-10");
        assert_eq!(s.toggle(50), Some(true));
        assert_eq!(s.toggle(50), Some(false));
        assert!(!s.is_present(50));
        assert_eq!(s.snapshot().data[3].status, AttendanceStatus::Absent);
    }

    #[test]
    fn untouched_session_is_all_absent() {
        let s = Session::new(Roster::builtin(), "2024-01-10");
        let rec = s.snapshot();
        assert!(rec.data.iter().all(|e| e.status == AttendanceStatus::Absent));
        assert_eq!(rec.summary(), "0 / 8 Present");
    }

    #[test]
    fn three_present_summary() {
        let mut s = Session::new(Roster::builtin(), "2024-01-10");
        for id in [1, 52, 55] {
            s.toggle(id);
        }
        assert_eq!(s.present_count(), 3);
        assert_eq!(s.snapshot().summary(), "3 / 8 Present");
    }

    #[test]
    fn date_change_keeps_marks() {
        let mut s = Session::new(Roster::builtin(), "2024-01-10");
        s.toggle(2);
        s.select_date("2024-01-11");
        assert!(s.is_present(2));
        let rec = s.snapshot();
        assert_eq!(rec.date, "2024-01-11");
        assert_eq!(rec.present_count(), 1);
    }

    #[test]
    fn unknown_student_is_not_toggled() {
        let mut s = Session::new(Roster::builtin(), "2024-01-10");
        assert_eq!(s.toggle(999), None);
        assert_eq!(s.present_count(), 0);
    }

    #[test]
    fn record_serializes_with_sheet_field_names() {
        let mut s = Session::new(Roster::builtin(), "2024-01-10");
        s.toggle(1);
        let v = serde_json::to_value(s.snapshot()).expect("serialize");
        assert_eq!(v["date"], "2024-01-10");
        assert_eq!(v["data"][0]["RollNo"], 1);
        assert_eq!(v["data"][0]["Name"], "Anubhav Raj");
        assert_eq!(v["data"][0]["Status"], "Present");
        assert_eq!(v["data"][1]["Status"], "Absent");
    }
}
