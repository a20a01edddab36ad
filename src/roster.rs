use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const ROSTER_FILE: &str = "roster.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
}

/// Students eligible for marking, in display order. Fixed once loaded.
#[derive(Debug, Clone)]
pub struct Roster {
    students: Vec<Student>,
}

const DEFAULT_STUDENTS: &[(i64, &str)] = &[
    (1, "Anubhav Raj"),
    (2, "Anubhav Singh"),
    (3, "Anushka Sharma"),
    (50, "Khurshid Alam"),
    (51, "Khushbu Kumari"),
    (52, "Khushi Kumari"),
    (53, "Khushi Pathak"),
    (55, "Krish Kumar"),
];

impl Roster {
    pub fn new(students: Vec<Student>) -> anyhow::Result<Self> {
        let mut seen = HashSet::new();
        for s in &students {
            if !seen.insert(s.id) {
                return Err(anyhow!("duplicate student id {}", s.id));
            }
        }
        Ok(Self { students })
    }

    pub fn builtin() -> Self {
        Self {
            students: DEFAULT_STUDENTS
                .iter()
                .map(|(id, name)| Student {
                    id: *id,
                    name: (*name).to_string(),
                })
                .collect(),
        }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }
}

pub fn load_roster_file(path: &Path) -> anyhow::Result<Roster> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read roster {}", path.to_string_lossy()))?;
    let students: Vec<Student> = serde_json::from_str(&text)
        .with_context(|| format!("roster {} is invalid JSON", path.to_string_lossy()))?;
    Roster::new(students)
}

/// An explicit path must exist; otherwise `<workspace>/roster.json` is used
/// when present and the built-in table when not.
pub fn resolve_roster(workspace: &Path, explicit: Option<&Path>) -> anyhow::Result<Roster> {
    if let Some(p) = explicit {
        return load_roster_file(p);
    }
    let p = workspace.join(ROSTER_FILE);
    if p.is_file() {
        return load_roster_file(&p);
    }
    Ok(Roster::builtin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_roster_keeps_table_order() {
        let r = Roster::builtin();
        assert_eq!(r.len(), 8);
        let ids: Vec<i64> = r.students().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 50, 51, 52, 53, 55]);
        assert_eq!(r.students()[3].name, "Khurshid Alam");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let res = Roster::new(vec![
            Student {
                id: 7,
                name: "A".into(),
            },
            Student {
                id: 7,
                name: "B".into(),
            },
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn roster_file_parses_id_name_pairs() {
        let dir = std::env::temp_dir().join(format!(
            "rollcall-roster-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        std::fs::write(
            dir.join(ROSTER_FILE),
            r#"[{"id": 10, "name": "Zed"}, {"id": 4, "name": "Amy"}]"#,
        )
        .expect("write roster");

        let r = resolve_roster(&dir, None).expect("resolve roster");
        assert_eq!(r.len(), 2);
        assert_eq!(r.students()[0].id, 10);
        assert_eq!(r.students()[1].name, "Amy");

        let _ = std::fs::remove_dir_all(dir);
    }
}
