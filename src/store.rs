//! Flat-file record storage shared by the student and profile stores.
//!
//! Each store owns one delimited text file inside the selected workspace
//! folder. Every operation re-reads the whole file; mutations rewrite it in
//! full. There is no cache, no locking and no escaping of the delimiter.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context;

use crate::profiles::ProfileStore;
use crate::students::StudentStore;

pub const STUDENTS_FILE: &str = "students.csv";
pub const PROFILES_FILE: &str = "profiles.csv";
pub const DELIMITER: char = ',';

/// The two record stores bound to a workspace folder.
pub struct Stores {
    pub students: StudentStore,
    pub profiles: ProfileStore,
}

pub fn open_workspace(workspace: &Path) -> anyhow::Result<Stores> {
    std::fs::create_dir_all(workspace)
        .with_context(|| format!("failed to create workspace {}", workspace.display()))?;
    Ok(Stores {
        students: StudentStore::new(workspace.join(STUDENTS_FILE)),
        profiles: ProfileStore::new(workspace.join(PROFILES_FILE)),
    })
}

/// Result of reading a record file in full.
///
/// A missing file is an empty snapshot with no failure (first run). Any other
/// read error also yields an empty snapshot, but carries the failure so the
/// caller can surface it; reads never fail outright.
pub struct Snapshot<T> {
    pub records: Vec<T>,
    pub failure: Option<String>,
}

/// Read every line of `path` and parse each with `parse`. Lines that fail to
/// parse are dropped silently.
pub fn read_records<T>(path: &Path, parse: impl Fn(&str) -> Option<T>) -> Snapshot<T> {
    let text = match std::fs::read_to_string(path) {
        Ok(v) => v,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Snapshot {
                records: Vec::new(),
                failure: None,
            }
        }
        Err(e) => {
            log::warn!("failed to read {}: {}", path.display(), e);
            return Snapshot {
                records: Vec::new(),
                failure: Some(e.to_string()),
            };
        }
    };

    Snapshot {
        records: text.lines().filter_map(|line| parse(line)).collect(),
        failure: None,
    }
}

/// Overwrite `path` with exactly the given lines, newline-terminated. Callers
/// join fields themselves; no quoting or escaping is applied.
pub fn write_records(path: &Path, lines: impl Iterator<Item = String>) -> anyhow::Result<()> {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    std::fs::write(path, out).with_context(|| format!("failed to write {}", path.display()))
}
