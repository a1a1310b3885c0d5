//! Student records: names and reward point totals.
//!
//! File format, one record per line: `firstName,lastName,points`. Lines with
//! fewer than three fields or a non-integer point value are dropped on load.
//! The identity key for lookups is `"first last"`, compared case-insensitively
//! with the query side trimmed. Stored names are kept verbatim, so a record
//! saved with stray surrounding whitespace will never match a lookup.

use std::path::PathBuf;

use crate::store::{self, Snapshot, DELIMITER};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub first_name: String,
    pub last_name: String,
    pub points: i64,
}

impl StudentRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn parse_line(line: &str) -> Option<StudentRecord> {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    if fields.len() < 3 {
        return None;
    }
    // Points are parsed as written; "12 " or "x" drops the line.
    let points: i64 = fields[2].parse().ok()?;
    Some(StudentRecord {
        first_name: fields[0].to_string(),
        last_name: fields[1].to_string(),
        points,
    })
}

fn name_matches(stored: &StudentRecord, query: &str) -> bool {
    stored.full_name().to_lowercase() == query.trim().to_lowercase()
}

pub struct StudentStore {
    path: PathBuf,
}

impl StudentStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Every well-formed record, in file order.
    pub fn load_all(&self) -> Snapshot<StudentRecord> {
        store::read_records(&self.path, parse_line)
    }

    /// Full overwrite with exactly the given records. Field values containing
    /// the delimiter will not round-trip; that matches the file format.
    pub fn save_all(&self, records: &[StudentRecord]) -> anyhow::Result<()> {
        store::write_records(
            &self.path,
            records
                .iter()
                .map(|s| format!("{}{d}{}{d}{}", s.first_name, s.last_name, s.points, d = DELIMITER)),
        )
    }

    /// Append one record. Uniqueness of the identity key is the caller's
    /// responsibility; appending a duplicate is not rejected here.
    pub fn add(&self, record: StudentRecord) -> anyhow::Result<()> {
        let mut all = self.load_all().records;
        all.push(record);
        self.save_all(&all)
    }

    /// First record whose identity key matches, or `None`.
    pub fn find(&self, full_name: &str) -> Option<StudentRecord> {
        self.load_all()
            .records
            .into_iter()
            .find(|s| name_matches(s, full_name))
    }

    /// Add `points` to every matching record and rewrite the file. Returns
    /// the number of records changed. If duplicates exist on disk, all of
    /// them are incremented.
    pub fn add_points(&self, full_name: &str, points: i64) -> anyhow::Result<usize> {
        let mut all = self.load_all().records;
        let mut changed = 0;
        for s in all.iter_mut() {
            if name_matches(s, full_name) {
                // Saturate rather than overflow on hand-edited extreme totals.
                s.points = s.points.saturating_add(points);
                changed += 1;
            }
        }
        self.save_all(&all)?;
        Ok(changed)
    }

    /// Remove every matching record and rewrite the file. Returns the number
    /// removed.
    pub fn delete(&self, full_name: &str) -> anyhow::Result<usize> {
        let mut all = self.load_all().records;
        let before = all.len();
        all.retain(|s| !name_matches(s, full_name));
        let removed = before - all.len();
        self.save_all(&all)?;
        Ok(removed)
    }

    /// Leaderboard view: highest point totals first, at most `n` records.
    /// The sort is stable, so equal totals keep file order. Read-only.
    pub fn top_n(&self, n: usize) -> Snapshot<StudentRecord> {
        let mut snap = self.load_all();
        snap.records.sort_by(|a, b| b.points.cmp(&a.points));
        snap.records.truncate(n);
        snap
    }

    /// Records with strictly more than `threshold` points, in file order.
    /// A total equal to the threshold is not eligible.
    pub fn raffle_eligible(&self, threshold: i64) -> Snapshot<StudentRecord> {
        let mut snap = self.load_all();
        snap.records.retain(|s| s.points > threshold);
        snap
    }
}
