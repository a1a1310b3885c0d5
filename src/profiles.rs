//! Identity profiles: role, display name, derived username, linked name.
//!
//! File format, one record per line: `role,fullName,username,linkedName`.
//! Lines with fewer than four fields or an unknown role are dropped on load.
//! The linked name is role-dependent: an institution name for teachers, the
//! sentinel `"None"` for students, and the child's full name for parents.
//!
//! Profiles are append-only. There is no update or delete path, and no
//! uniqueness check on (role, username); when duplicates exist, lookups
//! return the first on-disk match.

use std::path::PathBuf;

use crate::store::{self, Snapshot, DELIMITER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Teacher,
    Student,
    Parent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Parent => "parent",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "teacher" => Some(Role::Teacher),
            "student" => Some(Role::Student),
            "parent" => Some(Role::Parent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub role: Role,
    pub full_name: String,
    pub username: String,
    pub linked_name: String,
}

/// Derive the login handle for a profile: first letter of the first
/// whitespace-separated name token plus the whole last token, lowercased,
/// with a role suffix. Middle tokens do not contribute, so "Mary Ann Lee"
/// and "Mary Lee" derive the same handle. A name with no tokens derives the
/// empty string. Collisions are possible and are not resolved here.
pub fn generate_username(full_name: &str, role: Role) -> String {
    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return String::new();
    };
    let initial: String = first.chars().take(1).collect();
    format!(
        "{}{}.{}",
        initial.to_lowercase(),
        last.to_lowercase(),
        role.as_str()
    )
}

fn parse_line(line: &str) -> Option<ProfileRecord> {
    // split() keeps trailing empty fields, so "parent,,," still has four.
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    if fields.len() < 4 {
        return None;
    }
    let role = Role::parse(fields[0])?;
    Some(ProfileRecord {
        role,
        full_name: fields[1].to_string(),
        username: fields[2].to_string(),
        linked_name: fields[3].to_string(),
    })
}

fn ci_eq_trimmed(stored: &str, query: &str) -> bool {
    stored.to_lowercase() == query.trim().to_lowercase()
}

pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Every well-formed record, in file order.
    pub fn load_all(&self) -> Snapshot<ProfileRecord> {
        store::read_records(&self.path, parse_line)
    }

    /// Full overwrite with exactly the given records. No escaping: a linked
    /// name containing the delimiter (a school name, say) will not
    /// round-trip.
    pub fn save_all(&self, records: &[ProfileRecord]) -> anyhow::Result<()> {
        store::write_records(
            &self.path,
            records.iter().map(|p| {
                format!(
                    "{}{d}{}{d}{}{d}{}",
                    p.role.as_str(),
                    p.full_name,
                    p.username,
                    p.linked_name,
                    d = DELIMITER
                )
            }),
        )
    }

    /// Append one record. Duplicate (role, username) pairs are permitted;
    /// the first on-disk match wins at lookup time.
    pub fn add(&self, record: ProfileRecord) -> anyhow::Result<()> {
        let mut all = self.load_all().records;
        all.push(record);
        self.save_all(&all)
    }

    /// First profile with the given role whose username matches
    /// case-insensitively (query trimmed), or `None`.
    pub fn find_by_username_and_role(&self, username: &str, role: Role) -> Option<ProfileRecord> {
        self.load_all()
            .records
            .into_iter()
            .find(|p| p.role == role && ci_eq_trimmed(&p.username, username))
    }

    /// The knowledge-based check gating a parent's view of a student: a
    /// parent profile must exist whose username and linked name both match.
    /// Exactly this triple, nothing stronger.
    pub fn find_parent_for_student(
        &self,
        username: &str,
        student_name: &str,
    ) -> Option<ProfileRecord> {
        self.load_all().records.into_iter().find(|p| {
            p.role == Role::Parent
                && ci_eq_trimmed(&p.username, username)
                && ci_eq_trimmed(&p.linked_name, student_name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> ProfileStore {
        ProfileStore::new(dir.path().join(crate::store::PROFILES_FILE))
    }

    fn profile(role: Role, full_name: &str, username: &str, linked_name: &str) -> ProfileRecord {
        ProfileRecord {
            role,
            full_name: full_name.to_string(),
            username: username.to_string(),
            linked_name: linked_name.to_string(),
        }
    }

    #[test]
    fn username_derivation() {
        assert_eq!(
            generate_username("Jane Smith", Role::Teacher),
            "jsmith.teacher"
        );
        assert_eq!(
            generate_username("Mary Ann Lee", Role::Parent),
            "mlee.parent"
        );
        assert_eq!(generate_username("", Role::Student), "");
        assert_eq!(generate_username("   ", Role::Student), "");
        // A single token is both the first and the last token.
        assert_eq!(generate_username("Cher", Role::Teacher), "ccher.teacher");
    }

    #[test]
    fn round_trip_preserves_order_and_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let records = vec![
            profile(Role::Teacher, "Jane Smith", "jsmith.teacher", "Hill Valley High"),
            profile(Role::Student, "Jane Smith", "jsmith.student", "None"),
            profile(Role::Parent, "Mary Lee", "mlee.parent", "Jane Smith"),
        ];
        store.save_all(&records).expect("save");
        assert_eq!(store.load_all().records, records);
    }

    #[test]
    fn empty_fields_survive_the_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let records = vec![profile(Role::Student, "", "", "")];
        store.save_all(&records).expect("save");
        assert_eq!(store.load_all().records, records);
    }

    #[test]
    fn delimiter_in_the_linked_name_truncates_on_reload() {
        // Known limitation of the unescaped format: a linked name holding a
        // comma (a school name, say) splits into extra fields, and only the
        // part before the comma survives the next load.
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store
            .save_all(&[profile(
                Role::Teacher,
                "Jane Smith",
                "jsmith.teacher",
                "Hill, Valley High",
            )])
            .expect("save");
        let loaded = store.load_all().records;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].linked_name, "Hill");
    }

    #[test]
    fn malformed_and_unknown_role_lines_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(crate::store::PROFILES_FILE);
        std::fs::write(
            &path,
            "teacher,Jane Smith,jsmith.teacher,Hill Valley High\n\
             principal,Sam Hall,shall.principal,None\n\
             parent,Mary Lee,mlee.parent\n",
        )
        .expect("write fixture");
        let store = ProfileStore::new(path);
        let loaded = store.load_all().records;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].username, "jsmith.teacher");
    }

    #[test]
    fn lookup_matches_username_and_role() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store
            .save_all(&[
                profile(Role::Teacher, "Jane Smith", "jsmith.teacher", "Hill Valley High"),
                profile(Role::Student, "Jade Smith", "jsmith.student", "None"),
            ])
            .expect("save");

        let found = store
            .find_by_username_and_role("  JSMITH.TEACHER ", Role::Teacher)
            .expect("teacher found");
        assert_eq!(found.full_name, "Jane Smith");
        assert!(store
            .find_by_username_and_role("jsmith.teacher", Role::Parent)
            .is_none());
    }

    #[test]
    fn duplicate_usernames_resolve_to_first_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store
            .save_all(&[
                profile(Role::Teacher, "Jane Smith", "jsmith.teacher", "First High"),
                profile(Role::Teacher, "Joe Smith", "jsmith.teacher", "Second High"),
            ])
            .expect("save");
        let found = store
            .find_by_username_and_role("jsmith.teacher", Role::Teacher)
            .expect("found");
        assert_eq!(found.linked_name, "First High");
    }

    #[test]
    fn parent_lookup_requires_the_full_triple() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store
            .save_all(&[profile(Role::Parent, "Mary Lee", "mlee.parent", "Jane Smith")])
            .expect("save");

        assert!(store
            .find_parent_for_student(" mlee.parent ", "jane smith")
            .is_some());
        assert!(store
            .find_parent_for_student("mlee.parent", "John Doe")
            .is_none());
        assert!(store
            .find_parent_for_student("other.parent", "Jane Smith")
            .is_none());
    }
}
