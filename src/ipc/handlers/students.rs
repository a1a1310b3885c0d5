use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::Snapshot;
use crate::students::{StudentRecord, StudentStore};

/// Fixed amount added per award action.
const AWARD_POINTS: i64 = 5;
/// Leaderboard length shown on the dashboards.
const DEFAULT_TOP_N: usize = 3;
/// Points a student must exceed to enter the raffle.
const DEFAULT_RAFFLE_THRESHOLD: i64 = 50;

fn student_json(s: &StudentRecord) -> serde_json::Value {
    json!({
        "firstName": s.first_name,
        "lastName": s.last_name,
        "fullName": s.full_name(),
        "points": s.points,
    })
}

/// List-style results carry a `storageError` field when the backing read
/// failed, so the front end can surface it; the list itself is then empty.
fn list_result(snap: Snapshot<StudentRecord>) -> serde_json::Value {
    let mut result = json!({
        "students": snap.records.iter().map(student_json).collect::<Vec<_>>()
    });
    if let Some(failure) = snap.failure {
        result["storageError"] = json!(failure);
    }
    result
}

fn require_full_name(req: &Request) -> Result<String, serde_json::Value> {
    match req.params.get("fullName").and_then(|v| v.as_str()) {
        Some(v) => Ok(v.to_string()),
        None => Err(err(&req.id, "bad_params", "missing fullName", None)),
    }
}

fn handle_list(store: &StudentStore, req: &Request) -> serde_json::Value {
    ok(&req.id, list_result(store.load_all()))
}

fn handle_create(store: &StudentStore, req: &Request) -> serde_json::Value {
    let first_name = match req.params.get("firstName").and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => return err(&req.id, "bad_params", "missing firstName", None),
    };
    let last_name = match req.params.get("lastName").and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => return err(&req.id, "bad_params", "missing lastName", None),
    };
    if first_name.is_empty() || last_name.is_empty() {
        return err(
            &req.id,
            "bad_params",
            "firstName/lastName must not be empty",
            None,
        );
    }

    // Uniqueness of the identity key is enforced here, not in the store.
    let full_name = format!("{} {}", first_name, last_name);
    if store.find(&full_name).is_some() {
        return err(
            &req.id,
            "already_exists",
            format!("student {} already exists", full_name),
            None,
        );
    }

    let record = StudentRecord {
        first_name,
        last_name,
        points: 0,
    };
    match store.add(record) {
        Ok(()) => ok(&req.id, json!({ "fullName": full_name, "points": 0 })),
        Err(e) => err(&req.id, "storage_write_failed", e.to_string(), None),
    }
}

fn handle_find(store: &StudentStore, req: &Request) -> serde_json::Value {
    let full_name = match require_full_name(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match store.find(&full_name) {
        Some(s) => ok(&req.id, json!({ "found": true, "student": student_json(&s) })),
        None => ok(&req.id, json!({ "found": false })),
    }
}

fn handle_award_points(store: &StudentStore, req: &Request) -> serde_json::Value {
    let full_name = match require_full_name(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match store.add_points(&full_name, AWARD_POINTS) {
        Ok(changed) => ok(
            &req.id,
            json!({
                "found": changed > 0,
                "updated": changed,
                "awarded": AWARD_POINTS,
            }),
        ),
        Err(e) => err(&req.id, "storage_write_failed", e.to_string(), None),
    }
}

fn handle_delete(store: &StudentStore, req: &Request) -> serde_json::Value {
    let full_name = match require_full_name(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match store.delete(&full_name) {
        Ok(removed) => ok(
            &req.id,
            json!({ "found": removed > 0, "removed": removed }),
        ),
        Err(e) => err(&req.id, "storage_write_failed", e.to_string(), None),
    }
}

fn handle_top(store: &StudentStore, req: &Request) -> serde_json::Value {
    let limit = req
        .params
        .get("limit")
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .unwrap_or(DEFAULT_TOP_N);
    ok(&req.id, list_result(store.top_n(limit)))
}

fn handle_raffle(store: &StudentStore, req: &Request) -> serde_json::Value {
    let threshold = req
        .params
        .get("threshold")
        .and_then(|v| v.as_i64())
        .unwrap_or(DEFAULT_RAFFLE_THRESHOLD);
    ok(&req.id, list_result(store.raffle_eligible(threshold)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    if !matches!(
        req.method.as_str(),
        "students.list"
            | "students.create"
            | "students.find"
            | "students.awardPoints"
            | "students.delete"
            | "students.top"
            | "students.raffle"
    ) {
        return None;
    }

    let Some(stores) = state.stores.as_ref() else {
        return Some(err(&req.id, "no_workspace", "select a workspace first", None));
    };
    let store = &stores.students;

    let resp = match req.method.as_str() {
        "students.list" => handle_list(store, req),
        "students.create" => handle_create(store, req),
        "students.find" => handle_find(store, req),
        "students.awardPoints" => handle_award_points(store, req),
        "students.delete" => handle_delete(store, req),
        "students.top" => handle_top(store, req),
        _ => handle_raffle(store, req),
    };
    Some(resp)
}
