use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::profiles::{self, ProfileRecord, ProfileStore, Role};

/// Linked name stored for student profiles when the caller sends none.
const NO_LINKED_NAME: &str = "None";

fn profile_json(p: &ProfileRecord) -> serde_json::Value {
    json!({
        "role": p.role.as_str(),
        "fullName": p.full_name,
        "username": p.username,
        "linkedName": p.linked_name,
    })
}

fn require_role(req: &Request) -> Result<Role, serde_json::Value> {
    let Some(raw) = req.params.get("role").and_then(|v| v.as_str()) else {
        return Err(err(&req.id, "bad_params", "missing role", None));
    };
    match Role::parse(raw) {
        Some(role) => Ok(role),
        None => Err(err(
            &req.id,
            "bad_params",
            format!("unknown role: {}", raw),
            None,
        )),
    }
}

fn require_username(req: &Request) -> Result<String, serde_json::Value> {
    match req.params.get("username").and_then(|v| v.as_str()) {
        Some(v) => Ok(v.to_string()),
        None => Err(err(&req.id, "bad_params", "missing username", None)),
    }
}

fn handle_create(store: &ProfileStore, req: &Request) -> serde_json::Value {
    let role = match require_role(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let full_name = match req.params.get("fullName").and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => return err(&req.id, "bad_params", "missing fullName", None),
    };
    if full_name.is_empty() {
        return err(&req.id, "bad_params", "fullName must not be empty", None);
    }
    let linked_name = req
        .params
        .get("linkedName")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| NO_LINKED_NAME.to_string());

    let username = profiles::generate_username(&full_name, role);
    let record = ProfileRecord {
        role,
        full_name,
        username: username.clone(),
        linked_name,
    };
    match store.add(record) {
        Ok(()) => ok(&req.id, json!({ "username": username })),
        Err(e) => err(&req.id, "storage_write_failed", e.to_string(), None),
    }
}

fn handle_login(store: &ProfileStore, req: &Request) -> serde_json::Value {
    let role = match require_role(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let username = match require_username(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match store.find_by_username_and_role(&username, role) {
        Some(p) => ok(&req.id, json!({ "found": true, "profile": profile_json(&p) })),
        None => ok(&req.id, json!({ "found": false })),
    }
}

fn handle_parent_login(store: &ProfileStore, req: &Request) -> serde_json::Value {
    let username = match require_username(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let student_name = match req.params.get("studentName").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing studentName", None),
    };
    match store.find_parent_for_student(&username, &student_name) {
        Some(p) => ok(&req.id, json!({ "found": true, "profile": profile_json(&p) })),
        None => ok(&req.id, json!({ "found": false })),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    if !matches!(
        req.method.as_str(),
        "profiles.create" | "profiles.login" | "profiles.parentLogin"
    ) {
        return None;
    }

    let Some(stores) = state.stores.as_ref() else {
        return Some(err(&req.id, "no_workspace", "select a workspace first", None));
    };
    let store = &stores.profiles;

    let resp = match req.method.as_str() {
        "profiles.create" => handle_create(store, req),
        "profiles.login" => handle_login(store, req),
        _ => handle_parent_login(store, req),
    };
    Some(resp)
}
