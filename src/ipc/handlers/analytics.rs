use crate::calc;
use crate::ipc::error::{ok, store_err};
use crate::ipc::helpers::{store, str_param};
use crate::ipc::types::{AppState, Request};
use crate::store::RecordStore;
use serde_json::json;

fn handle_subjects_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return ok(&req.id, json!({ "subjects": [] }));
    };
    match store.list_subjects() {
        Ok(subjects) => ok(&req.id, json!({ "subjects": subjects })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_topper(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let subject = match str_param(req, "subject") {
        Ok(v) => v.trim(),
        Err(resp) => return resp,
    };

    match store.list_students() {
        Ok(students) => ok(
            &req.id,
            json!({
                "subject": subject,
                "topper": calc::subject_topper(subject, &students),
            }),
        ),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_class_average(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let subject = match str_param(req, "subject") {
        Ok(v) => v.trim(),
        Err(resp) => return resp,
    };

    match store.list_students() {
        Ok(students) => ok(
            &req.id,
            json!({
                "subject": subject,
                "average": calc::class_average(subject, &students),
            }),
        ),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_dashboard(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let loaded = store
        .list_students()
        .and_then(|students| Ok((students, store.list_subjects()?)));
    match loaded {
        Ok((students, subjects)) => ok(&req.id, json!(calc::dashboard(&students, &subjects))),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_subject_report(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let loaded = store
        .list_students()
        .and_then(|students| Ok((students, store.list_subjects()?)));
    match loaded {
        Ok((students, subjects)) => ok(
            &req.id,
            json!({ "subjects": calc::subject_report(&subjects, &students) }),
        ),
        Err(e) => store_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.list" => Some(handle_subjects_list(state, req)),
        "analytics.topper" => Some(handle_topper(state, req)),
        "analytics.classAverage" => Some(handle_class_average(state, req)),
        "analytics.dashboard" => Some(handle_dashboard(state, req)),
        "analytics.subjects" => Some(handle_subject_report(state, req)),
        _ => None,
    }
}
