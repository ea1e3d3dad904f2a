use crate::calc;
use crate::ipc::error::{ok, store_err};
use crate::ipc::helpers::{store, store_mut, str_param};
use crate::ipc::types::{AppState, Request};
use crate::model::StudentRecord;
use crate::store::RecordStore;
use serde_json::json;

const RECENT_DEFAULT_LIMIT: usize = 5;

pub(crate) fn student_view(s: &StudentRecord) -> serde_json::Value {
    json!({
        "id": s.id,
        "name": s.name,
        "rollNumber": s.roll_number,
        "createdAt": s.created_at,
        "grades": s.grades,
        "average": calc::average(&s.grades),
    })
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let name = match str_param(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let roll_number = match str_param(req, "rollNumber") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match store.add_student(name, roll_number) {
        Ok(student_id) => ok(
            &req.id,
            json!({
                "studentId": student_id,
                "name": name.trim(),
                "rollNumber": roll_number.trim(),
            }),
        ),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_students_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let roll_number = match str_param(req, "rollNumber") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match store.get_student(roll_number) {
        Ok(s) => ok(&req.id, student_view(&s)),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return ok(&req.id, json!({ "students": [] }));
    };

    match store.list_students() {
        Ok(students) => {
            let views: Vec<_> = students.iter().map(student_view).collect();
            ok(&req.id, json!({ "students": views }))
        }
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_students_recent(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return ok(&req.id, json!({ "students": [] }));
    };
    let limit = req
        .params
        .get("limit")
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .unwrap_or(RECENT_DEFAULT_LIMIT);

    match store.recent_students(limit) {
        Ok(students) => {
            let views: Vec<_> = students.iter().map(student_view).collect();
            ok(&req.id, json!({ "students": views }))
        }
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let roll_number = match str_param(req, "rollNumber") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match store.delete_student(roll_number) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => store_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.create" => Some(handle_students_create(state, req)),
        "students.get" => Some(handle_students_get(state, req)),
        "students.list" => Some(handle_students_list(state, req)),
        "students.recent" => Some(handle_students_recent(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        _ => None,
    }
}
