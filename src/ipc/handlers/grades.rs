use crate::error::StoreError;
use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{store_mut, str_param};
use crate::ipc::types::{AppState, Request};
use crate::model::{GradeEntry, RawGrade};
use crate::store::RecordStore;
use serde_json::json;

const BULK_UPSERT_MAX_ENTRIES: usize = 500;

/// Anything other than a number or a string is a non-numeric grade.
fn raw_grade(v: &serde_json::Value) -> Result<RawGrade, StoreError> {
    serde_json::from_value(v.clone()).map_err(|_| StoreError::InvalidGrade {
        reason: "Invalid grade value",
    })
}

fn handle_grades_upsert(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let Some(student_id) = req.params.get("studentId").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };
    let subject = match str_param(req, "subject") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(grade) = req.params.get("grade") else {
        return err(&req.id, "bad_params", "missing grade", None);
    };
    let grade = match raw_grade(grade) {
        Ok(g) => g,
        Err(e) => return store_err(&req.id, &e),
    };

    match store.upsert_grade(student_id, subject, &grade) {
        Ok(g) => ok(&req.id, json!({ "grade": g })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_grades_bulk_upsert(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let roll_number = match str_param(req, "rollNumber") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(entries_arr) = req.params.get("entries").and_then(|v| v.as_array()) else {
        return err(&req.id, "bad_params", "missing entries[]", None);
    };
    if entries_arr.len() > BULK_UPSERT_MAX_ENTRIES {
        return err(
            &req.id,
            "too_many_entries",
            format!(
                "bulk payload exceeds max entries: {} > {}",
                entries_arr.len(),
                BULK_UPSERT_MAX_ENTRIES
            ),
            None,
        );
    }

    let mut errors: Vec<serde_json::Value> = Vec::new();
    let mut entries: Vec<GradeEntry> = Vec::with_capacity(entries_arr.len());
    for (i, entry) in entries_arr.iter().enumerate() {
        let subject = entry.get("subject").and_then(|v| v.as_str());
        let (Some(subject), Some(grade)) = (subject, entry.get("grade")) else {
            errors.push(json!({
                "subject": subject,
                "code": "bad_params",
                "message": format!("entry at index {} needs subject and grade", i),
            }));
            continue;
        };
        match raw_grade(grade) {
            Ok(grade) => entries.push(GradeEntry {
                subject: subject.to_string(),
                grade,
            }),
            Err(e) => errors.push(json!({
                "subject": subject.trim(),
                "code": e.code(),
                "message": format!("{}: {}", subject.trim(), e),
            })),
        }
    }

    let outcome = match store.upsert_grades(roll_number, &entries) {
        Ok(o) => o,
        Err(e) => return store_err(&req.id, &e),
    };
    for (subject, e) in &outcome.failures {
        errors.push(json!({
            "subject": subject,
            "code": e.code(),
            "message": format!("{}: {}", subject, e),
        }));
    }

    let mut result = json!({ "updated": outcome.updated });
    if !errors.is_empty() {
        result["rejected"] = json!(errors.len());
        result["errors"] = json!(errors);
    }
    ok(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.upsert" => Some(handle_grades_upsert(state, req)),
        "grades.bulkUpsert" => Some(handle_grades_bulk_upsert(state, req)),
        _ => None,
    }
}
