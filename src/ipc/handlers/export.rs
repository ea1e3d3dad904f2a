use crate::export;
use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::store;
use crate::ipc::types::{AppState, Request};
use crate::store::RecordStore;
use serde_json::json;
use std::path::PathBuf;

fn handle_export_text(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let out_dir = match req.params.get("outDir").and_then(|v| v.as_str()) {
        Some(p) => PathBuf::from(p),
        None => match (&state.export_dir, &state.workspace) {
            (Some(dir), _) => dir.clone(),
            (None, Some(ws)) => ws.join("exports"),
            (None, None) => return err(&req.id, "no_workspace", "select a workspace first", None),
        },
    };

    let students = match store.list_students() {
        Ok(v) => v,
        Err(e) => return store_err(&req.id, &e),
    };
    match export::write_text_export(&out_dir, &students) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "path": summary.path.to_string_lossy(),
                "studentCount": summary.student_count,
            }),
        ),
        Err(e) => err(
            &req.id,
            "io_failed",
            format!("{e:#}"),
            Some(json!({ "outDir": out_dir.to_string_lossy() })),
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "export.text" => Some(handle_export_text(state, req)),
        _ => None,
    }
}
