use gradetrackd::config::Config;
use gradetrackd::ipc;
use gradetrackd::store::sqlite::SqliteStore;
use std::io::{self, BufRead, Write};

fn main() -> anyhow::Result<()> {
    let config = Config::load();
    config.init_logging();

    let mut state = ipc::AppState::new(config.export_dir.clone());
    if let Some(workspace) = &config.workspace {
        state.store = Some(SqliteStore::open(workspace)?);
        state.workspace = Some(workspace.clone());
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                tracing::warn!(error = %e, "unparseable request line");
                let _ = writeln!(
                    stdout,
                    "{}",
                    serde_json::json!({
                        "ok": false,
                        "error": { "code": "bad_json", "message": e.to_string() }
                    })
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    tracing::debug!("stdin closed, shutting down");
    Ok(())
}
