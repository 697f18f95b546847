use crate::export;
use crate::ipc::error::{err, no_workspace, ok, session_err};
use crate::ipc::types::{AppState, Request};
use crate::session::SessionError;
use serde_json::json;
use std::path::PathBuf;

fn handle_export_xlsx(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (Some(session), Some(workspace)) = (state.session.as_ref(), state.workspace.as_ref())
    else {
        return no_workspace(&req.id);
    };
    let Some(teacher) = session.teacher() else {
        return session_err(&req.id, &SessionError::NotLoggedIn);
    };
    let roster = match session.roster() {
        Ok(r) => r,
        Err(e) => return session_err(&req.id, &e),
    };

    let out_path = req
        .params
        .get("outPath")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
        .unwrap_or_else(|| workspace.join(export::default_file_name(teacher)));

    match export::export_class(teacher, &roster, session.evaluations(), &out_path) {
        Ok((path, row_count)) => ok(
            &req.id,
            json!({
                "path": path.to_string_lossy(),
                "rowCount": row_count,
            }),
        ),
        Err(e) => err(
            &req.id,
            "export_failed",
            format!("{e:?}"),
            Some(json!({ "outPath": out_path.to_string_lossy() })),
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "export.xlsx" => Some(handle_export_xlsx(state, req)),
        _ => None,
    }
}
