use crate::ipc::error::{err, no_workspace, ok, session_err};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_mut() else {
        return no_workspace(&req.id);
    };
    let username = req.params.get("username").and_then(|v| v.as_str());
    let password = req.params.get("password").and_then(|v| v.as_str());
    let (Some(username), Some(password)) = (username, password) else {
        return err(&req.id, "bad_params", "missing username or password", None);
    };

    match session.login(username, password) {
        Ok((teacher, reconcile)) => ok(
            &req.id,
            json!({
                "sheetName": teacher.sheet_name(),
                "teacher": teacher,
                "reconcile": reconcile,
            }),
        ),
        Err(e) => session_err(&req.id, &e),
    }
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(session) = state.session.as_mut() {
        session.logout();
    }
    ok(&req.id, json!({}))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.login" => Some(handle_login(state, req)),
        "session.logout" => Some(handle_logout(state, req)),
        _ => None,
    }
}
