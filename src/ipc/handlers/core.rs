use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::remote::{DisabledRemote, EvaluationRemote, SheetClient};
use crate::session::Session;
use crate::store::EvaluationStore;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = state.session.as_ref();
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "remoteConfigured": session.map(|s| s.remote_configured()).unwrap_or(false),
            "teacher": session.and_then(|s| s.teacher()),
            "selectedStudent": session.and_then(|s| s.selected()),
        }),
    )
}

fn build_remote(script_url: Option<&str>) -> Box<dyn EvaluationRemote> {
    match script_url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => match SheetClient::new(url) {
            Ok(client) => Box::new(client),
            Err(e) => {
                warn!(error = %e, "http client unavailable, remote sync disabled");
                Box::new(DisabledRemote)
            }
        },
        None => Box::new(DisabledRemote),
    }
}

/// Opens the store under `path` and starts a fresh, logged-out session.
pub fn select_workspace(
    state: &mut AppState,
    path: &Path,
    script_url: Option<&str>,
) -> anyhow::Result<usize> {
    let store = EvaluationStore::open(path)?;
    let count = store.get_all().len();
    let url = script_url.or(state.config.script_url.as_deref());
    let session = Session::new(store, build_remote(url));
    info!(
        workspace = %path.display(),
        evaluations = count,
        remote = session.remote_configured(),
        "workspace selected"
    );
    state.workspace = Some(path.to_path_buf());
    state.session = Some(session);
    Ok(count)
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };
    let script_url = req.params.get("scriptUrl").and_then(|v| v.as_str());

    match select_workspace(state, &path, script_url) {
        Ok(count) => ok(
            &req.id,
            json!({
                "workspacePath": path.to_string_lossy(),
                "evaluationCount": count,
                "remoteConfigured": state.session.as_ref().map(|s| s.remote_configured()).unwrap_or(false),
            }),
        ),
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
