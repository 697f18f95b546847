mod calc;
mod catalog;
mod config;
mod db;
mod export;
mod ipc;
mod model;
mod reconcile;
mod remote;
mod session;
mod store;
mod xlsx;

use std::io::{self, BufRead, Write};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(filter: &str) {
    // stdout carries IPC responses; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}

fn main() {
    let config = config::Config::from_env();
    init_tracing(&config.log_filter);
    info!(version = env!("CARGO_PKG_VERSION"), "lifeskillsd starting");

    let mut state = ipc::AppState::new(config.clone());
    if let Some(ws) = config.workspace.as_deref() {
        if let Err(e) = ipc::select_workspace(&mut state, ws, None) {
            error!(workspace = %ws.display(), error = %e, "failed to open configured workspace");
        }
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
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() },
                });
                let _ = writeln!(stdout, "{}", resp);
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
}
