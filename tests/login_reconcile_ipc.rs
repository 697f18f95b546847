use rusqlite::Connection;
use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};
use tiny_http::{Response, Server};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_lifeskillsd");
    let mut child = Command::new(exe)
        .env_remove("LIFESKILLS_SCRIPT_URL")
        .env_remove("LIFESKILLS_WORKSPACE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn lifeskillsd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

/// Answers every request with the same status and body.
fn fixed_endpoint(status: u16, body: String) -> String {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let url = format!("http://{}/exec", server.server_addr());
    thread::spawn(move || {
        for req in server.incoming_requests() {
            let _ = req.respond(Response::from_string(body.clone()).with_status_code(status));
        }
    });
    url
}

fn seed_slot(workspace: &Path, value: &serde_json::Value) {
    let conn = Connection::open(workspace.join("lifeskills.sqlite3")).expect("open db");
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_slots(name TEXT PRIMARY KEY, value TEXT NOT NULL, updated_at TEXT)",
        [],
    )
    .expect("create table");
    conn.execute(
        "INSERT INTO kv_slots(name, value, updated_at) VALUES('lifeSkillsEvaluations', ?, NULL)",
        [value.to_string()],
    )
    .expect("seed slot");
}

fn read_slot(workspace: &Path) -> String {
    let conn = Connection::open(workspace.join("lifeskills.sqlite3")).expect("open db");
    conn.query_row(
        "SELECT value FROM kv_slots WHERE name = 'lifeSkillsEvaluations'",
        [],
        |r| r.get(0),
    )
    .expect("slot value")
}

fn local_seven() -> serde_json::Value {
    json!({
        "ม.5-A-7": {
            "studentId": 7,
            "scores": { "1": 1 },
            "evaluatorName": "ครูประเสริฐ มั่นคง",
            "date": "2026-10-01T02:00:00.000Z"
        }
    })
}

#[test]
fn login_merges_remote_sheet_into_local_cache() {
    let workspace = temp_dir("lifeskills-reconcile");
    seed_slot(&workspace, &local_seven());
    let url = fixed_endpoint(
        200,
        json!({
            "result": "success",
            "data": {
                "3": {
                    "studentId": 3,
                    "studentName": "นายเตชินท์ บุญเรือง",
                    "classLevel": "ม.5",
                    "room": "A",
                    "scores": { "1": 3, "2": 3 },
                    "evaluatorName": "ครูประเสริฐ มั่นคง",
                    "date": "2026-10-02T02:00:00.000Z"
                }
            }
        })
        .to_string(),
    );

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let ws = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy(), "scriptUrl": url }),
    );
    assert_eq!(ws["evaluationCount"], 1);

    let login = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "session.login",
        json!({ "username": "teacherm5a", "password": "teacherm5a" }),
    );
    assert_eq!(login["sheetName"], "ม.5-A");
    assert_eq!(login["reconcile"]["status"], "merged");
    assert_eq!(login["reconcile"]["merged"], 1);
    assert_eq!(login["reconcile"]["added"], 1);

    let list = request_ok(&mut stdin, &mut reader, "3", "students.list", json!({}));
    assert_eq!(list["evaluatedCount"], 2);

    drop(stdin);
    let _ = child.wait();

    let slot: serde_json::Value = serde_json::from_str(&read_slot(&workspace)).expect("slot json");
    assert!(slot.get("ม.5-A-3").is_some());
    assert!(slot.get("ม.5-A-7").is_some());
    assert_eq!(slot["ม.5-A-3"]["scores"]["2"], 3);
}

#[test]
fn failed_pull_leaves_local_slot_unchanged() {
    let workspace = temp_dir("lifeskills-reconcile-fail");
    seed_slot(&workspace, &local_seven());
    let before = read_slot(&workspace);
    let url = fixed_endpoint(500, "internal error".to_string());

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy(), "scriptUrl": url }),
    );
    let login = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "session.login",
        json!({ "username": "teacherm5a", "password": "teacherm5a" }),
    );
    assert_eq!(login["reconcile"]["status"], "skipped");
    assert!(login["reconcile"]["reason"]
        .as_str()
        .unwrap_or("")
        .contains("500"));

    drop(stdin);
    let _ = child.wait();
    assert_eq!(read_slot(&workspace), before);
}
