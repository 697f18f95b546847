//! Bridge to the spreadsheet-backed web endpoint. Every failure is reported
//! as a [`SyncError`]; nothing is retried.

use crate::catalog::{MAX_SCORE_PER_QUESTION, QUESTION_COUNT};
use crate::model::{EvaluationRecord, Scores, Student, Teacher};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("remote endpoint is not configured")]
    NotConfigured,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote returned HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("remote reported failure: {0}")]
    Server(String),
}

impl SyncError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::Transport(_) => "transport_error",
            Self::Status(_) => "http_status",
            Self::Malformed(_) => "malformed_response",
            Self::Server(_) => "server_error",
        }
    }
}

/// Remote records of one sheet, keyed by student id.
pub type RemoteSnapshot = BTreeMap<u32, EvaluationRecord>;

pub trait EvaluationRemote {
    fn push(
        &self,
        student: &Student,
        teacher: &Teacher,
        record: &EvaluationRecord,
    ) -> Result<(), SyncError>;

    /// `Err` means "no information available", never "zero records".
    fn pull(&self, teacher: &Teacher) -> Result<RemoteSnapshot, SyncError>;

    fn is_configured(&self) -> bool {
        true
    }
}

/// Stand-in used when no endpoint URL is configured.
pub struct DisabledRemote;

impl EvaluationRemote for DisabledRemote {
    fn push(&self, _: &Student, _: &Teacher, _: &EvaluationRecord) -> Result<(), SyncError> {
        Err(SyncError::NotConfigured)
    }

    fn pull(&self, _: &Teacher) -> Result<RemoteSnapshot, SyncError> {
        Err(SyncError::NotConfigured)
    }

    fn is_configured(&self) -> bool {
        false
    }
}

pub struct SheetClient {
    endpoint: String,
    client: Client,
}

impl SheetClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SyncError> {
        let client = Client::builder()
            .build()
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

impl EvaluationRemote for SheetClient {
    fn push(
        &self,
        student: &Student,
        teacher: &Teacher,
        record: &EvaluationRecord,
    ) -> Result<(), SyncError> {
        let mut payload =
            serde_json::to_value(record).map_err(|e| SyncError::Malformed(e.to_string()))?;
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("studentName".into(), json!(student.name));
            obj.insert("classLevel".into(), json!(teacher.class_level));
            obj.insert("room".into(), json!(teacher.room));
        }
        let body = json!({
            "sheetName": teacher.sheet_name(),
            "payload": payload,
        });

        // text/plain keeps the request "simple" for the script host.
        let resp = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body.to_string())
            .send()
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        read_envelope(resp).map(|_| ())
    }

    fn pull(&self, teacher: &Teacher) -> Result<RemoteSnapshot, SyncError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("sheetName", teacher.sheet_name())])
            .send()
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        let envelope = read_envelope(resp)?;
        parse_snapshot(envelope.get("data").cloned().unwrap_or(Value::Null))
    }
}

/// Checks status and the `{result: "success"}` envelope, returning the body.
fn read_envelope(resp: reqwest::blocking::Response) -> Result<Value, SyncError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(SyncError::Status(status.as_u16()));
    }
    let text = resp
        .text()
        .map_err(|e| SyncError::Transport(e.to_string()))?;
    let body: Value =
        serde_json::from_str(&text).map_err(|e| SyncError::Malformed(e.to_string()))?;
    match body.get("result").and_then(|v| v.as_str()) {
        Some("success") => Ok(body),
        Some(_) => {
            let message = body
                .get("message")
                .or_else(|| body.get("error"))
                .and_then(|v| v.as_str())
                .unwrap_or("result was not success");
            Err(SyncError::Server(message.to_string()))
        }
        None => Err(SyncError::Malformed("missing result field".to_string())),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteRecord {
    #[serde(default)]
    student_id: Option<Value>,
    #[serde(default)]
    scores: BTreeMap<String, Value>,
    #[serde(default)]
    strengths: Option<String>,
    #[serde(default)]
    improvements: Option<String>,
    #[serde(default)]
    evaluator_name: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

fn parse_snapshot(data: Value) -> Result<RemoteSnapshot, SyncError> {
    let entries = match data {
        Value::Object(map) => map,
        Value::Null => return Err(SyncError::Malformed("missing data".to_string())),
        other => {
            return Err(SyncError::Malformed(format!(
                "data must be an object, got {}",
                other
            )))
        }
    };

    let mut snapshot = RemoteSnapshot::new();
    for (map_key, raw) in entries {
        let rec: RemoteRecord = match serde_json::from_value(raw) {
            Ok(r) => r,
            Err(e) => {
                warn!(entry = %map_key, error = %e, "skipping unreadable remote record");
                continue;
            }
        };
        let student_id = rec
            .student_id
            .as_ref()
            .and_then(lenient_u32)
            .or_else(|| map_key.trim().parse().ok());
        let Some(student_id) = student_id else {
            warn!(entry = %map_key, "skipping remote record without a student id");
            continue;
        };

        let mut scores = Scores::new();
        for (q, v) in &rec.scores {
            let parsed = q
                .trim()
                .parse::<u32>()
                .ok()
                .zip(lenient_u32(v).and_then(|n| u8::try_from(n).ok()));
            let Some((qid, score)) = parsed else {
                warn!(entry = %map_key, question = %q, "ignoring unreadable score");
                continue;
            };
            if !(1..=QUESTION_COUNT as u32).contains(&qid) || score > MAX_SCORE_PER_QUESTION {
                warn!(entry = %map_key, question = qid, score, "ignoring out-of-range score");
                continue;
            }
            scores.insert(qid, score);
        }

        snapshot.insert(
            student_id,
            EvaluationRecord {
                student_id,
                scores,
                strengths: non_empty(rec.strengths),
                improvements: non_empty(rec.improvements),
                evaluator_name: rec.evaluator_name.unwrap_or_default(),
                date: rec.date.unwrap_or_default(),
            },
        );
    }
    Ok(snapshot)
}

/// Sheets hand numbers back as either JSON numbers or numeric strings.
fn lenient_u32(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}
