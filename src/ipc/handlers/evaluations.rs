use crate::calc;
use crate::catalog::{self, MAX_SCORE_PER_QUESTION, MAX_TOTAL, QUESTION_COUNT, SCHOOL_NAME};
use crate::ipc::error::{err, no_workspace, ok, session_err};
use crate::ipc::types::{AppState, Request};
use crate::model::Scores;
use crate::session::EvaluationDraft;
use serde_json::json;

fn handle_rubric_get(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "schoolName": SCHOOL_NAME,
            "indicators": catalog::indicators(),
            "questionCount": QUESTION_COUNT,
            "maxScore": MAX_TOTAL,
        }),
    )
}

fn student_id_param(req: &Request) -> Result<u32, serde_json::Value> {
    req.params
        .get("studentId")
        .and_then(|v| v.as_u64())
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| err(&req.id, "bad_params", "missing studentId", None))
}

/// Reads `{"<questionId>": score}`. Out-of-range ids or scores are rejected,
/// never clamped.
fn parse_scores(req: &Request) -> Result<Scores, serde_json::Value> {
    let Some(obj) = req.params.get("scores").and_then(|v| v.as_object()) else {
        return Err(err(&req.id, "bad_params", "missing scores object", None));
    };
    let mut scores = Scores::new();
    for (k, v) in obj {
        let qid = k
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|q| (1..=QUESTION_COUNT as u32).contains(q));
        let Some(qid) = qid else {
            return Err(err(
                &req.id,
                "bad_params",
                format!("unknown question id: {k}"),
                Some(json!({ "questionId": k })),
            ));
        };
        let score = v
            .as_u64()
            .filter(|s| *s <= u64::from(MAX_SCORE_PER_QUESTION));
        let Some(score) = score else {
            return Err(err(
                &req.id,
                "bad_params",
                format!("score for question {qid} must be 0..={MAX_SCORE_PER_QUESTION}"),
                Some(json!({ "questionId": qid, "score": v })),
            ));
        };
        scores.insert(qid, score as u8);
    }
    Ok(scores)
}

fn optional_text(req: &Request, name: &str) -> Option<String> {
    req.params
        .get(name)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn handle_evaluation_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_mut() else {
        return no_workspace(&req.id);
    };
    let student_id = match student_id_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match session.open_student(student_id) {
        Ok((student, record)) => {
            let summary = calc::summarize(
                &record
                    .as_ref()
                    .map(|r| r.scores.clone())
                    .unwrap_or_default(),
            );
            ok(
                &req.id,
                json!({
                    "student": student,
                    "record": record,
                    "summary": summary,
                }),
            )
        }
        Err(e) => session_err(&req.id, &e),
    }
}

fn handle_evaluation_preview(_state: &mut AppState, req: &Request) -> serde_json::Value {
    match parse_scores(req) {
        Ok(scores) => ok(&req.id, json!(calc::summarize(&scores))),
        Err(resp) => resp,
    }
}

fn handle_evaluation_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_mut() else {
        return no_workspace(&req.id);
    };
    let student_id = match student_id_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let scores = match parse_scores(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let draft = EvaluationDraft {
        scores,
        strengths: optional_text(req, "strengths"),
        improvements: optional_text(req, "improvements"),
    };

    match session.save(student_id, draft) {
        Ok(outcome) => ok(&req.id, json!(outcome)),
        Err(e) => session_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "rubric.get" => Some(handle_rubric_get(state, req)),
        "evaluation.open" => Some(handle_evaluation_open(state, req)),
        "evaluation.preview" => Some(handle_evaluation_preview(state, req)),
        "evaluation.save" => Some(handle_evaluation_save(state, req)),
        _ => None,
    }
}
