use crate::calc;
use crate::ipc::error::{no_workspace, ok, session_err};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_ref() else {
        return no_workspace(&req.id);
    };
    let roster = match session.roster() {
        Ok(r) => r,
        Err(e) => return session_err(&req.id, &e),
    };

    let mut evaluated_count = 0;
    let mut students = Vec::with_capacity(roster.len());
    for s in &roster {
        let record = session.record_for(s.id).ok().flatten();
        let mut row = json!({
            "id": s.id,
            "name": s.name,
            "classLevel": s.class_level,
            "room": s.room,
            "evaluated": record.is_some(),
        });
        if let Some(rec) = record {
            evaluated_count += 1;
            let summary = calc::summarize(&rec.scores);
            row["totalScore"] = json!(summary.total);
            row["percentage"] = json!(summary.percentage);
            row["quality"] = json!(summary.quality);
            row["qualityLabel"] = json!(summary.quality_label);
            row["date"] = json!(rec.date);
        }
        students.push(row);
    }

    ok(
        &req.id,
        json!({
            "students": students,
            "evaluatedCount": evaluated_count,
            "studentCount": roster.len(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        _ => None,
    }
}
