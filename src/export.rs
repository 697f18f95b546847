use crate::calc;
use crate::catalog::{self, SCHOOL_NAME};
use crate::model::{EvaluationCollection, EvaluationRecord, Student, Teacher};
use crate::xlsx::{self, Cell};
use chrono::{DateTime, Datelike};
use std::path::{Path, PathBuf};
use tracing::info;

pub const ABSENT: &str = "-";
pub const SHEET_TITLE: &str = "ผลการประเมิน";

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Title block (school, report title, teacher) followed by a blank row.
    pub preamble: Vec<String>,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

pub fn default_file_name(teacher: &Teacher) -> String {
    format!(
        "LifeSkills_Evaluation_{}{}.xlsx",
        teacher.class_level, teacher.room
    )
}

pub fn header() -> Vec<String> {
    let mut h: Vec<String> = [
        "เลขที่",
        "ชื่อ-นามสกุล",
        "ระดับชั้น",
        "ห้อง",
        "ผู้ประเมิน",
        "วันที่ประเมิน",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    h.extend(catalog::question_ids().map(|q| format!("ข้อ {q}")));
    h.extend(
        [
            "คะแนนรวม (90)",
            "ร้อยละ (%)",
            "ระดับคุณภาพ",
            "จุดเด่น",
            "จุดที่ควรพัฒนา",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    h
}

/// One row per rostered student, in roster order.
pub fn build_report(
    teacher: &Teacher,
    roster: &[Student],
    evaluations: &EvaluationCollection,
) -> Report {
    let rows = roster
        .iter()
        .map(|s| student_row(s, evaluations.get(&teacher.key_for(s.id))))
        .collect();
    Report {
        preamble: vec![
            SCHOOL_NAME.to_string(),
            format!(
                "รายงานผลการประเมินทักษะชีวิต ชั้น {} ห้อง {}",
                teacher.class_level, teacher.room
            ),
            format!("ครูประจำชั้น: {}", teacher.name),
            String::new(),
        ],
        header: header(),
        rows,
    }
}

fn student_row(student: &Student, record: Option<&EvaluationRecord>) -> Vec<Cell> {
    let mut row = vec![
        Cell::Number(f64::from(student.id)),
        Cell::text(&student.name),
        Cell::text(&student.class_level),
        Cell::text(&student.room),
    ];

    let Some(record) = record else {
        // evaluator, date, 30 questions, total, percentage, quality, strengths, improvements
        let absent = 2 + catalog::QUESTION_COUNT + 5;
        row.extend(std::iter::repeat_with(|| Cell::text(ABSENT)).take(absent));
        return row;
    };

    row.push(Cell::text(&record.evaluator_name));
    row.push(Cell::text(thai_date(&record.date)));
    for q in catalog::question_ids() {
        row.push(match record.scores.get(&q) {
            Some(v) => Cell::Number(f64::from(*v)),
            None => Cell::text(ABSENT),
        });
    }

    let total = calc::total(&record.scores);
    let pct = calc::percentage(total);
    row.push(Cell::Number(f64::from(total)));
    row.push(Cell::text(calc::format_percentage(pct)));
    row.push(Cell::text(calc::quality_level(pct).label()));
    row.push(Cell::text(or_absent(record.strengths.as_deref())));
    row.push(Cell::text(or_absent(record.improvements.as_deref())));
    row
}

fn or_absent(v: Option<&str>) -> &str {
    match v {
        Some(s) if !s.trim().is_empty() => s,
        _ => ABSENT,
    }
}

/// Buddhist-era `d/m/yyyy`, as Thai locale dates are shown. Unparseable
/// timestamps pass through unchanged.
pub fn thai_date(iso: &str) -> String {
    match DateTime::parse_from_rfc3339(iso) {
        Ok(dt) => format!("{}/{}/{}", dt.day(), dt.month(), dt.year() + 543),
        Err(_) => iso.to_string(),
    }
}

pub fn write_report(report: &Report, out_path: &Path) -> anyhow::Result<()> {
    let mut rows: Vec<Vec<Cell>> = report
        .preamble
        .iter()
        .map(|line| {
            if line.is_empty() {
                Vec::new()
            } else {
                vec![Cell::text(line)]
            }
        })
        .collect();
    rows.push(report.header.iter().map(Cell::text).collect());
    rows.extend(report.rows.iter().cloned());

    let width = report.header.len();
    let merges: Vec<xlsx::Merge> = (0..3)
        .map(|r| xlsx::Merge {
            row: r,
            first_col: 0,
            last_col: width - 1,
        })
        .collect();

    xlsx::write_workbook(out_path, SHEET_TITLE, &rows, &merges)
}

pub fn export_class(
    teacher: &Teacher,
    roster: &[Student],
    evaluations: &EvaluationCollection,
    out_path: &Path,
) -> anyhow::Result<(PathBuf, usize)> {
    let report = build_report(teacher, roster, evaluations);
    write_report(&report, out_path)?;
    info!(path = %out_path.display(), rows = report.rows.len(), "report exported");
    Ok((out_path.to_path_buf(), report.rows.len()))
}
