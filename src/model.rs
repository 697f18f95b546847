use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Question id -> score (0..=3). Absent ids are "not yet answered".
pub type Scores = BTreeMap<u32, u8>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: u32,
    pub name: String,
    pub class_level: String,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub username: String,
    pub name: String,
    pub class_level: String,
    pub room: String,
}

impl Teacher {
    /// Remote partition for this teacher's class/room, e.g. `ม.4-A`.
    pub fn sheet_name(&self) -> String {
        sheet_name(&self.class_level, &self.room)
    }

    pub fn key_for(&self, student_id: u32) -> EvaluationKey {
        EvaluationKey::new(&self.class_level, &self.room, student_id)
    }
}

pub fn sheet_name(class_level: &str, room: &str) -> String {
    format!("{class_level}-{room}")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: u32,
    pub text: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Indicator {
    pub id: u32,
    pub title: &'static str,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    pub student_id: u32,
    #[serde(default)]
    pub scores: Scores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strengths: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvements: Option<String>,
    #[serde(default)]
    pub evaluator_name: String,
    /// ISO-8601 timestamp of the last save.
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EvaluationKey {
    pub class_level: String,
    pub room: String,
    pub student_id: u32,
}

impl EvaluationKey {
    pub fn new(class_level: &str, room: &str, student_id: u32) -> Self {
        Self {
            class_level: class_level.to_string(),
            room: room.to_string(),
            student_id,
        }
    }
}

impl fmt::Display for EvaluationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.class_level, self.room, self.student_id)
    }
}

/// Full local cache state. Serialized as a JSON object keyed by the
/// rendered [`EvaluationKey`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationCollection {
    records: BTreeMap<String, EvaluationRecord>,
}

impl EvaluationCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &EvaluationKey) -> Option<&EvaluationRecord> {
        self.records.get(&key.to_string())
    }

    pub fn insert(&mut self, key: &EvaluationKey, record: EvaluationRecord) {
        self.records.insert(key.to_string(), record);
    }

    pub fn contains(&self, key: &EvaluationKey) -> bool {
        self.records.contains_key(&key.to_string())
    }

    #[cfg(test)]
    pub fn contains_raw(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
