//! Write-through local cache of evaluation records.

use crate::db;
use crate::model::{EvaluationCollection, EvaluationKey, EvaluationRecord};
use anyhow::Context;
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, warn};

pub const EVALUATIONS_SLOT: &str = "lifeSkillsEvaluations";

pub struct EvaluationStore {
    conn: Connection,
    evaluations: EvaluationCollection,
}

impl EvaluationStore {
    /// Opens the workspace database and hydrates the in-memory view.
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        let conn = db::open_db(workspace)
            .with_context(|| format!("failed to open store in {}", workspace.display()))?;
        let evaluations = load(&conn);
        Ok(Self { conn, evaluations })
    }

    pub fn get_all(&self) -> &EvaluationCollection {
        &self.evaluations
    }

    pub fn get(&self, key: &EvaluationKey) -> Option<&EvaluationRecord> {
        self.evaluations.get(key)
    }

    /// Inserts or overwrites one record and re-persists the whole collection.
    /// The in-memory view changes only once the slot write has succeeded.
    pub fn put(&mut self, key: &EvaluationKey, record: EvaluationRecord) -> anyhow::Result<()> {
        let mut next = self.evaluations.clone();
        next.insert(key, record);
        persist(&self.conn, &next)?;
        self.evaluations = next;
        debug!(%key, count = self.evaluations.len(), "evaluation persisted");
        Ok(())
    }

    pub fn replace_all(&mut self, evaluations: EvaluationCollection) -> anyhow::Result<()> {
        persist(&self.conn, &evaluations)?;
        self.evaluations = evaluations;
        Ok(())
    }
}

/// Reads the persisted blob. Missing or unparseable data yields an empty
/// collection rather than an error.
pub fn load(conn: &Connection) -> EvaluationCollection {
    let raw = match db::slot_get(conn, EVALUATIONS_SLOT) {
        Ok(Some(v)) => v,
        Ok(None) => return EvaluationCollection::new(),
        Err(e) => {
            warn!(error = %e, "failed to read evaluation slot; starting empty");
            return EvaluationCollection::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "evaluation slot is not valid JSON; starting empty");
            EvaluationCollection::new()
        }
    }
}

fn persist(conn: &Connection, evaluations: &EvaluationCollection) -> anyhow::Result<()> {
    let blob = serde_json::to_string(evaluations).context("failed to serialize evaluations")?;
    db::slot_set(conn, EVALUATIONS_SLOT, &blob).context("failed to write evaluation slot")
}
