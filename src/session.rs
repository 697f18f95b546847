//! Session controller: login, roster, form state and the two-phase save.

use crate::calc::{self, ScoreSummary};
use crate::catalog;
use crate::model::{EvaluationCollection, EvaluationRecord, Scores, Student, Teacher};
use crate::reconcile::{self, ReconcileOutcome};
use crate::remote::{EvaluationRemote, SyncError};
use crate::store::EvaluationStore;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("login first")]
    NotLoggedIn,
    #[error("invalid username or password")]
    BadCredentials,
    #[error("student {0} is not in this class roster")]
    UnknownStudent(u32),
    #[error("rubric incomplete: {answered}/{required} questions answered")]
    Incomplete { answered: usize, required: usize },
}

impl SessionError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotLoggedIn => "not_logged_in",
            Self::BadCredentials => "bad_credentials",
            Self::UnknownStudent(_) => "not_found",
            Self::Incomplete { .. } => "incomplete",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EvaluationDraft {
    pub scores: Scores,
    pub strengths: Option<String>,
    pub improvements: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteFailure {
    pub code: &'static str,
    pub message: String,
}

impl From<&SyncError> for RemoteFailure {
    fn from(e: &SyncError) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub key: String,
    pub sheet_name: String,
    pub local_written: bool,
    pub remote_synced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<RemoteFailure>,
    pub summary: ScoreSummary,
}

pub struct Session {
    store: EvaluationStore,
    remote: Box<dyn EvaluationRemote>,
    teacher: Option<Teacher>,
    selected: Option<Student>,
}

impl Session {
    pub fn new(store: EvaluationStore, remote: Box<dyn EvaluationRemote>) -> Self {
        Self {
            store,
            remote,
            teacher: None,
            selected: None,
        }
    }

    pub fn evaluations(&self) -> &EvaluationCollection {
        self.store.get_all()
    }

    pub fn remote_configured(&self) -> bool {
        self.remote.is_configured()
    }

    pub fn teacher(&self) -> Option<&Teacher> {
        self.teacher.as_ref()
    }

    pub fn selected(&self) -> Option<&Student> {
        self.selected.as_ref()
    }

    /// Starts a session and folds the teacher's remote sheet into the cache.
    pub fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<(Teacher, ReconcileOutcome), SessionError> {
        let teacher =
            catalog::authenticate(username, password).ok_or(SessionError::BadCredentials)?;
        info!(username = %teacher.username, sheet = %teacher.sheet_name(), "teacher logged in");

        let pulled = self.remote.pull(&teacher);
        if let Err(e) = &pulled {
            warn!(error = %e, "remote pull unavailable; keeping local evaluations");
        }
        let (next, mut outcome) = reconcile::reconcile(self.store.get_all(), &teacher, pulled);
        if let Some(next) = next {
            if let Err(e) = self.store.replace_all(next) {
                warn!(error = %e, "failed to persist reconciled evaluations");
                outcome = ReconcileOutcome::Skipped {
                    reason: format!("failed to persist merged evaluations: {e}"),
                };
            }
        }

        self.teacher = Some(teacher.clone());
        self.selected = None;
        Ok((teacher, outcome))
    }

    pub fn logout(&mut self) {
        if let Some(t) = self.teacher.take() {
            info!(username = %t.username, "teacher logged out");
        }
        self.selected = None;
    }

    pub fn roster(&self) -> Result<Vec<Student>, SessionError> {
        let teacher = self.teacher.as_ref().ok_or(SessionError::NotLoggedIn)?;
        Ok(catalog::roster_for(&teacher.class_level, &teacher.room))
    }

    fn find_student(&self, student_id: u32) -> Result<Student, SessionError> {
        self.roster()?
            .into_iter()
            .find(|s| s.id == student_id)
            .ok_or(SessionError::UnknownStudent(student_id))
    }

    pub fn record_for(&self, student_id: u32) -> Result<Option<&EvaluationRecord>, SessionError> {
        let teacher = self.teacher.as_ref().ok_or(SessionError::NotLoggedIn)?;
        Ok(self.store.get(&teacher.key_for(student_id)))
    }

    /// Selects a student and returns the stored record used to pre-fill the form.
    pub fn open_student(
        &mut self,
        student_id: u32,
    ) -> Result<(Student, Option<EvaluationRecord>), SessionError> {
        let student = self.find_student(student_id)?;
        let record = self.record_for(student_id)?.cloned();
        self.selected = Some(student.clone());
        Ok((student, record))
    }

    pub fn save(
        &mut self,
        student_id: u32,
        draft: EvaluationDraft,
    ) -> Result<SaveOutcome, SessionError> {
        self.save_at(student_id, draft, Utc::now())
    }

    /// Local write first, then one remote attempt. A remote failure never
    /// rolls back the local write.
    pub fn save_at(
        &mut self,
        student_id: u32,
        draft: EvaluationDraft,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, SessionError> {
        let teacher = self.teacher.clone().ok_or(SessionError::NotLoggedIn)?;
        let student = self.find_student(student_id)?;

        let answered = calc::answered_count(&draft.scores);
        if !calc::is_complete(&draft.scores) {
            return Err(SessionError::Incomplete {
                answered,
                required: catalog::QUESTION_COUNT,
            });
        }

        let record = EvaluationRecord {
            student_id,
            scores: draft.scores,
            strengths: draft.strengths,
            improvements: draft.improvements,
            evaluator_name: teacher.name.clone(),
            date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let summary = calc::summarize(&record.scores);
        let key = teacher.key_for(student_id);

        let local_written = match self.store.put(&key, record.clone()) {
            Ok(()) => true,
            Err(e) => {
                warn!(%key, error = %e, "local write failed");
                false
            }
        };

        let pushed = self.remote.push(&student, &teacher, &record);
        let remote_error = match &pushed {
            Ok(()) => None,
            Err(e) => {
                warn!(%key, error = %e, "remote save failed; local copy kept");
                Some(RemoteFailure::from(e))
            }
        };
        let remote_synced = pushed.is_ok();
        if remote_synced {
            self.selected = None;
        }

        info!(
            %key,
            total = summary.total,
            local_written,
            remote_synced,
            "evaluation saved"
        );

        Ok(SaveOutcome {
            key: key.to_string(),
            sheet_name: teacher.sheet_name(),
            local_written,
            remote_synced,
            remote_error,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EvaluationKey;
    use crate::remote::RemoteSnapshot;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::tempdir;

    #[derive(Default)]
    struct FakeLog {
        pushes: Vec<(String, u32)>,
        pulls: Vec<String>,
    }

    struct FakeRemote {
        log: Rc<RefCell<FakeLog>>,
        pull_result: Result<RemoteSnapshot, SyncError>,
        push_result: Result<(), SyncError>,
    }

    impl EvaluationRemote for FakeRemote {
        fn push(
            &self,
            _student: &Student,
            teacher: &Teacher,
            record: &EvaluationRecord,
        ) -> Result<(), SyncError> {
            self.log
                .borrow_mut()
                .pushes
                .push((teacher.sheet_name(), record.student_id));
            self.push_result.clone()
        }

        fn pull(&self, teacher: &Teacher) -> Result<RemoteSnapshot, SyncError> {
            self.log.borrow_mut().pulls.push(teacher.sheet_name());
            self.pull_result.clone()
        }
    }

    fn session_with(
        dir: &std::path::Path,
        pull_result: Result<RemoteSnapshot, SyncError>,
        push_result: Result<(), SyncError>,
    ) -> (Session, Rc<RefCell<FakeLog>>) {
        let log = Rc::new(RefCell::new(FakeLog::default()));
        let remote = FakeRemote {
            log: Rc::clone(&log),
            pull_result,
            push_result,
        };
        let store = EvaluationStore::open(dir).expect("open store");
        (Session::new(store, Box::new(remote)), log)
    }

    /// 22 threes, one two, seven zeros: total 68.
    fn scores_totalling_68() -> Scores {
        catalog::question_ids()
            .map(|q| {
                let v = match q {
                    1..=22 => 3,
                    23 => 2,
                    _ => 0,
                };
                (q, v)
            })
            .collect()
    }

    #[test]
    fn save_writes_locally_and_pushes_to_class_sheet() {
        let dir = tempdir().expect("tempdir");
        let (mut session, log) = session_with(dir.path(), Ok(RemoteSnapshot::new()), Ok(()));
        session.login("teacherm4a", "teacherm4a").expect("login");
        session.open_student(5).expect("open");

        let outcome = session
            .save(
                5,
                EvaluationDraft {
                    scores: scores_totalling_68(),
                    ..Default::default()
                },
            )
            .expect("save");

        assert_eq!(outcome.key, "ม.4-A-5");
        assert_eq!(outcome.sheet_name, "ม.4-A");
        assert!(outcome.local_written);
        assert!(outcome.remote_synced);
        assert_eq!(outcome.summary.total, 68);
        assert_eq!(calc::format_percentage(outcome.summary.percentage), "75.56");
        assert_eq!(outcome.summary.quality, calc::QualityLevel::Excellent);
        assert_eq!(log.borrow().pushes, vec![("ม.4-A".to_string(), 5)]);
        assert!(session.selected().is_none());

        let stored = session
            .evaluations()
            .get(&EvaluationKey::new("ม.4", "A", 5))
            .expect("stored");
        assert_eq!(stored.evaluator_name, "ครูสมศรี ใจดี");
    }

    #[test]
    fn incomplete_rubric_writes_nothing_anywhere() {
        let dir = tempdir().expect("tempdir");
        let (mut session, log) = session_with(dir.path(), Ok(RemoteSnapshot::new()), Ok(()));
        session.login("teacherm4a", "teacherm4a").expect("login");

        let mut scores = scores_totalling_68();
        scores.remove(&30);
        let err = session
            .save(
                5,
                EvaluationDraft {
                    scores,
                    ..Default::default()
                },
            )
            .expect_err("incomplete");

        assert_eq!(
            err,
            SessionError::Incomplete {
                answered: 29,
                required: 30
            }
        );
        assert!(log.borrow().pushes.is_empty());
        assert!(session.evaluations().is_empty());
    }

    #[test]
    fn remote_failure_keeps_local_write() {
        let dir = tempdir().expect("tempdir");
        let (mut session, _log) = session_with(
            dir.path(),
            Err(SyncError::NotConfigured),
            Err(SyncError::Server("quota".to_string())),
        );
        session.login("teacherm4a", "teacherm4a").expect("login");
        session.open_student(2).expect("open");

        let outcome = session
            .save(
                2,
                EvaluationDraft {
                    scores: scores_totalling_68(),
                    ..Default::default()
                },
            )
            .expect("save");

        assert!(outcome.local_written);
        assert!(!outcome.remote_synced);
        assert_eq!(
            outcome.remote_error.map(|e| e.code),
            Some("server_error")
        );
        assert!(session.selected().is_some());
        assert!(session.evaluations().contains_raw("ม.4-A-2"));
    }

    #[test]
    fn login_merges_remote_and_persists() {
        let dir = tempdir().expect("tempdir");
        {
            let mut store = EvaluationStore::open(dir.path()).expect("open");
            store
                .put(
                    &EvaluationKey::new("ม.5", "A", 7),
                    EvaluationRecord {
                        student_id: 7,
                        scores: Scores::new(),
                        strengths: None,
                        improvements: None,
                        evaluator_name: String::new(),
                        date: String::new(),
                    },
                )
                .expect("seed");
        }
        let remote = RemoteSnapshot::from([(
            3,
            EvaluationRecord {
                student_id: 3,
                scores: Scores::from([(1, 2)]),
                strengths: None,
                improvements: None,
                evaluator_name: "ครู".to_string(),
                date: String::new(),
            },
        )]);
        let (mut session, log) = session_with(dir.path(), Ok(remote), Ok(()));
        let (_, outcome) = session.login("teacherm5a", "teacherm5a").expect("login");

        assert_eq!(log.borrow().pulls, vec!["ม.5-A".to_string()]);
        assert_eq!(outcome, ReconcileOutcome::Merged { merged: 1, added: 1 });
        drop(session);

        let reopened = EvaluationStore::open(dir.path()).expect("reopen");
        assert!(reopened.get_all().contains_raw("ม.5-A-3"));
        assert!(reopened.get_all().contains_raw("ม.5-A-7"));
    }

    #[test]
    fn bad_credentials_and_foreign_students_are_rejected() {
        let dir = tempdir().expect("tempdir");
        let (mut session, log) = session_with(dir.path(), Ok(RemoteSnapshot::new()), Ok(()));
        assert_eq!(
            session.login("teacherm4a", "nope").map(|_| ()),
            Err(SessionError::BadCredentials)
        );
        assert!(log.borrow().pulls.is_empty());
        assert_eq!(session.roster().map(|_| ()), Err(SessionError::NotLoggedIn));

        session.login("teacherm6a", "teacherm6a").expect("login");
        assert_eq!(
            session.open_student(99).map(|_| ()),
            Err(SessionError::UnknownStudent(99))
        );
        session.logout();
        assert!(session.teacher().is_none());
    }
}
