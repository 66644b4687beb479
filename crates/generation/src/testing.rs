//! Scripted render service for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use imaging::{
    JobHandle, JobStatus, JobUid, ModificationSet, RenderError, RenderService, TemplateId,
    Timestamp,
};
use tokio::time::Instant;

enum SubmitScript {
    Accept(String),
    Reject(RenderError),
}

#[derive(Default)]
struct JobScript {
    statuses: VecDeque<Result<JobStatus, RenderError>>,
    checks: Vec<Instant>,
}

/// Fake [`RenderService`] driven by per-template scripts.
///
/// Each template either rejects submission or accepts it under a fixed job uid.
/// Status checks for that uid pop the scripted responses in order; once the
/// script is exhausted every further check reports `pending`.
#[derive(Default)]
pub(crate) struct ScriptedRenderService {
    templates: Mutex<HashMap<String, SubmitScript>>,
    jobs: Mutex<HashMap<String, JobScript>>,
    submissions: Mutex<Vec<(String, ModificationSet)>>,
}

impl ScriptedRenderService {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Accepts `template` as job `uid`, answering status checks from `statuses`.
    pub(crate) fn accept(
        self,
        template: &str,
        uid: &str,
        statuses: Vec<Result<JobStatus, RenderError>>,
    ) -> Self {
        self.templates
            .lock()
            .unwrap()
            .insert(template.into(), SubmitScript::Accept(uid.into()));
        self.jobs.lock().unwrap().insert(
            uid.into(),
            JobScript {
                statuses: statuses.into(),
                checks: Vec::new(),
            },
        );
        self
    }

    /// Rejects submissions of `template` with `error`.
    pub(crate) fn reject(self, template: &str, error: RenderError) -> Self {
        self.templates
            .lock()
            .unwrap()
            .insert(template.into(), SubmitScript::Reject(error));
        self
    }

    /// Instants at which `uid` was checked.
    pub(crate) fn checks(&self, uid: &str) -> Vec<Instant> {
        self.jobs
            .lock()
            .unwrap()
            .get(uid)
            .map(|job| job.checks.clone())
            .unwrap_or_default()
    }

    /// Templates submitted so far, with the modification set each carried.
    pub(crate) fn submissions(&self) -> Vec<(String, ModificationSet)> {
        self.submissions.lock().unwrap().clone()
    }
}

pub(crate) fn completed(url: &str) -> Result<JobStatus, RenderError> {
    Ok(JobStatus::Completed {
        image_url: Some(url.into()),
    })
}

pub(crate) fn pending() -> Result<JobStatus, RenderError> {
    Ok(JobStatus::Pending)
}

pub(crate) fn failed(message: &str) -> Result<JobStatus, RenderError> {
    Ok(JobStatus::Failed {
        error: Some(message.into()),
    })
}

pub(crate) fn not_found(uid: &str) -> Result<JobStatus, RenderError> {
    Err(RenderError::JobNotFound { uid: uid.into() })
}

#[async_trait]
impl RenderService for ScriptedRenderService {
    async fn submit(
        &self,
        template_id: &TemplateId,
        modifications: &ModificationSet,
    ) -> Result<JobHandle, RenderError> {
        self.submissions
            .lock()
            .unwrap()
            .push((template_id.to_string(), modifications.clone()));

        match self.templates.lock().unwrap().get(template_id.as_str()) {
            Some(SubmitScript::Accept(uid)) => Ok(JobHandle {
                uid: JobUid::new(uid.as_str()).unwrap(),
                submitted_at: Timestamp::now(),
            }),
            Some(SubmitScript::Reject(err)) => Err(err.clone()),
            None => Err(RenderError::TemplateNotFound {
                template_id: template_id.to_string(),
            }),
        }
    }

    async fn check_status(&self, uid: &JobUid) -> Result<JobStatus, RenderError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs.entry(uid.to_string()).or_default();
        job.checks.push(Instant::now());
        job.statuses.pop_front().unwrap_or(Ok(JobStatus::Pending))
    }
}
