//! Fan-out orchestrator: one submit-and-poll sequence per requested format,
//! all running concurrently, aggregated into a [`GenerationOutcome`].
//!
//! Every per-format future is joined, never raced: one format failing (or
//! timing out) neither cancels nor alters any other format's outcome. Per-job
//! errors stop here and become `"<format>: <reason>"` entries; only a request
//! where every format failed is reported as an error.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use imaging::{
    FormatOutcome, FormatRequest, FormatResult, GenerationError, GenerationOutcome,
    GenerationRunId, JobUid, ModificationSet, RenderError, RenderService,
};
use tracing::{info, info_span, instrument, warn, Instrument};

use crate::poller::{PollPolicy, StatusPoller};

/// Renders a modification set against several templates at once.
///
/// Constructed once with an explicitly owned render service and shared by all
/// callers; holds no per-request state.
#[derive(Clone)]
pub struct ImageGenerator {
    service: Arc<dyn RenderService>,
    policy: PollPolicy,
}

impl ImageGenerator {
    /// Creates a generator that polls every job with `policy`.
    pub fn new(service: Arc<dyn RenderService>, policy: PollPolicy) -> Self {
        Self { service, policy }
    }

    /// The polling policy applied to each job.
    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Submits and polls one job per format concurrently.
    ///
    /// Returns once every format has reached a terminal outcome. Each requested
    /// format appears exactly once in the result, in `successes` or `failures`,
    /// in request order.
    ///
    /// # Errors
    ///
    /// - [`GenerationError::NoFormats`] for an empty request.
    /// - [`GenerationError::DuplicateFormat`] if a format is listed twice;
    ///   nothing is submitted in either case.
    /// - [`GenerationError::AllFailed`] if no format succeeded.
    pub async fn generate_all(
        &self,
        formats: &[FormatRequest],
        modifications: &ModificationSet,
    ) -> Result<GenerationOutcome, GenerationError> {
        check_formats(formats)?;

        let run_id = GenerationRunId::new_random();
        let span = info_span!("generate_all", run_id = %run_id, formats = formats.len());

        async {
            let results = join_all(
                formats
                    .iter()
                    .map(|request| self.render_format(request, modifications)),
            )
            .await;

            let outcome = GenerationOutcome::from_results(results);
            if outcome.successes.is_empty() {
                warn!(failed = outcome.failures.len(), "All formats failed");
                return Err(GenerationError::AllFailed {
                    failures: outcome.failures,
                });
            }

            info!(
                succeeded = outcome.successes.len(),
                failed = outcome.failures.len(),
                "Generation finished"
            );
            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    async fn render_format(
        &self,
        request: &FormatRequest,
        modifications: &ModificationSet,
    ) -> FormatResult {
        let outcome = match self.render(request, modifications).await {
            Ok((job_uid, url)) => FormatOutcome::Success {
                url,
                job_uid,
                template_id: request.template_id.clone(),
            },
            Err(err) => {
                warn!(format = %request.format, error = %err, "Format failed");
                FormatOutcome::Failure {
                    reason: err.to_string(),
                }
            }
        };

        FormatResult {
            format: request.format.clone(),
            outcome,
        }
    }

    #[instrument(skip_all, fields(format = %request.format, template = %request.template_id))]
    async fn render(
        &self,
        request: &FormatRequest,
        modifications: &ModificationSet,
    ) -> Result<(JobUid, String), RenderError> {
        let handle = self
            .service
            .submit(&request.template_id, modifications)
            .await?;
        info!(uid = %handle.uid, submitted_at = %handle.submitted_at, "Job submitted");

        let url = StatusPoller::new(self.service.as_ref(), self.policy)
            .wait_for_image(&handle.uid)
            .await?;
        Ok((handle.uid, url))
    }
}

fn check_formats(formats: &[FormatRequest]) -> Result<(), GenerationError> {
    if formats.is_empty() {
        return Err(GenerationError::NoFormats);
    }

    let mut seen = HashSet::with_capacity(formats.len());
    for request in formats {
        if !seen.insert(&request.format) {
            return Err(GenerationError::DuplicateFormat {
                format: request.format.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use imaging::{FormatName, LayerName, Modification, TemplateId};
    use tokio::time::Instant;

    use super::*;
    use crate::testing::{completed, failed, pending, ScriptedRenderService};

    fn request(format: &str, template: &str) -> FormatRequest {
        FormatRequest::new(
            FormatName::new(format).unwrap(),
            TemplateId::new(template).unwrap(),
        )
    }

    fn three_formats() -> Vec<FormatRequest> {
        vec![
            request("stories_9x16", "tpl-stories"),
            request("feed_4x5", "tpl-45"),
            request("feed_1x1", "tpl-11"),
        ]
    }

    fn modifications() -> ModificationSet {
        let mut set = ModificationSet::new();
        set.insert(Modification::text(
            LayerName::new("headline").unwrap(),
            "Storm Damage?",
        ));
        set
    }

    fn generator(service: &Arc<ScriptedRenderService>) -> ImageGenerator {
        ImageGenerator::new(service.clone(), PollPolicy::default())
    }

    #[tokio::test(start_paused = true)]
    async fn every_format_succeeds() {
        let service = Arc::new(
            ScriptedRenderService::new()
                .accept("tpl-stories", "job-s", vec![completed("https://img/s.png")])
                .accept("tpl-45", "job-45", vec![pending(), completed("https://img/45.png")])
                .accept("tpl-11", "job-11", vec![completed("https://img/11.png")]),
        );

        let outcome = generator(&service)
            .generate_all(&three_formats(), &modifications())
            .await
            .unwrap();

        assert_eq!(outcome.len(), 3);
        assert!(outcome.failures.is_empty());
        let summary: Vec<_> = outcome
            .successes
            .iter()
            .map(|img| (img.format.as_str(), img.url.as_str(), img.job_uid.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("stories_9x16", "https://img/s.png", "job-s"),
                ("feed_4x5", "https://img/45.png", "job-45"),
                ("feed_1x1", "https://img/11.png", "job-11"),
            ]
        );
        assert_eq!(outcome.successes[1].template_id.as_str(), "tpl-45");

        let submissions = service.submissions();
        assert_eq!(submissions.len(), 3);
        assert!(submissions.iter().all(|(_, mods)| *mods == modifications()));
    }

    #[tokio::test(start_paused = true)]
    async fn one_remote_failure_leaves_other_formats_intact() {
        let service = Arc::new(
            ScriptedRenderService::new()
                .accept("tpl-stories", "job-s", vec![completed("https://img/s.png")])
                .accept("tpl-45", "job-45", vec![pending(), failed("layer not found")])
                .accept("tpl-11", "job-11", vec![pending(), pending(), completed("https://img/11.png")]),
        );

        let outcome = generator(&service)
            .generate_all(&three_formats(), &modifications())
            .await
            .unwrap();

        assert_eq!(outcome.successes.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        let message = outcome.failures[0].to_string();
        assert!(message.contains("feed_4x5"), "{message}");
        assert!(message.contains("layer not found"), "{message}");
        assert!(outcome
            .successes
            .iter()
            .all(|img| img.format.as_str() != "feed_4x5"));
    }

    #[tokio::test(start_paused = true)]
    async fn all_submits_rejected_is_a_total_failure() {
        let service = Arc::new(
            ScriptedRenderService::new()
                .reject(
                    "tpl-stories",
                    RenderError::TemplateNotFound {
                        template_id: "tpl-stories".into(),
                    },
                )
                .reject("tpl-45", RenderError::Auth)
                .reject(
                    "tpl-11",
                    RenderError::Validation {
                        message: "unknown layer 'badge'".into(),
                    },
                ),
        );

        let err = generator(&service)
            .generate_all(&three_formats(), &modifications())
            .await
            .unwrap_err();

        let GenerationError::AllFailed { failures } = &err else {
            panic!("expected AllFailed, got {err:?}");
        };
        assert_eq!(failures.len(), 3);

        let message = err.to_string();
        assert!(message.starts_with("all image generations failed: "));
        for expected in [
            "stories_9x16: template not found: tpl-stories",
            "feed_4x5: invalid render service API key",
            "feed_1x1: validation error: unknown layer 'badge'",
        ] {
            assert!(message.contains(expected), "missing '{expected}' in {message}");
        }
        assert_eq!(service.submissions().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_format_does_not_delay_fast_ones() {
        let service = Arc::new(
            ScriptedRenderService::new()
                .accept("tpl-stories", "job-s", Vec::new())
                .accept("tpl-45", "job-45", vec![completed("https://img/45.png")])
                .accept("tpl-11", "job-11", vec![completed("https://img/11.png")]),
        );
        let start = Instant::now();

        let outcome = generator(&service)
            .generate_all(&three_formats(), &modifications())
            .await
            .unwrap();

        // Wall time is the slowest job's budget, not the sum of all jobs.
        assert_eq!(start.elapsed(), Duration::from_secs(90));
        assert_eq!(service.checks("job-s").len(), 45);
        assert_eq!(service.checks("job-45")[0] - start, Duration::from_secs(2));
        assert_eq!(service.checks("job-11")[0] - start, Duration::from_secs(2));

        assert_eq!(outcome.successes.len(), 2);
        assert_eq!(
            outcome.failure_messages(),
            vec!["stories_9x16: image generation timed out after 90 seconds"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn every_format_is_accounted_for_exactly_once() {
        for n in 1..=5 {
            let mut service = ScriptedRenderService::new();
            let mut formats = Vec::new();
            for i in 0..n {
                let template = format!("tpl-{i}");
                service = if i % 2 == 0 {
                    service.accept(&template, &format!("job-{i}"), vec![completed("https://img")])
                } else {
                    service.reject(&template, RenderError::Auth)
                };
                formats.push(request(&format!("format-{i}"), &template));
            }

            let outcome = generator(&Arc::new(service))
                .generate_all(&formats, &modifications())
                .await
                .unwrap();

            assert_eq!(outcome.len(), n);
            let mut seen: Vec<_> = outcome
                .successes
                .iter()
                .map(|img| img.format.to_string())
                .chain(outcome.failures.iter().map(|f| f.format.to_string()))
                .collect();
            seen.sort();
            let mut expected: Vec<_> = (0..n).map(|i| format!("format-{i}")).collect();
            expected.sort();
            assert_eq!(seen, expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_format_is_rejected_before_submitting() {
        let service = Arc::new(
            ScriptedRenderService::new().accept("tpl-a", "job-a", vec![completed("https://img")]),
        );
        let formats = vec![request("feed_1x1", "tpl-a"), request("feed_1x1", "tpl-b")];

        let err = generator(&service)
            .generate_all(&formats, &modifications())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GenerationError::DuplicateFormat {
                format: "feed_1x1".into()
            }
        );
        assert!(service.submissions().is_empty());
    }

    #[tokio::test]
    async fn empty_request_is_rejected() {
        let service = Arc::new(ScriptedRenderService::new());

        let err = generator(&service)
            .generate_all(&[], &modifications())
            .await
            .unwrap_err();

        assert_eq!(err, GenerationError::NoFormats);
    }
}
