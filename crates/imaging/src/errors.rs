//! Error types for the imaging domain.
//!
//! Errors are layered the same way the work is:
//!
//! - [`RenderError`]: one job against the render service (submit, status check,
//!   polling). Never crosses the fan-out boundary: the orchestrator turns it
//!   into a format-qualified failure entry.
//! - [`GenerationError`]: one fan-out call as a whole.
//! - [`StoreError`]: collaborator persistence ports.
//! - [`ModificationError`]: construction of modification values.

use std::time::Duration;

use thiserror::Error;

use crate::FormatFailure;

// ---------------------------------------------------------------------------
// Per-job errors
// ---------------------------------------------------------------------------

/// Failure of a single rendering job.
///
/// The first five variants are produced by the render service adapter; the
/// last two by the status poller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The service rejected the configured credential (HTTP 401).
    #[error("invalid render service API key")]
    Auth,

    /// Submission named a template the service does not know (HTTP 404 on submit).
    #[error("template not found: {template_id}")]
    TemplateNotFound {
        /// The template identifier that was rejected.
        template_id: String,
    },

    /// A status check could not find the job (HTTP 404 on status).
    ///
    /// Newly created jobs are not always queryable straight away, so the poller
    /// treats this one as "still pending" rather than fatal.
    #[error("job not found: {uid}")]
    JobNotFound {
        /// The job identifier that was queried.
        uid: String,
    },

    /// The service rejected the modification set (HTTP 422).
    #[error("validation error: {message}")]
    Validation {
        /// Service-supplied description of the problem.
        message: String,
    },

    /// Network failure or any other non-success HTTP status.
    #[error("render service error ({}): {message}", status_label(.status))]
    Transient {
        /// HTTP status, or `None` when no response was received.
        status: Option<u16>,
        /// Description of the failure.
        message: String,
    },

    /// The service answered with a success status but an unusable body.
    #[error("invalid render service response: {message}")]
    InvalidResponse {
        /// What was wrong with the body.
        message: String,
    },

    /// The job reached the remote `failed` state.
    #[error("image generation failed: {message}")]
    RemoteFailure {
        /// Remote error message (or a generic one when the service gave none).
        message: String,
    },

    /// The polling budget ran out before the job reached a terminal state.
    #[error("image generation timed out after {} seconds", .elapsed.as_secs_f64())]
    TimedOut {
        /// Number of status checks made.
        attempts: u32,
        /// Polling budget that was exhausted.
        elapsed: Duration,
    },
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "network".to_string(), |s| s.to_string())
}

// ---------------------------------------------------------------------------
// Fan-out errors
// ---------------------------------------------------------------------------

/// Failure of a fan-out call as a whole.
///
/// Partial failure is not an error: it is reported through
/// [`crate::GenerationOutcome::failures`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The request listed no formats.
    #[error("no output formats requested")]
    NoFormats,

    /// The request listed the same format more than once. Nothing was submitted.
    #[error("format '{format}' requested more than once")]
    DuplicateFormat {
        /// The repeated format name.
        format: String,
    },

    /// Every format failed.
    #[error("all image generations failed: {}", join_failures(.failures))]
    AllFailed {
        /// One entry per requested format.
        failures: Vec<FormatFailure>,
    },
}

fn join_failures(failures: &[FormatFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

/// Failure reported by a persistence port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing store could not be reached or rejected the operation.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Backend-supplied description.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Construction errors
// ---------------------------------------------------------------------------

/// A string identifier was empty or whitespace only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} must not be blank")]
pub struct BlankIdentifier {
    /// Name of the identifier type.
    pub kind: &'static str,
}

/// A modification (or set of modifications) violated its shape rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModificationError {
    #[error("modification for layer '{layer}' carries both text and an image URL")]
    AmbiguousContent { layer: String },

    #[error("modification for layer '{layer}' carries no content")]
    MissingContent { layer: String },

    #[error("layer '{layer}' is modified more than once")]
    DuplicateLayer { layer: String },
}
