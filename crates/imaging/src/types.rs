//! Shared value types for rendering jobs and their outcomes.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! invariants (a modification holds exactly one kind of content, a modification
//! set never holds two entries for one layer) and flow between the orchestrator
//! and the render service port.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FormatName, JobUid, LayerName, ModificationError, TemplateId};

// ---------------------------------------------------------------------------
// Modifications
// ---------------------------------------------------------------------------

/// The content a [`Modification`] substitutes into its layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModificationContent {
    /// Replacement text for a text layer.
    Text(String),
    /// URL of an image to place in an image layer.
    ImageUrl(String),
}

/// One named content substitution applied to a template instance.
///
/// Serialises to the render service wire shape: `{"name": ..., "text": ...}` or
/// `{"name": ..., "image_url": ...}`. Deserialising an entry that carries both
/// or neither content field fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ModificationWire", into = "ModificationWire")]
pub struct Modification {
    /// Template layer this modification targets.
    pub name: LayerName,
    /// Content substituted into the layer.
    pub content: ModificationContent,
}

impl Modification {
    /// Creates a text modification.
    pub fn text(name: LayerName, text: impl Into<String>) -> Self {
        Self {
            name,
            content: ModificationContent::Text(text.into()),
        }
    }

    /// Creates an image modification.
    pub fn image(name: LayerName, image_url: impl Into<String>) -> Self {
        Self {
            name,
            content: ModificationContent::ImageUrl(image_url.into()),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ModificationWire {
    name: LayerName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

impl TryFrom<ModificationWire> for Modification {
    type Error = ModificationError;

    fn try_from(wire: ModificationWire) -> Result<Self, Self::Error> {
        let content = match (wire.text, wire.image_url) {
            (Some(text), None) => ModificationContent::Text(text),
            (None, Some(url)) => ModificationContent::ImageUrl(url),
            (Some(_), Some(_)) => {
                return Err(ModificationError::AmbiguousContent {
                    layer: wire.name.to_string(),
                })
            }
            (None, None) => {
                return Err(ModificationError::MissingContent {
                    layer: wire.name.to_string(),
                })
            }
        };
        Ok(Self {
            name: wire.name,
            content,
        })
    }
}

impl From<Modification> for ModificationWire {
    fn from(m: Modification) -> Self {
        let (text, image_url) = match m.content {
            ModificationContent::Text(t) => (Some(t), None),
            ModificationContent::ImageUrl(u) => (None, Some(u)),
        };
        Self {
            name: m.name,
            text,
            image_url,
        }
    }
}

// ---------------------------------------------------------------------------

/// A set of modifications keyed by layer name.
///
/// Order is irrelevant to the render service; iteration is in layer-name order
/// so that request bodies are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Modification>", into = "Vec<Modification>")]
pub struct ModificationSet(BTreeMap<LayerName, ModificationContent>);

impl ModificationSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a modification, returning the content it replaced, if any.
    pub fn insert(&mut self, modification: Modification) -> Option<ModificationContent> {
        self.0.insert(modification.name, modification.content)
    }

    /// Returns the content for `layer`, if present.
    pub fn get(&self, layer: &LayerName) -> Option<&ModificationContent> {
        self.0.get(layer)
    }

    /// Number of layers modified.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set holds no modifications.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the modifications in layer-name order.
    pub fn iter(&self) -> impl Iterator<Item = Modification> + '_ {
        self.0.iter().map(|(name, content)| Modification {
            name: name.clone(),
            content: content.clone(),
        })
    }
}

impl TryFrom<Vec<Modification>> for ModificationSet {
    type Error = ModificationError;

    /// Builds a set from a list, rejecting lists that target one layer twice.
    fn try_from(modifications: Vec<Modification>) -> Result<Self, Self::Error> {
        let mut set = Self::new();
        for m in modifications {
            let layer = m.name.to_string();
            if set.insert(m).is_some() {
                return Err(ModificationError::DuplicateLayer { layer });
            }
        }
        Ok(set)
    }
}

impl From<ModificationSet> for Vec<Modification> {
    fn from(set: ModificationSet) -> Self {
        set.0
            .into_iter()
            .map(|(name, content)| Modification { name, content })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// One requested output: a format and the template that renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRequest {
    /// Output format name; unique within one request.
    pub format: FormatName,
    /// Template rendering this format.
    pub template_id: TemplateId,
}

impl FormatRequest {
    /// Creates a new [`FormatRequest`].
    pub fn new(format: FormatName, template_id: TemplateId) -> Self {
        Self {
            format,
            template_id,
        }
    }
}

/// Handle for a job accepted by the render service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    /// Remote job identifier used for status checks.
    pub uid: JobUid,
    /// When the remote service recorded the job.
    pub submitted_at: Timestamp,
}

/// Remote job state as observed by one status check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    /// Rendering has not finished.
    Pending,
    /// Rendering finished. The URL may still be absent for a short while after
    /// the state flips.
    Completed {
        /// Final image URL, once published.
        image_url: Option<String>,
    },
    /// Rendering failed remotely.
    Failed {
        /// Remote error message, if the service supplied one.
        error: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// A format that rendered successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedImage {
    /// Format this image was requested for.
    pub format: FormatName,
    /// Final image URL.
    pub url: String,
    /// Remote job that produced the image.
    pub job_uid: JobUid,
    /// Template the image was rendered from.
    pub template_id: TemplateId,
}

/// A format that failed, with the reason already rendered to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatFailure {
    /// Format whose job failed.
    pub format: FormatName,
    /// Human-readable reason.
    pub reason: String,
}

impl std::fmt::Display for FormatFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.format, self.reason)
    }
}

/// Outcome of one format's submit-and-poll sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FormatOutcome {
    Success {
        url: String,
        job_uid: JobUid,
        template_id: TemplateId,
    },
    Failure {
        reason: String,
    },
}

/// The unit the orchestrator emits per requested format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatResult {
    pub format: FormatName,
    pub outcome: FormatOutcome,
}

/// Aggregate result of one fan-out call.
///
/// Holds every requested format exactly once, either in `successes` or in
/// `failures`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub successes: Vec<RenderedImage>,
    pub failures: Vec<FormatFailure>,
}

impl GenerationOutcome {
    /// Partitions per-format results, preserving their relative order.
    pub fn from_results(results: impl IntoIterator<Item = FormatResult>) -> Self {
        let mut outcome = Self::default();
        for result in results {
            match result.outcome {
                FormatOutcome::Success {
                    url,
                    job_uid,
                    template_id,
                } => outcome.successes.push(RenderedImage {
                    format: result.format,
                    url,
                    job_uid,
                    template_id,
                }),
                FormatOutcome::Failure { reason } => outcome.failures.push(FormatFailure {
                    format: result.format,
                    reason,
                }),
            }
        }
        outcome
    }

    /// Total number of formats accounted for.
    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Returns `true` if no format was accounted for.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if at least one format failed.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Failure descriptions in `"<format>: <reason>"` form.
    pub fn failure_messages(&self) -> Vec<String> {
        self.failures.iter().map(ToString::to_string).collect()
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parses an RFC 3339 string (e.g. `"2024-02-20T07:59:23.077Z"`).
    pub fn parse_rfc3339(value: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
