//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example,
//! a [`TemplateId`] with a [`JobUid`] even though both are strings issued by the
//! render service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::BlankIdentifier;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display, and
// serde conversions that apply the same blank check as new().
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty
            /// or whitespace only.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.trim().is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = BlankIdentifier;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or(BlankIdentifier {
                    kind: stringify!($name),
                })
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (row identifiers owned by the CRUD layer).
// Generates: struct (Copy), new(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: store-assigned integers
// ---------------------------------------------------------------------------

u64_id! {
    /// Identifies a generated campaign (one set of ad copy for one client).
    CampaignId
}

u64_id! {
    /// Identifies a client knowledge base.
    ///
    /// Brand profiles are keyed 1:1 by knowledge base.
    KnowledgeBaseId
}

u64_id! {
    /// Identifies a client photo chosen as the background of an ad image.
    PhotoId
}

u64_id! {
    /// Identifies a persisted generated-image record.
    StoredImageId
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies one fan-out invocation (one call to `generate_all`).
///
/// Generated fresh per invocation and recorded on the tracing span so that the
/// submit and poll events of every format in the same request can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenerationRunId(Uuid);

impl GenerationRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for GenerationRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (render service / configuration names)
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies a template defined in the remote render service.
    TemplateId
}

string_id! {
    /// Identifies one rendering job, as assigned by the remote render service
    /// when the job is submitted.
    JobUid
}

string_id! {
    /// Names an output shape (e.g. `"stories_9x16"`).
    ///
    /// Unique within one generation request.
    FormatName
}

string_id! {
    /// Names a template layer that a [`crate::Modification`] targets
    /// (e.g. `"headline"`, `"background_image"`).
    LayerName
}
