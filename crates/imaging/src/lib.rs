//! Core domain for the ad-image generator.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, error type and port trait used by the generation core. Infrastructure
//! crates implement the traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`TemplateId`, `JobUid`, `FormatName`, etc.) |
//! | [`types`] | Modifications, job handles/status, per-format and aggregate outcomes |
//! | [`campaign`] | Brand profiles, ad copy, persisted image records |
//! | [`errors`] | Per-job, fan-out, store and construction errors |
//! | [`ports`] | `RenderService`, `BrandProfileStore`, `GeneratedImageStore` |

pub mod campaign;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use campaign::{
    AdCopy, BrandProfile, CompleteBrandProfile, CopyError, NewStoredImage, StoredImage,
    DEFAULT_CTA, FORMAT_FEED_1X1, FORMAT_FEED_4X5, FORMAT_STORIES,
};
pub use errors::{BlankIdentifier, GenerationError, ModificationError, RenderError, StoreError};
pub use identifiers::{
    CampaignId, FormatName, GenerationRunId, JobUid, KnowledgeBaseId, LayerName, PhotoId,
    StoredImageId, TemplateId,
};
pub use ports::{BrandProfileStore, GeneratedImageStore, RenderService};
pub use types::{
    FormatFailure, FormatOutcome, FormatRequest, FormatResult, GenerationOutcome, JobHandle,
    JobStatus, Modification, ModificationContent, ModificationSet, RenderedImage, Timestamp,
};
