//! Port traits implemented by infrastructure crates.
//!
//! The generation crate depends only on these traits; concrete adapters
//! (the Bannerbear HTTP client, in-memory or relational stores) are constructed
//! by the composition root and injected as trait objects.

use async_trait::async_trait;

use crate::{
    BrandProfile, CampaignId, JobHandle, JobStatus, JobUid, KnowledgeBaseId, ModificationSet,
    NewStoredImage, RenderError, StoreError, StoredImage, TemplateId,
};

/// A remote templated-image render service.
///
/// Implementations perform exactly one HTTP exchange per call and never retry
/// or resubmit; retry policy belongs to the poller.
#[async_trait]
pub trait RenderService: Send + Sync {
    /// Submits one rendering job for `template_id` with the full modification set.
    ///
    /// # Errors
    ///
    /// [`RenderError::Auth`], [`RenderError::TemplateNotFound`],
    /// [`RenderError::Validation`], [`RenderError::Transient`] or
    /// [`RenderError::InvalidResponse`].
    async fn submit(
        &self,
        template_id: &TemplateId,
        modifications: &ModificationSet,
    ) -> Result<JobHandle, RenderError>;

    /// Performs a single status query for a submitted job.
    ///
    /// # Errors
    ///
    /// A 404 is reported as [`RenderError::JobNotFound`]; everything else as in
    /// [`RenderService::submit`].
    async fn check_status(&self, uid: &JobUid) -> Result<JobStatus, RenderError>;
}

/// Read access to per-client brand profiles.
#[async_trait]
pub trait BrandProfileStore: Send + Sync {
    /// Returns the profile for `knowledge_base_id`, or `None` if the client has
    /// not been configured.
    async fn brand_profile(
        &self,
        knowledge_base_id: KnowledgeBaseId,
    ) -> Result<Option<BrandProfile>, StoreError>;
}

/// Persistence for generated images.
#[async_trait]
pub trait GeneratedImageStore: Send + Sync {
    /// Persists one generated image and returns the stored record.
    async fn save(&self, image: NewStoredImage) -> Result<StoredImage, StoreError>;

    /// Lists a campaign's images, newest first.
    async fn list_for_campaign(&self, campaign_id: CampaignId)
        -> Result<Vec<StoredImage>, StoreError>;
}
