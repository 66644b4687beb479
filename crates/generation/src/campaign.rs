//! Campaign image service: renders the standard ad formats for one campaign and
//! persists the results.
//!
//! Sequence for [`CampaignImageService::generate_images`]:
//!
//! 1. Load the client's brand profile; it must exist and be complete.
//! 2. Validate the ad copy.
//! 3. Build the shared modification set and the three standard formats.
//! 4. Fan out through [`ImageGenerator::generate_all`].
//! 5. Persist every success; hand failures back alongside the stored records.

use std::sync::Arc;

use imaging::{
    AdCopy, BrandProfileStore, CampaignId, CopyError, FormatFailure, GeneratedImageStore,
    GenerationError, KnowledgeBaseId, NewStoredImage, PhotoId, StoreError, StoredImage,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

use crate::fanout::ImageGenerator;

/// Reasons a campaign image request fails as a whole.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// The client has no brand profile.
    #[error("no brand profile configured for knowledge base {knowledge_base_id}")]
    ProfileMissing { knowledge_base_id: KnowledgeBaseId },

    /// The brand profile lacks templates or brand assets.
    #[error("brand profile incomplete, missing: {}", .missing.join(", "))]
    ProfileIncomplete { missing: Vec<&'static str> },

    #[error("invalid ad copy: {0}")]
    InvalidCopy(#[from] CopyError),

    /// The background photo is not an absolute URL.
    #[error("invalid photo URL '{url}'")]
    InvalidPhotoUrl { url: String },

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Input for one campaign's image generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignImageRequest {
    pub campaign_id: CampaignId,
    pub knowledge_base_id: KnowledgeBaseId,
    pub headline: String,
    pub description: String,
    /// Falls back to [`imaging::DEFAULT_CTA`] when absent.
    pub cta: Option<String>,
    /// Background photo rendered behind the copy.
    pub photo_url: String,
    pub selected_photo_id: Option<PhotoId>,
    pub selected_angle: Option<String>,
}

/// Stored images plus the formats that failed.
///
/// `failures` is empty when every format rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignImages {
    pub images: Vec<StoredImage>,
    pub failures: Vec<FormatFailure>,
}

/// Generates and stores ad images for campaigns.
pub struct CampaignImageService {
    generator: ImageGenerator,
    profiles: Arc<dyn BrandProfileStore>,
    images: Arc<dyn GeneratedImageStore>,
}

impl CampaignImageService {
    pub fn new(
        generator: ImageGenerator,
        profiles: Arc<dyn BrandProfileStore>,
        images: Arc<dyn GeneratedImageStore>,
    ) -> Self {
        Self {
            generator,
            profiles,
            images,
        }
    }

    /// Renders the standard formats for `request` and persists the successes.
    ///
    /// Successes are stored even when other formats failed; the failures are
    /// returned in [`CampaignImages::failures`].
    ///
    /// # Errors
    ///
    /// [`CampaignError::InvalidPhotoUrl`] if `photo_url` does not parse as an
    /// absolute URL; checked before anything is submitted.
    ///
    /// [`CampaignError::Generation`] wrapping [`GenerationError::AllFailed`]
    /// when no format rendered; nothing is stored in that case.
    #[instrument(
        skip_all,
        fields(campaign = %request.campaign_id, knowledge_base = %request.knowledge_base_id)
    )]
    pub async fn generate_images(
        &self,
        request: CampaignImageRequest,
    ) -> Result<CampaignImages, CampaignError> {
        let profile = self
            .profiles
            .brand_profile(request.knowledge_base_id)
            .await?
            .ok_or(CampaignError::ProfileMissing {
                knowledge_base_id: request.knowledge_base_id,
            })?
            .require_complete()
            .map_err(|missing| CampaignError::ProfileIncomplete { missing })?;

        let copy = AdCopy::new(request.headline, request.description, request.cta)?;
        if Url::parse(&request.photo_url).is_err() {
            return Err(CampaignError::InvalidPhotoUrl {
                url: request.photo_url,
            });
        }

        let modifications = profile.modifications(&copy, &request.photo_url);
        let outcome = self
            .generator
            .generate_all(&profile.format_requests(), &modifications)
            .await?;

        let mut images = Vec::with_capacity(outcome.successes.len());
        for rendered in outcome.successes {
            let stored = self
                .images
                .save(NewStoredImage {
                    campaign_id: request.campaign_id,
                    format: rendered.format,
                    image_url: rendered.url,
                    job_uid: rendered.job_uid,
                    template_id: rendered.template_id,
                    selected_photo_id: request.selected_photo_id,
                    selected_angle: request.selected_angle.clone(),
                    copy: copy.clone(),
                })
                .await?;
            images.push(stored);
        }

        info!(
            stored = images.len(),
            failed = outcome.failures.len(),
            "Campaign images generated"
        );
        Ok(CampaignImages {
            images,
            failures: outcome.failures,
        })
    }

    /// Lists the images stored for a campaign, newest first.
    pub async fn campaign_images(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<StoredImage>, CampaignError> {
        Ok(self.images.list_for_campaign(campaign_id).await?)
    }
}
