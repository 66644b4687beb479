//! Campaign-level value types: per-client brand profiles, ad copy, and the
//! records persisted for every successfully rendered image.
//!
//! These are the shapes the surrounding CRUD application hands to (and takes
//! back from) the generation core. The layer names used to turn them into
//! modifications live alongside them so both sides agree on the template
//! contract.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    CampaignId, FormatName, FormatRequest, JobUid, KnowledgeBaseId, LayerName, Modification,
    ModificationSet, PhotoId, StoredImageId, TemplateId, Timestamp,
};

// ---------------------------------------------------------------------------
// Template contract
// ---------------------------------------------------------------------------

/// Output format for Stories placements (9:16).
pub const FORMAT_STORIES: &str = "stories_9x16";
/// Output format for 4:5 feed placements.
pub const FORMAT_FEED_4X5: &str = "feed_4x5";
/// Output format for square feed placements.
pub const FORMAT_FEED_1X1: &str = "feed_1x1";

/// Template layer names every ad template must expose.
pub mod layers {
    pub const HEADLINE: &str = "headline";
    pub const SUBTITLE: &str = "subtitle";
    pub const CTA: &str = "cta";
    pub const LOGO: &str = "logo";
    pub const BACKGROUND_IMAGE: &str = "background_image";
    /// Badge layers, filled from [`super::BrandProfile::badge_urls`] in slot order.
    pub const BADGES: [&str; 3] = ["badge_gaf", "badge_malarkey", "badge_cslb"];
}

/// Call to action used when the caller does not supply one.
pub const DEFAULT_CTA: &str = "Book Free Estimate";

const MAX_HEADLINE_CHARS: usize = 100;
const MAX_DESCRIPTION_CHARS: usize = 200;
const MAX_CTA_CHARS: usize = 50;

// ---------------------------------------------------------------------------
// Brand profile
// ---------------------------------------------------------------------------

/// Per-client render configuration, as stored by the CRUD layer.
///
/// Every field is optional at rest because clients are configured
/// incrementally; [`BrandProfile::require_complete`] checks that a profile is
/// usable before any job is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandProfile {
    pub knowledge_base_id: KnowledgeBaseId,
    #[serde(default)]
    pub stories_template: Option<TemplateId>,
    #[serde(default)]
    pub feed_4x5_template: Option<TemplateId>,
    #[serde(default)]
    pub feed_1x1_template: Option<TemplateId>,
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Certification badge images, one per badge layer.
    #[serde(default)]
    pub badge_urls: [Option<String>; 3],
    /// Brand colours in `#RRGGBB` form. Stored for the templates' benefit; not
    /// sent as modifications.
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub secondary_color: Option<String>,
}

impl BrandProfile {
    /// Returns a [`CompleteBrandProfile`] if every template and brand asset is
    /// present, or the names of the missing fields otherwise.
    pub fn require_complete(&self) -> Result<CompleteBrandProfile, Vec<&'static str>> {
        let mut missing = Vec::new();

        fn take<T: Clone>(
            value: &Option<T>,
            name: &'static str,
            missing: &mut Vec<&'static str>,
        ) -> Option<T> {
            let v = value.clone();
            if v.is_none() {
                missing.push(name);
            }
            v
        }

        // Blank asset URLs count as unset.
        fn take_url(
            value: &Option<String>,
            name: &'static str,
            missing: &mut Vec<&'static str>,
        ) -> Option<String> {
            let present = value.clone().filter(|url| !url.trim().is_empty());
            take(&present, name, missing)
        }

        let stories = take(&self.stories_template, "stories_template", &mut missing);
        let feed_4x5 = take(&self.feed_4x5_template, "feed_4x5_template", &mut missing);
        let feed_1x1 = take(&self.feed_1x1_template, "feed_1x1_template", &mut missing);
        let logo = take_url(&self.logo_url, "logo_url", &mut missing);
        let badge_1 = take_url(&self.badge_urls[0], "badge_urls[0]", &mut missing);
        let badge_2 = take_url(&self.badge_urls[1], "badge_urls[1]", &mut missing);
        let badge_3 = take_url(&self.badge_urls[2], "badge_urls[2]", &mut missing);

        match (stories, feed_4x5, feed_1x1, logo, badge_1, badge_2, badge_3) {
            (
                Some(stories),
                Some(feed_4x5),
                Some(feed_1x1),
                Some(logo),
                Some(b1),
                Some(b2),
                Some(b3),
            ) => Ok(CompleteBrandProfile {
                stories_template: stories,
                feed_4x5_template: feed_4x5,
                feed_1x1_template: feed_1x1,
                logo_url: logo,
                badge_urls: [b1, b2, b3],
            }),
            _ => Err(missing),
        }
    }
}

/// A [`BrandProfile`] with every template and asset present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteBrandProfile {
    pub stories_template: TemplateId,
    pub feed_4x5_template: TemplateId,
    pub feed_1x1_template: TemplateId,
    pub logo_url: String,
    pub badge_urls: [String; 3],
}

impl CompleteBrandProfile {
    /// The three standard formats, in Stories, 4:5, 1:1 order.
    pub fn format_requests(&self) -> Vec<FormatRequest> {
        [
            (FORMAT_STORIES, &self.stories_template),
            (FORMAT_FEED_4X5, &self.feed_4x5_template),
            (FORMAT_FEED_1X1, &self.feed_1x1_template),
        ]
        .into_iter()
        .map(|(format, template)| FormatRequest::new(known_format(format), template.clone()))
        .collect()
    }

    /// Builds the shared modification set for one ad: the copy and chosen photo
    /// plus this profile's logo and badges.
    pub fn modifications(&self, copy: &AdCopy, photo_url: &str) -> ModificationSet {
        let mut set = ModificationSet::new();
        set.insert(Modification::text(known_layer(layers::HEADLINE), &copy.headline));
        set.insert(Modification::text(known_layer(layers::SUBTITLE), &copy.description));
        set.insert(Modification::text(known_layer(layers::CTA), &copy.cta));
        set.insert(Modification::image(known_layer(layers::LOGO), &self.logo_url));
        set.insert(Modification::image(
            known_layer(layers::BACKGROUND_IMAGE),
            photo_url,
        ));
        for (layer, url) in layers::BADGES.iter().zip(&self.badge_urls) {
            set.insert(Modification::image(known_layer(layer), url));
        }
        set
    }
}

// The constants above are non-empty, so construction cannot fail.
fn known_format(name: &'static str) -> FormatName {
    FormatName::new(name).unwrap_or_else(|| unreachable!("format constant is non-empty"))
}

fn known_layer(name: &'static str) -> LayerName {
    LayerName::new(name).unwrap_or_else(|| unreachable!("layer constant is non-empty"))
}

// ---------------------------------------------------------------------------
// Ad copy
// ---------------------------------------------------------------------------

/// A copy field exceeded its length limit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} must be at most {max} characters (got {actual})")]
pub struct CopyError {
    /// Name of the offending field.
    pub field: &'static str,
    /// Maximum permitted length, in characters.
    pub max: usize,
    /// Actual length, in characters.
    pub actual: usize,
}

/// Text rendered into an ad image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdCopy {
    pub headline: String,
    pub description: String,
    pub cta: String,
}

impl AdCopy {
    /// Validates and builds ad copy. A `None` CTA falls back to [`DEFAULT_CTA`].
    pub fn new(
        headline: impl Into<String>,
        description: impl Into<String>,
        cta: Option<String>,
    ) -> Result<Self, CopyError> {
        let copy = Self {
            headline: headline.into(),
            description: description.into(),
            cta: cta.unwrap_or_else(|| DEFAULT_CTA.to_string()),
        };
        check_length("headline", &copy.headline, MAX_HEADLINE_CHARS)?;
        check_length("description", &copy.description, MAX_DESCRIPTION_CHARS)?;
        check_length("cta", &copy.cta, MAX_CTA_CHARS)?;
        Ok(copy)
    }
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), CopyError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(CopyError { field, max, actual });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Persisted images
// ---------------------------------------------------------------------------

/// A rendered image about to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStoredImage {
    pub campaign_id: CampaignId,
    pub format: FormatName,
    pub image_url: String,
    pub job_uid: JobUid,
    pub template_id: TemplateId,
    pub selected_photo_id: Option<PhotoId>,
    /// Copy angle chosen in the wizard (e.g. `"pain"`, `"authority"`).
    pub selected_angle: Option<String>,
    pub copy: AdCopy,
}

/// A persisted generated-image record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImage {
    pub id: StoredImageId,
    pub created_at: Timestamp,
    #[serde(flatten)]
    pub image: NewStoredImage,
}
