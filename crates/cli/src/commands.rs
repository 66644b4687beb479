//! Command implementations. Results are printed to stdout as JSON.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use generation::{
    CampaignImageRequest, CampaignImageService, ImageGenerator, InMemoryBrandProfiles,
    InMemoryImageStore,
};
use imaging::{BrandProfile, CampaignId, ModificationSet, PhotoId};
use serde::Serialize;
use tracing::info;

use crate::args::{CampaignArgs, RenderArgs};

/// Runs one fan-out and prints the outcome. Total failure is returned as an
/// error; partial failure is printed alongside the successes.
pub async fn render(generator: &ImageGenerator, args: RenderArgs) -> anyhow::Result<()> {
    let modifications =
        ModificationSet::try_from(args.texts.into_iter().chain(args.images).collect::<Vec<_>>())
            .context("invalid modifications")?;

    let outcome = generator
        .generate_all(&args.formats, &modifications)
        .await?;

    print_json(&outcome)
}

/// Generates a campaign's images against in-memory stores seeded from the brand
/// profile file, then prints the stored records and any failures.
pub async fn campaign(generator: ImageGenerator, args: CampaignArgs) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(&args.brand_profile)
        .await
        .with_context(|| format!("failed to read {}", args.brand_profile.display()))?;
    let profile: BrandProfile = serde_json::from_str(&raw)
        .with_context(|| format!("invalid brand profile in {}", args.brand_profile.display()))?;
    let knowledge_base_id = profile.knowledge_base_id;
    info!(knowledge_base = %knowledge_base_id, "Brand profile loaded");

    let profiles = Arc::new(InMemoryBrandProfiles::new());
    profiles.upsert(profile)?;
    let service = CampaignImageService::new(
        generator,
        profiles,
        Arc::new(InMemoryImageStore::new()),
    );

    let images = service
        .generate_images(CampaignImageRequest {
            campaign_id: CampaignId::new(args.campaign_id),
            knowledge_base_id,
            headline: args.headline,
            description: args.description,
            cta: args.cta,
            photo_url: args.photo_url,
            selected_photo_id: args.photo_id.map(PhotoId::new),
            selected_angle: args.angle,
        })
        .await?;

    print_json(&images)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("failed to write result")?;
    writeln!(stdout)?;
    Ok(())
}
