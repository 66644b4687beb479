//! In-memory adapters for the collaborator store ports.
//!
//! Back the CLI (which seeds them from files) and the tests. A relational
//! adapter implementing the same traits lives with the CRUD application.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use imaging::{
    BrandProfile, BrandProfileStore, CampaignId, GeneratedImageStore, KnowledgeBaseId,
    NewStoredImage, StoreError, StoredImage, StoredImageId, Timestamp,
};

fn poisoned() -> StoreError {
    StoreError::Unavailable {
        message: "in-memory store lock poisoned".into(),
    }
}

/// Brand profiles held in a map keyed by knowledge base.
#[derive(Debug, Default)]
pub struct InMemoryBrandProfiles {
    profiles: RwLock<HashMap<KnowledgeBaseId, BrandProfile>>,
}

impl InMemoryBrandProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the profile for its knowledge base.
    pub fn upsert(&self, profile: BrandProfile) -> Result<(), StoreError> {
        self.profiles
            .write()
            .map_err(|_| poisoned())?
            .insert(profile.knowledge_base_id, profile);
        Ok(())
    }
}

#[async_trait]
impl BrandProfileStore for InMemoryBrandProfiles {
    async fn brand_profile(
        &self,
        knowledge_base_id: KnowledgeBaseId,
    ) -> Result<Option<BrandProfile>, StoreError> {
        let profiles = self.profiles.read().map_err(|_| poisoned())?;
        Ok(profiles.get(&knowledge_base_id).cloned())
    }
}

#[derive(Debug, Default)]
struct ImageRows {
    next_id: u64,
    rows: Vec<StoredImage>,
}

/// Generated-image records held in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryImageStore {
    inner: Mutex<ImageRows>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GeneratedImageStore for InMemoryImageStore {
    async fn save(&self, image: NewStoredImage) -> Result<StoredImage, StoreError> {
        let mut inner = self.inner.lock().map_err(|_| poisoned())?;
        inner.next_id += 1;
        let stored = StoredImage {
            id: StoredImageId::new(inner.next_id),
            created_at: Timestamp::now(),
            image,
        };
        inner.rows.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<StoredImage>, StoreError> {
        let inner = self.inner.lock().map_err(|_| poisoned())?;
        let mut images: Vec<_> = inner
            .rows
            .iter()
            .filter(|row| row.image.campaign_id == campaign_id)
            .cloned()
            .collect();
        // Newest first; ids break ties between rows saved in the same instant.
        images.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(images)
    }
}
