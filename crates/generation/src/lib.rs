//! Image generation orchestration.
//!
//! This crate drives render jobs through the [`imaging::RenderService`] port:
//! the status poller that resolves one job, the fan-out orchestrator that runs
//! one job per output format concurrently, and the campaign service that wraps
//! both with brand-profile lookup and persistence.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Sequences calls between the domain types in
//! [`imaging`] and the infrastructure behind its port traits. Contains no HTTP
//! or storage code of its own beyond the in-memory store adapters.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`timer`] | Delay primitive between status checks |
//! | [`poller`] | `PollPolicy`, `StatusPoller` |
//! | [`fanout`] | `ImageGenerator::generate_all` |
//! | [`campaign`] | `CampaignImageService` |
//! | [`memory`] | In-memory `BrandProfileStore` / `GeneratedImageStore` |

pub mod campaign;
pub mod fanout;
pub mod memory;
pub mod poller;
pub mod timer;

#[cfg(test)]
mod testing;

pub use campaign::{CampaignError, CampaignImageRequest, CampaignImageService, CampaignImages};
pub use fanout::ImageGenerator;
pub use memory::{InMemoryBrandProfiles, InMemoryImageStore};
pub use poller::{PollPolicy, StatusPoller, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};
