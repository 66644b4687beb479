//! Bannerbear infrastructure adapter.
//!
//! Implements the [`imaging::RenderService`] trait over the Bannerbear v2 REST
//! API (`POST /images`, `GET /images/{uid}`).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, bearer authentication, request
//! formatting, response parsing and status-code classification live here. The
//! `generation` crate sees only [`imaging::RenderService`]; polling and fan-out
//! never happen in this crate.
//!
//! ## Error mapping
//!
//! | Response | `RenderError` |
//! |----------|---------------|
//! | 401 | `Auth` |
//! | 404 on submit | `TemplateNotFound` |
//! | 404 on status | `JobNotFound` |
//! | 422 | `Validation` |
//! | other non-2xx, network | `Transient` |
//! | 2xx with unusable body | `InvalidResponse` |

use thiserror::Error;

mod client;
mod config;
mod wire;

pub use client::BannerbearClient;
pub use config::{BannerbearConfig, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};

/// Failures constructing a [`BannerbearClient`]. Fatal at startup.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("BANNERBEAR_API_KEY is not set")]
    MissingApiKey,

    #[error("Bannerbear API key contains characters not allowed in an HTTP header")]
    InvalidApiKey,

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
