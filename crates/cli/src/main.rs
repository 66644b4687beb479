//! adforge CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: command-line flags with environment fallbacks
//!    (`BANNERBEAR_API_KEY`, `ADFORGE_POLL_*`, ...). A missing API key or a
//!    degenerate poll policy stops the process before any job is submitted.
//! 2. **Wire observability**: configure `tracing-subscriber` with a JSON or
//!    compact layer and, on request, an OpenTelemetry OTLP exporter. All
//!    `tracing` spans and events emitted by every crate flow through this layer.
//! 3. **Construct infrastructure**: build one `BannerbearClient` and inject it
//!    into the `ImageGenerator`.
//! 4. **Dispatch**: `render` (ad-hoc fan-out) or `campaign` (standard formats
//!    from a brand profile).

mod args;
mod commands;
mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bannerbear::{BannerbearClient, BannerbearConfig};
use clap::Parser;
use generation::{ImageGenerator, PollPolicy};
use tracing::info;

use crate::args::{Cli, Command, ServiceArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _telemetry = telemetry::init(&cli.observability)?;

    let generator = build_generator(&cli.service)?;
    info!(
        base_url = %cli.service.base_url,
        poll_interval_ms = cli.service.poll_interval_ms,
        poll_max_attempts = cli.service.poll_max_attempts,
        "Render service configured"
    );

    match cli.command {
        Command::Render(args) => commands::render(&generator, args).await,
        Command::Campaign(args) => commands::campaign(generator, args).await,
    }
}

fn build_generator(service: &ServiceArgs) -> anyhow::Result<ImageGenerator> {
    let config = BannerbearConfig::new(service.api_key.clone().unwrap_or_default())?
        .with_base_url(&service.base_url)
        .with_request_timeout(Duration::from_secs(service.request_timeout_secs));
    let client = BannerbearClient::new(config)?;

    let policy = PollPolicy::new(
        Duration::from_millis(service.poll_interval_ms),
        service.poll_max_attempts,
    )
    .context("poll interval and max attempts must both be non-zero")?;

    Ok(ImageGenerator::new(Arc::new(client), policy))
}
