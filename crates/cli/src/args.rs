//! Command-line arguments, with environment-variable fallbacks for everything
//! that is configuration rather than per-invocation input.

use std::path::PathBuf;

use bannerbear::DEFAULT_BASE_URL;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use imaging::{FormatName, FormatRequest, LayerName, Modification, TemplateId};

/// Command-line arguments for the adforge binary.
#[derive(Debug, Parser)]
#[command(name = "adforge", version, about = "Render ad images from Bannerbear templates")]
pub struct Cli {
    #[command(flatten)]
    pub service: ServiceArgs,

    #[command(flatten)]
    pub observability: ObservabilityArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct ServiceArgs {
    /// Bannerbear project API key.
    #[arg(
        long,
        env = "BANNERBEAR_API_KEY",
        hide_env_values = true,
        global = true,
        value_name = "KEY"
    )]
    pub api_key: Option<String>,

    /// Bannerbear API root.
    #[arg(long, env = "BANNERBEAR_BASE_URL", default_value = DEFAULT_BASE_URL, global = true, value_name = "URL")]
    pub base_url: String,

    /// Timeout for each individual HTTP request.
    #[arg(
        long,
        env = "BANNERBEAR_REQUEST_TIMEOUT_SECS",
        default_value_t = 30,
        global = true,
        value_name = "SECONDS"
    )]
    pub request_timeout_secs: u64,

    /// Delay before each status check.
    #[arg(
        long,
        env = "ADFORGE_POLL_INTERVAL_MS",
        default_value_t = 2000,
        global = true,
        value_name = "MILLISECONDS"
    )]
    pub poll_interval_ms: u64,

    /// Status checks per job before it is reported as timed out.
    #[arg(
        long,
        env = "ADFORGE_POLL_MAX_ATTEMPTS",
        default_value_t = 45,
        global = true,
        value_name = "COUNT"
    )]
    pub poll_max_attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Args)]
pub struct ObservabilityArgs {
    /// Log output format (logs go to stderr; results go to stdout).
    #[arg(
        long,
        env = "ADFORGE_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,

    /// Export spans over OTLP (endpoint from OTEL_EXPORTER_OTLP_ENDPOINT).
    #[arg(long, env = "ADFORGE_OTLP", action = ArgAction::SetTrue, global = true)]
    pub otlp: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render one modification set against one template per format.
    Render(RenderArgs),
    /// Render the standard ad formats for a campaign from a brand profile.
    Campaign(CampaignArgs),
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Output format and the template that renders it.
    #[arg(long = "format", value_name = "FORMAT=TEMPLATE", required = true, value_parser = parse_format)]
    pub formats: Vec<FormatRequest>,

    /// Text substituted into a layer.
    #[arg(long = "text", value_name = "LAYER=TEXT", value_parser = parse_text)]
    pub texts: Vec<Modification>,

    /// Image URL substituted into a layer.
    #[arg(long = "image", value_name = "LAYER=URL", value_parser = parse_image)]
    pub images: Vec<Modification>,
}

#[derive(Debug, Args)]
pub struct CampaignArgs {
    /// JSON file holding the client's brand profile.
    #[arg(long, value_name = "PATH")]
    pub brand_profile: PathBuf,

    #[arg(long, value_name = "ID")]
    pub campaign_id: u64,

    #[arg(long)]
    pub headline: String,

    #[arg(long)]
    pub description: String,

    /// Call to action; defaults to "Book Free Estimate".
    #[arg(long)]
    pub cta: Option<String>,

    /// Background photo URL.
    #[arg(long, value_name = "URL")]
    pub photo_url: String,

    #[arg(long, value_name = "ID")]
    pub photo_id: Option<u64>,

    /// Copy angle the ad was written for (e.g. pain, authority, value).
    #[arg(long)]
    pub angle: Option<String>,
}

fn split_pair<'a>(value: &'a str, shape: &str) -> Result<(&'a str, &'a str), String> {
    value
        .split_once('=')
        .filter(|(key, val)| !key.trim().is_empty() && !val.trim().is_empty())
        .map(|(key, val)| (key.trim(), val.trim()))
        .ok_or_else(|| format!("expected {shape}, got '{value}'"))
}

fn parse_format(value: &str) -> Result<FormatRequest, String> {
    let (format, template) = split_pair(value, "FORMAT=TEMPLATE")?;
    match (FormatName::new(format), TemplateId::new(template)) {
        (Some(format), Some(template)) => Ok(FormatRequest::new(format, template)),
        _ => Err(format!("expected FORMAT=TEMPLATE, got '{value}'")),
    }
}

fn parse_layer(value: &str, shape: &str) -> Result<(LayerName, String), String> {
    // Text values may legitimately contain '=', so only the first one splits.
    let (layer, content) = split_pair(value, shape)?;
    let layer = LayerName::new(layer).ok_or_else(|| format!("expected {shape}, got '{value}'"))?;
    Ok((layer, content.to_string()))
}

fn parse_text(value: &str) -> Result<Modification, String> {
    let (layer, text) = parse_layer(value, "LAYER=TEXT")?;
    Ok(Modification::text(layer, text))
}

fn parse_image(value: &str) -> Result<Modification, String> {
    let (layer, url) = parse_layer(value, "LAYER=URL")?;
    Ok(Modification::image(layer, url))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use imaging::ModificationContent;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn render_collects_formats_and_layers() {
        let cli = Cli::try_parse_from([
            "adforge",
            "--api-key",
            "bb_pr_test",
            "render",
            "--format",
            "feed_1x1=8BK3vWZJ7a3y5Jzk1a",
            "--format",
            "feed_4x5=Kp21rAZj1y3eb6eLnd",
            "--text",
            "headline=Leaking Roof? Storm Damage?",
            "--text",
            "cta=Save = Win",
            "--image",
            "logo=https://cdn.example.com/logo.svg",
        ])
        .unwrap();

        let Command::Render(args) = cli.command else {
            panic!("expected render command");
        };
        assert_eq!(args.formats.len(), 2);
        assert_eq!(args.formats[1].template_id.as_str(), "Kp21rAZj1y3eb6eLnd");
        assert_eq!(
            args.texts[1].content,
            ModificationContent::Text("Save = Win".into())
        );
        assert_eq!(
            args.images[0].content,
            ModificationContent::ImageUrl("https://cdn.example.com/logo.svg".into())
        );
    }

    #[test]
    fn malformed_pairs_are_rejected() {
        assert!(parse_format("feed_1x1").is_err());
        assert!(parse_format("=tpl").is_err());
        assert!(parse_text("headline=").is_err());
    }

    #[test]
    fn render_requires_a_format() {
        assert!(Cli::try_parse_from(["adforge", "render", "--text", "headline=Hi"]).is_err());
    }

    #[test]
    fn poll_settings_accept_flags_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "adforge",
            "campaign",
            "--brand-profile",
            "profile.json",
            "--campaign-id",
            "42",
            "--headline",
            "Storm Damage?",
            "--description",
            "Licensed roofers",
            "--photo-url",
            "https://cdn.example.com/roof.jpg",
            "--poll-interval-ms",
            "500",
            "--poll-max-attempts",
            "10",
        ])
        .unwrap();

        assert_eq!(cli.service.poll_interval_ms, 500);
        assert_eq!(cli.service.poll_max_attempts, 10);
        assert!(matches!(cli.command, Command::Campaign(ref c) if c.campaign_id == 42));
    }
}
