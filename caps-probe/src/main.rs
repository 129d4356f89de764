//! hwcaps-probe
//!
//! Runs VA-API capability negotiation against the local GPU and prints the
//! capability report as JSON on stdout. Probe logs go to stderr.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde_json::json;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use hwcaps_common::{NegotiationConfig, PixelFormat, Resolution, VideoCodec};
use hwcaps_vaapi::{DecodeRequest, DecoderResolver, NegotiationContext};

/// Report which video codecs the VA-API hardware on this machine can handle
#[derive(Parser, Debug)]
#[command(name = "hwcaps-probe")]
#[command(about = "Probe VA-API encode capabilities and print a JSON report")]
#[command(version)]
struct Args {
    /// Treat hardware acceleration as disabled (no device is opened)
    #[arg(long)]
    disable_hw: bool,

    /// Device node to probe, in order (repeatable; replaces the defaults)
    #[arg(long = "device", value_name = "PATH")]
    devices: Vec<PathBuf>,

    /// JSON negotiation config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also resolve a decoder for this input codec (h264, hevc, av1, ...)
    #[arg(long, value_name = "CODEC")]
    resolve: Option<String>,

    /// Resolution used with --resolve, as WIDTHxHEIGHT
    #[arg(long, default_value = "1920x1080")]
    resolution: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = load_config(&args)?;
    info!(
        devices = config.device_paths.len(),
        hardware_disabled = config.hardware_disabled,
        "Starting capability probe"
    );

    let ctx = NegotiationContext::new(config);
    let report = ctx.report();

    let decoder = match &args.resolve {
        Some(name) => {
            let codec = VideoCodec::from_name(name)
                .with_context(|| format!("unknown codec '{name}'"))?;
            let resolution = parse_resolution(&args.resolution)?;
            let request = DecodeRequest::new(codec, PixelFormat::default(), resolution);
            Some(DecoderResolver::default().resolve(&ctx, &request))
        }
        None => None,
    };

    let output = match decoder {
        Some(choice) => json!({ "capabilities": report, "decoder": choice }),
        None => json!({ "capabilities": report }),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<NegotiationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            NegotiationConfig::from_json(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => NegotiationConfig::default(),
    };

    if args.disable_hw {
        config.hardware_disabled = true;
    }
    if !args.devices.is_empty() {
        config.device_paths = args.devices.clone();
    }
    Ok(config)
}

fn parse_resolution(s: &str) -> anyhow::Result<Resolution> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .with_context(|| format!("resolution '{s}' is not WIDTHxHEIGHT"))?;
    Ok(Resolution::new(
        w.trim().parse().context("invalid width")?,
        h.trim().parse().context("invalid height")?,
    ))
}
