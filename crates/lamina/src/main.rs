//! Lamina CLI - concurrent markdown-to-HTML site builder.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use lamina_build::{BuildOptions, SiteBuilder};
use lamina_render::PageOptions;

mod config;

#[derive(Parser)]
#[command(name = "lamina")]
#[command(about = "Render a tree of markdown files into a static HTML site")]
#[command(version)]
pub struct Cli {
    /// Directory containing markdown sources and assets
    source: PathBuf,

    /// Directory receiving rendered output
    dest: PathBuf,

    /// Path to site.toml config file
    #[arg(short, long, default_value = "site.toml")]
    config: PathBuf,

    /// Log and skip failed files instead of aborting the run
    #[arg(long)]
    keep_going: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let file = config::load(&cli.config)?;

    let mut options = BuildOptions::new(&cli.source, &cli.dest);
    options.page = PageOptions {
        stylesheet: file.page.stylesheet,
        favicon: file.page.favicon,
    };
    options.keep_going = cli.keep_going || file.build.keep_going;
    options.channel_capacity = file.build.channel_capacity;
    options.rules.vendor_markers = file.exclude.vendor_markers;
    options.rules.include_marker = file.exclude.include_marker;

    let summary = SiteBuilder::new(options).build().await?;

    tracing::info!(
        "Rendered {} pages and copied {} assets in {}ms",
        summary.pages,
        summary.assets,
        summary.duration_ms
    );

    if summary.failures > 0 {
        tracing::warn!("Skipped {} files after errors", summary.failures);
    }

    tracing::info!("Output: {}", summary.dest_dir.display());

    Ok(())
}
