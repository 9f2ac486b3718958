//! Command line front end rendering bundle includes against a static web root.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use asset_includes::{AssetKind, IncludeBuilder, StaticRootResolver};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Render HTML includes for CSS and JavaScript bundles")]
struct Cli {
  /// Directory containing BowerBundles.json and the optional BundlerForBower.json.
  #[arg(long, default_value = ".")]
  data_dir: PathBuf,
  /// Directory the site is served from. Defaults to the data directory.
  #[arg(long)]
  web_root: Option<PathBuf>,
  /// URL prefix under which the web root is published.
  #[arg(long, default_value = "/")]
  url_prefix: String,
  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Print the includes for a bundle.
  Render {
    /// Bundle name as declared in the manifest.
    bundle: String,
    /// Asset kind: css or js.
    #[arg(long)]
    kind: AssetKind,
    /// Render individual source files instead of production files.
    #[arg(long)]
    development: bool,
  },
  /// Report production files that are missing or older than their sources.
  Check,
}

fn main() -> Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let web_root = cli.web_root.clone().unwrap_or_else(|| cli.data_dir.clone());
  let builder = IncludeBuilder::new(StaticRootResolver::new(web_root, &cli.url_prefix), &cli.data_dir);

  match cli.command {
    Command::Render {
      bundle,
      kind,
      development,
    } => {
      let html = builder
        .calculate_html_includes(&bundle, kind, development)
        .with_context(|| format!("failed to render includes for bundle '{bundle}'"))?;
      println!("{html}");
      Ok(ExitCode::SUCCESS)
    }
    Command::Check => {
      let issues = builder
        .check_bundles()
        .with_context(|| format!("failed to check bundles in {}", cli.data_dir.display()))?;
      for issue in &issues {
        println!("{issue}");
      }
      Ok(if issues.is_empty() {
        ExitCode::SUCCESS
      } else {
        ExitCode::FAILURE
      })
    }
  }
}
