use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use render_core::{FsTemplateFetcher, HttpTemplateFetcher, TemplateFetcher};
use tracing::{info, warn};
use url::Url;

mod behaviors;
mod bootstrap;
mod config;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "share-file", about = "Render Share File index pages")]
struct Cli {
    /// Flat key/value settings file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Serve templates and page data from this directory.
    #[arg(long)]
    site_root: Option<PathBuf>,
    /// Fetch templates and page data over HTTP instead of from disk.
    #[arg(long)]
    base_url: Option<String>,
    /// Origin used for breadcrumb links.
    #[arg(long)]
    origin: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a page and print it, or write it to `--out`.
    Render {
        page: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print how a page's redirect record is classified, as JSON.
    Redirect { page: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = load_settings(cli.config)?;
    let mut settings = loaded.settings;
    if let Some(site_root) = cli.site_root {
        settings.site_root = site_root;
    }
    if let Some(base_url) = cli.base_url {
        settings.base_url = Some(base_url).filter(|url| !url.is_empty());
    }
    if let Some(origin) = cli.origin {
        settings.site_origin = origin;
    }

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();
    for warning in &loaded.warnings {
        warn!("{warning}");
    }

    let fetcher = build_fetcher(&settings)?;

    match cli.command {
        Command::Render { page, out } => {
            let rendered = bootstrap::render_page(fetcher, &settings, &page).await?;
            info!(title = %rendered.title, decision = ?rendered.decision, "rendered page");
            if let Some(directive) = &rendered.redirect {
                info!(%directive, "page schedules a redirect");
            }
            match out {
                Some(out) => {
                    tokio::fs::write(&out, &rendered.html)
                        .await
                        .with_context(|| format!("failed to write {}", out.display()))?;
                    info!(path = %rendered.path, out = %out.display(), "page written");
                }
                None => println!("{}", rendered.html),
            }
        }
        Command::Redirect { page } => {
            let decision = bootstrap::classify_page(fetcher.as_ref(), &settings, &page).await?;
            println!("{}", serde_json::to_string_pretty(&decision)?);
        }
    }

    Ok(())
}

fn build_fetcher(settings: &Settings) -> Result<Arc<dyn TemplateFetcher>> {
    match &settings.base_url {
        Some(base_url) => {
            let base_url =
                Url::parse(base_url).with_context(|| format!("invalid base url {base_url}"))?;
            info!(%base_url, "fetching site over http");
            Ok(Arc::new(HttpTemplateFetcher::new(base_url)))
        }
        None => {
            info!(root = %settings.site_root.display(), "reading site from disk");
            Ok(Arc::new(FsTemplateFetcher::new(settings.site_root.clone())))
        }
    }
}
