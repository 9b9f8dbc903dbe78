use anyhow::{Context, Result};
use carbontables::{
    config::SiteConfig,
    fetch::Source,
    page::{LoadOutcome, Page},
    render::html::{self, Section},
};
use chrono::Utc;
use std::{env, fs, time::Duration};
use tokio::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let config = match env::args().nth(1) {
        Some(path) => SiteConfig::load(&path)?,
        None => {
            info!("no config given; using defaults");
            SiteConfig::default()
        }
    };

    // ─── 3) build fetcher ────────────────────────────────────────────
    let source = Source::from_config(&config.source, Duration::from_secs(config.timeout_secs))?;
    info!(?source, "fetching datasets");

    // ─── 4) page ready: fire every load once ─────────────────────────
    let start = Instant::now();
    let page = Page::new(source, &config);
    let outcomes = page.ready().await;
    info!(elapsed = ?start.elapsed(), "loads finished");

    for outcome in &outcomes {
        match outcome {
            LoadOutcome::Rendered {
                target,
                records,
                dropped,
            } => info!(table = %target, records, dropped, "ok"),
            LoadOutcome::Disabled { target } => info!(table = %target, "disabled"),
            LoadOutcome::FetchFailed { target, error }
            | LoadOutcome::ParseFailed { target, error } => {
                error!(table = %target, %error, "not rendered")
            }
        }
    }

    // ─── 5) write the page and per-table JSON ────────────────────────
    let board = page.into_board();
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("creating {}", config.out_dir.display()))?;

    let mut sections = Vec::new();
    for ds in config.enabled() {
        let Some(table) = board.get(&ds.target) else {
            warn!(table = %ds.target, "nothing bound; leaving section out");
            continue;
        };
        sections.push(Section {
            target: ds.target.clone(),
            title: ds.display_title().to_string(),
            body: html::table_fragment(&ds.target, table),
        });

        let json_path = config.out_dir.join(format!("{}.json", ds.target));
        let json = serde_json::to_string_pretty(table.dataset())?;
        fs::write(&json_path, json)
            .with_context(|| format!("writing {}", json_path.display()))?;
    }

    let generated = Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
    let index = config.out_dir.join("index.html");
    fs::write(&index, html::document(&config.title, &generated, &sections))
        .with_context(|| format!("writing {}", index.display()))?;
    info!(path = %index.display(), tables = sections.len(), "all done");

    Ok(())
}
