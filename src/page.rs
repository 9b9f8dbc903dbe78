// src/page.rs
//
// Page-ready wiring: fetch → load → bind, once per configured dataset.

use futures::future::join_all;
use serde::Serialize;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard,
};
use tracing::{error, info, instrument, warn};

use crate::{
    config::{DatasetConfig, SiteConfig},
    fetch::Fetch,
    load::load,
    render::Board,
};

/// What happened to one dataset during a load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    Rendered {
        target: String,
        records: usize,
        dropped: usize,
    },
    Disabled {
        target: String,
    },
    FetchFailed {
        target: String,
        error: String,
    },
    ParseFailed {
        target: String,
        error: String,
    },
}

impl LoadOutcome {
    pub fn target(&self) -> &str {
        match self {
            LoadOutcome::Rendered { target, .. }
            | LoadOutcome::Disabled { target }
            | LoadOutcome::FetchFailed { target, .. }
            | LoadOutcome::ParseFailed { target, .. } => target,
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, LoadOutcome::Rendered { .. })
    }
}

pub struct Page<F> {
    fetcher: F,
    datasets: Vec<DatasetConfig>,
    board: Mutex<Board>,
    fired: AtomicBool,
}

impl<F: Fetch> Page<F> {
    pub fn new(fetcher: F, config: &SiteConfig) -> Self {
        Self {
            fetcher,
            datasets: config.datasets.clone(),
            board: Mutex::new(Board::new(config.page_size)),
            fired: AtomicBool::new(false),
        }
    }

    /// Fire every configured load once, concurrently. A second call does
    /// nothing and returns no outcomes.
    #[instrument(level = "info", skip(self), fields(datasets = self.datasets.len()))]
    pub async fn ready(&self) -> Vec<LoadOutcome> {
        if self.fired.swap(true, Ordering::SeqCst) {
            warn!("page already initialized; ignoring");
            return Vec::new();
        }
        join_all(self.datasets.iter().map(|ds| self.load_into(ds))).await
    }

    /// Fetch and load one dataset, then replace whatever its target shows.
    /// On failure the target keeps its previous table (or stays empty).
    #[instrument(level = "info", skip(self, ds), fields(table = %ds.target, resource = %ds.resource))]
    pub async fn load_into(&self, ds: &DatasetConfig) -> LoadOutcome {
        let target = ds.target.clone();
        if !ds.enabled {
            info!("disabled; skipping");
            return LoadOutcome::Disabled { target };
        }

        let text = match self.fetcher.fetch_text(&ds.resource).await {
            Ok(t) => t,
            Err(e) => {
                error!(error = %format!("{:#}", e), "fetch failed");
                return LoadOutcome::FetchFailed {
                    target,
                    error: format!("{:#}", e),
                };
            }
        };

        let dataset = match load(&text, ds.schema, ds.parse_mode()) {
            Ok(d) => d,
            Err(e) => {
                error!(error = %e, "load failed");
                return LoadOutcome::ParseFailed {
                    target,
                    error: e.to_string(),
                };
            }
        };

        let (records, dropped) = (dataset.len(), dataset.dropped());
        self.board().replace(&ds.target, dataset);
        info!(records, dropped, "rendered");
        LoadOutcome::Rendered {
            target,
            records,
            dropped,
        }
    }

    pub fn with_board<R>(&self, f: impl FnOnce(&mut Board) -> R) -> R {
        f(&mut self.board())
    }

    pub fn into_board(self) -> Board {
        self.board
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn board(&self) -> MutexGuard<'_, Board> {
        self.board
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
