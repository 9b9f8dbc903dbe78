// src/render/mod.rs

pub mod html;
pub mod table;

pub use table::{DataTable, Order};

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::load::Dataset;

/// The set of display targets, each bound to at most one [`DataTable`].
#[derive(Debug)]
pub struct Board {
    page_size: usize,
    tables: BTreeMap<String, DataTable>,
}

impl Board {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            tables: BTreeMap::new(),
        }
    }

    /// Release whatever is bound to `target`, then bind a fresh table over
    /// `dataset`. Nothing from the previous table survives.
    pub fn replace(&mut self, target: &str, dataset: Dataset) -> &mut DataTable {
        self.release(target);
        let table = DataTable::new(dataset, self.page_size);
        info!(table = target, rows = table.len(), "bound table");
        self.tables.entry(target.to_string()).or_insert(table)
    }

    /// Unbind and return the table at `target`, if any.
    pub fn release(&mut self, target: &str) -> Option<DataTable> {
        let old = self.tables.remove(target)?;
        debug!(table = target, rows = old.len(), "released table");
        Some(old)
    }

    pub fn get(&self, target: &str) -> Option<&DataTable> {
        self.tables.get(target)
    }

    pub fn get_mut(&mut self, target: &str) -> Option<&mut DataTable> {
        self.tables.get_mut(target)
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(10)
    }
}
