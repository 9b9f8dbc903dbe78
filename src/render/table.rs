// src/render/table.rs

use anyhow::{ensure, Result};

use crate::load::{Dataset, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// A paginated, sortable, searchable view over one [`Dataset`].
///
/// The default view is page 1, no filter, ascending on the key column.
#[derive(Debug)]
pub struct DataTable {
    dataset: Dataset,
    rows: Vec<Vec<Value>>,
    page_size: usize,
    sort: (usize, Order),
    query: String,
    /// Indices into `rows` after filtering and sorting.
    view: Vec<usize>,
    /// Zero-based.
    page: usize,
}

impl DataTable {
    pub fn new(dataset: Dataset, page_size: usize) -> Self {
        let rows = dataset.rows();
        let key = dataset.schema().key_column();
        let mut table = Self {
            view: (0..rows.len()).collect(),
            dataset,
            rows,
            page_size: page_size.max(1),
            sort: (key, Order::Asc),
            query: String::new(),
            page: 0,
        };
        table.rebuild();
        table
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.dataset.columns()
    }

    /// Total rows, ignoring any search filter.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows left after the search filter.
    pub fn visible(&self) -> usize {
        self.view.len()
    }

    pub fn sorting(&self) -> (usize, Order) {
        self.sort
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort_by(&mut self, column: usize, order: Order) -> Result<()> {
        ensure!(
            column < self.columns().len(),
            "column {} out of range ({} columns)",
            column,
            self.columns().len()
        );
        self.sort = (column, order);
        self.rebuild();
        Ok(())
    }

    /// Case-insensitive substring match over the displayed cells.
    /// An empty query clears the filter. Always returns to page 1.
    pub fn search(&mut self, query: &str) {
        self.query = query.trim().to_lowercase();
        self.page = 0;
        self.rebuild();
    }

    pub fn page_count(&self) -> usize {
        self.view.len().div_ceil(self.page_size).max(1)
    }

    /// One-based current page.
    pub fn current_page(&self) -> usize {
        self.page + 1
    }

    /// Jump to page `n` (one-based), clamped to the available pages.
    pub fn page(&mut self, n: usize) -> usize {
        self.page = n.clamp(1, self.page_count()) - 1;
        self.current_page()
    }

    /// The rows on the current page, in view order.
    pub fn page_rows(&self) -> Vec<&[Value]> {
        self.rows_on_page(self.current_page())
    }

    /// The rows on page `n` (one-based) of the current view, without moving
    /// the table to that page. Out-of-range pages are empty.
    pub fn rows_on_page(&self, n: usize) -> Vec<&[Value]> {
        let (start, end) = self.page_bounds(n.saturating_sub(1));
        self.view[start..end]
            .iter()
            .map(|&i| self.rows[i].as_slice())
            .collect()
    }

    /// e.g. `Showing 11 to 20 of 57 entries`.
    pub fn info(&self) -> String {
        self.info_for(self.current_page())
    }

    /// The info line as it reads while page `n` (one-based) is shown.
    pub fn info_for(&self, n: usize) -> String {
        let (start, end) = self.page_bounds(n.saturating_sub(1));
        let first = if start == end { 0 } else { start + 1 };
        let mut s = format!("Showing {} to {} of {} entries", first, end, self.view.len());
        if !self.query.is_empty() {
            s.push_str(&format!(" (filtered from {} total entries)", self.rows.len()));
        }
        s
    }

    fn page_bounds(&self, page: usize) -> (usize, usize) {
        let start = page.saturating_mul(self.page_size).min(self.view.len());
        let end = (start + self.page_size).min(self.view.len());
        (start, end)
    }

    fn rebuild(&mut self) {
        let query = &self.query;
        let rows = &self.rows;
        let mut view: Vec<usize> = (0..rows.len())
            .filter(|&i| {
                query.is_empty()
                    || rows[i]
                        .iter()
                        .any(|v| v.to_string().to_lowercase().contains(query.as_str()))
            })
            .collect();

        let (col, order) = self.sort;
        view.sort_by(|&a, &b| {
            let ord = rows[a][col].compare(&rows[b][col]);
            match order {
                Order::Asc => ord,
                Order::Desc => ord.reverse(),
            }
        });
        self.view = view;

        if self.page >= self.page_count() {
            self.page = self.page_count() - 1;
        }
    }
}
