use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};

use super::filter::{filtered_indices, FilterCriteria};
use super::loader;
use super::model::{Measurement, Sample};
use super::sort::{sort_indices, SortColumn, SortDirection, SortState};
use super::stats::{self, DayTotals, HistogramBin, Statistics};
use crate::error::DataError;

pub const DEFAULT_PAGE_SIZE: usize = 25;

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// One slice of the filtered, sorted view.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    /// 1-based page number this slice was requested for.
    pub number: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub rows: Vec<&'a Measurement>,
}

// ---------------------------------------------------------------------------
// DatasetService
// ---------------------------------------------------------------------------

/// Holds the active measurements and samples together with the filter,
/// sort and pagination state, and derives every view from them.
///
/// `view` caches indices into `measurements` that pass the filter, in
/// sort order; it is rebuilt whenever any input changes.
#[derive(Debug, Clone)]
pub struct DatasetService {
    measurements: Vec<Measurement>,
    samples: BTreeMap<String, Sample>,
    criteria: FilterCriteria,
    sort: SortState,
    view: Vec<usize>,
    page: usize,
    page_size: usize,
}

impl Default for DatasetService {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl DatasetService {
    pub fn new(page_size: usize) -> Self {
        Self {
            measurements: Vec::new(),
            samples: BTreeMap::new(),
            criteria: FilterCriteria::default(),
            sort: SortState::default(),
            view: Vec::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    // -- loading ------------------------------------------------------------

    /// Replace the active measurements. The current filter and sort are
    /// re-applied; the current page is kept while it is still in range.
    /// Returns the filtered count.
    pub fn load(&mut self, measurements: Vec<Measurement>) -> usize {
        self.measurements = measurements;
        self.rebuild_view();
        if self.page > self.total_pages().max(1) {
            self.page = 1;
        }
        self.view.len()
    }

    /// Parse a `{"measurements": [...]}` document and load it. On error
    /// the active dataset is left as it was.
    pub fn load_json(&mut self, text: &str) -> Result<usize, DataError> {
        let measurements = loader::parse_measurements(text)?;
        Ok(self.load(measurements))
    }

    pub fn load_samples(&mut self, samples: Vec<Sample>) {
        self.samples = samples.into_iter().map(|s| (s.id.clone(), s)).collect();
    }

    /// Drop all data and reset filter, sort and pagination.
    pub fn clear(&mut self) {
        self.measurements.clear();
        self.samples.clear();
        self.criteria = FilterCriteria::default();
        self.sort = SortState::default();
        self.view.clear();
        self.page = 1;
    }

    // -- filter / sort ------------------------------------------------------

    /// Replace the filter criteria and go back to page 1. Returns the
    /// filtered count.
    pub fn apply_filter(&mut self, criteria: FilterCriteria) -> usize {
        self.criteria = criteria;
        self.rebuild_view();
        self.page = 1;
        self.view.len()
    }

    /// Header-click semantics: the same column twice flips the direction,
    /// a new column starts ascending.
    pub fn toggle_sort(&mut self, column: SortColumn) -> SortState {
        self.sort.toggle(column);
        self.rebuild_view();
        self.page = 1;
        self.sort
    }

    /// Order by `column` in an explicit direction.
    pub fn sort(&mut self, column: SortColumn, direction: SortDirection) {
        self.sort = SortState {
            column: Some(column),
            direction,
        };
        self.rebuild_view();
        self.page = 1;
    }

    fn rebuild_view(&mut self) {
        let mut view = filtered_indices(&self.measurements, &self.criteria);
        sort_indices(&mut view, &self.measurements, &self.sort);
        self.view = view;
    }

    // -- pagination ---------------------------------------------------------

    pub fn total_pages(&self) -> usize {
        self.view.len().div_ceil(self.page_size)
    }

    /// Move to `page` with `page_size` rows per page.
    ///
    /// A page outside `1..=total_pages` (or a zero page size) leaves the
    /// state unchanged and yields an empty page.
    pub fn paginate(&mut self, page: usize, page_size: usize) -> Page<'_> {
        let total_pages = if page_size == 0 {
            0
        } else {
            self.view.len().div_ceil(page_size)
        };
        if page == 0 || page > total_pages {
            log::debug!("page {page} of {total_pages} out of range, ignoring");
            return Page {
                number: page,
                page_size,
                total_pages,
                total_items: self.view.len(),
                rows: Vec::new(),
            };
        }
        self.page = page;
        self.page_size = page_size;
        self.current_page()
    }

    /// Change the page size and return to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn current_page(&self) -> Page<'_> {
        let start = (self.page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.view.len());
        let rows = self
            .view
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|&i| &self.measurements[i])
            .collect();
        Page {
            number: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages(),
            total_items: self.view.len(),
            rows,
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn all(&self) -> &[Measurement] {
        &self.measurements
    }

    /// The filtered view in sort order.
    pub fn filtered(&self) -> impl Iterator<Item = &Measurement> + '_ {
        self.view.iter().map(|&i| &self.measurements[i])
    }

    pub fn filtered_len(&self) -> usize {
        self.view.len()
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn samples(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.values()
    }

    /// The loaded sample, or a placeholder for an unknown id.
    pub fn sample_info(&self, id: &str) -> Cow<'_, Sample> {
        match self.samples.get(id) {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(Sample::placeholder(id)),
        }
    }

    // -- derived data -------------------------------------------------------

    pub fn aggregate(&self) -> Statistics {
        stats::aggregate(self.filtered())
    }

    /// Histogram of `area_um2` over the filtered view.
    pub fn histogram(&self, bin_count: usize) -> Vec<HistogramBin> {
        let areas: Vec<f64> = self.filtered().map(|m| m.area_um2).collect();
        stats::histogram(&areas, bin_count)
    }

    pub fn group_by_sample(&self) -> BTreeMap<String, Vec<&Measurement>> {
        stats::group_by_sample(self.filtered())
    }

    pub fn group_by_day(&self) -> BTreeMap<NaiveDate, DayTotals> {
        stats::group_by_day(self.filtered())
    }

    pub fn count_by_operator(&self) -> BTreeMap<String, usize> {
        stats::count_by_operator(self.filtered())
    }

    /// `(sequence, area)` points of the filtered view in time order,
    /// sequence starting at 1.
    pub fn area_trend(&self) -> Vec<[f64; 2]> {
        let mut rows: Vec<&Measurement> = self.filtered().collect();
        rows.sort_by_key(|m| m.timestamp);
        rows.iter()
            .enumerate()
            .map(|(i, m)| [(i + 1) as f64, m.area_um2])
            .collect()
    }

    /// The `n` most recent measurements of the whole dataset, newest first.
    pub fn recent(&self, n: usize) -> Vec<&Measurement> {
        let mut rows: Vec<&Measurement> = self.measurements.iter().collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows.truncate(n);
        rows
    }

    pub fn last_measurement(&self) -> Option<NaiveDateTime> {
        self.measurements.iter().map(|m| m.timestamp).max()
    }

    /// Sample ids present in the dataset, for the filter drop-down.
    pub fn distinct_sample_ids(&self) -> BTreeSet<String> {
        self.measurements
            .iter()
            .map(|m| m.sample_id.clone())
            .collect()
    }

    /// Operator labels present in the dataset, for the filter drop-down.
    pub fn distinct_operators(&self) -> BTreeSet<String> {
        self.measurements
            .iter()
            .map(|m| m.operator_label().to_string())
            .collect()
    }
}
