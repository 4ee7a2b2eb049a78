use chrono::{NaiveDate, NaiveDateTime};

use super::model::{parse_timestamp, Measurement};

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// Active predicates over measurements, combined with AND.
/// `None` (or an empty search string) means no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Inclusive lower bound.
    pub start: Option<NaiveDateTime>,
    /// Inclusive upper bound.
    pub end: Option<NaiveDateTime>,
    pub sample_id: Option<String>,
    /// Compared against [`Measurement::operator_label`], so `"Unknown"`
    /// selects measurements without an operator.
    pub operator: Option<String>,
    /// Substring over id and sample id.
    pub search: String,
}

impl FilterCriteria {
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start = date.and_hms_opt(0, 0, 0);
        self
    }

    /// A date-only end bound covers the whole day, up to 23:59:59.
    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end = date.and_hms_opt(23, 59, 59);
        self
    }

    pub fn with_sample(mut self, sample_id: impl Into<String>) -> Self {
        self.sample_id = Some(sample_id.into());
        self
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Whether no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.start.is_none()
            && self.end.is_none()
            && self.sample_id.is_none()
            && self.operator.is_none()
            && self.search.trim().is_empty()
    }

    /// Evaluate every active predicate against one measurement.
    pub fn matches(&self, m: &Measurement) -> bool {
        if let Some(start) = self.start {
            if m.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if m.timestamp > end {
                return false;
            }
        }
        if let Some(sample) = &self.sample_id {
            if &m.sample_id != sample {
                return false;
            }
        }
        if let Some(op) = &self.operator {
            if m.operator_label() != op {
                return false;
            }
        }
        let needle = self.search.trim();
        if !needle.is_empty() {
            let needle = needle.to_lowercase();
            if !m.id.to_lowercase().contains(&needle)
                && !m.sample_id.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Parse a user-entered date bound. A date-only end bound is pushed to
/// the end of that day; a full timestamp is used as given.
pub fn parse_bound(raw: &str, is_end: bool) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return if is_end {
            date.and_hms_opt(23, 59, 59)
        } else {
            date.and_hms_opt(0, 0, 0)
        };
    }
    parse_timestamp(s)
}

/// Return indices of measurements that pass all active predicates, in
/// their original order.
pub fn filtered_indices(measurements: &[Measurement], criteria: &FilterCriteria) -> Vec<usize> {
    measurements
        .iter()
        .enumerate()
        .filter(|(_, m)| criteria.matches(m))
        .map(|(i, _)| i)
        .collect()
}
