use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::model::Measurement;

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Aggregate over a set of measurements. All zeros for an empty set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation of `area_um2`.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub distinct_samples: usize,
    pub distinct_operators: usize,
}

pub fn aggregate<'a, I>(measurements: I) -> Statistics
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let items: Vec<&Measurement> = measurements.into_iter().collect();
    if items.is_empty() {
        return Statistics::default();
    }

    let n = items.len() as f64;
    let mean = items.iter().map(|m| m.area_um2).sum::<f64>() / n;
    let variance = items
        .iter()
        .map(|m| (m.area_um2 - mean).powi(2))
        .sum::<f64>()
        / n;
    let min = items.iter().map(|m| m.area_um2).fold(f64::INFINITY, f64::min);
    let max = items
        .iter()
        .map(|m| m.area_um2)
        .fold(f64::NEG_INFINITY, f64::max);

    let samples: BTreeSet<&str> = items.iter().map(|m| m.sample_id.as_str()).collect();
    let operators: BTreeSet<&str> = items.iter().map(|m| m.operator_label()).collect();

    Statistics {
        count: items.len(),
        mean,
        std_dev: variance.sqrt(),
        min,
        max,
        distinct_samples: samples.len(),
        distinct_operators: operators.len(),
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// `[lower, upper)`, except the last bin which includes `upper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }
}

/// Partition `[min, max]` of `values` into `bin_count` equal-width bins.
///
/// Empty input or `bin_count == 0` yields no bins. When every value is
/// the same there is nothing to partition and a single zero-width bin
/// holds them all.
pub fn histogram(values: &[f64], bin_count: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bin_count == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bin_count as f64;

    if !width.is_finite() || width <= 0.0 {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lower: min + i as f64 * width,
            upper: if i + 1 == bin_count {
                max
            } else {
                min + (i + 1) as f64 * width
            },
            count: 0,
        })
        .collect();

    for &v in values {
        // NaN and anything below min land in bin 0 via the saturating cast.
        let idx = (((v - min) / width).floor() as usize).min(bin_count - 1);
        bins[idx].count += 1;
    }
    bins
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Running total for one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DayTotals {
    pub sum: f64,
    pub count: usize,
}

/// Members of each sample, in input order.
pub fn group_by_sample<'a, I>(measurements: I) -> BTreeMap<String, Vec<&'a Measurement>>
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let mut groups: BTreeMap<String, Vec<&Measurement>> = BTreeMap::new();
    for m in measurements {
        groups.entry(m.sample_id.clone()).or_default().push(m);
    }
    groups
}

/// Area sum and count per calendar day. Timestamps are UTC wall-clock,
/// so the day is the date part as stored.
pub fn group_by_day<'a, I>(measurements: I) -> BTreeMap<NaiveDate, DayTotals>
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for m in measurements {
        let entry = days.entry(m.timestamp.date()).or_default();
        entry.sum += m.area_um2;
        entry.count += 1;
    }
    days
}

/// Number of measurements per operator label.
pub fn count_by_operator<'a, I>(measurements: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for m in measurements {
        *counts.entry(m.operator_label().to_string()).or_default() += 1;
    }
    counts
}

/// Mean area of a non-empty group, 0 otherwise.
pub fn mean_area(group: &[&Measurement]) -> f64 {
    if group.is_empty() {
        0.0
    } else {
        group.iter().map(|m| m.area_um2).sum::<f64>() / group.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::RawMeasurement;

    fn m(id: &str, sample: &str, area: f64, ts: &str, op: Option<&str>) -> Measurement {
        RawMeasurement {
            id: Some(id.into()),
            sample_id: Some(sample.into()),
            area_um2: Some(area),
            timestamp: Some(ts.into()),
            operator: op.map(String::from),
            ..Default::default()
        }
        .into_measurement()
        .unwrap()
    }

    #[test]
    fn aggregate_of_ten_twenty_thirty() {
        let data = vec![
            m("1", "A", 10.0, "2024-01-01", Some("x")),
            m("2", "A", 20.0, "2024-01-01", Some("y")),
            m("3", "B", 30.0, "2024-01-02", None),
        ];
        let s = aggregate(&data);
        assert_eq!(s.count, 3);
        assert!((s.mean - 20.0).abs() < 1e-9);
        assert_eq!(s.min, 10.0);
        assert_eq!(s.max, 30.0);
        assert!((s.std_dev - 8.164_965_8).abs() < 1e-6);
        assert_eq!(s.distinct_samples, 2);
        assert_eq!(s.distinct_operators, 3);
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        let s = aggregate(&Vec::<Measurement>::new());
        assert_eq!(s, Statistics::default());
        assert!(!s.mean.is_nan());
    }

    #[test]
    fn histogram_of_one_to_five_puts_one_value_per_bin() {
        let bins = histogram(&[1.0, 2.0, 3.0, 4.0, 5.0], 5);
        assert_eq!(bins.len(), 5);
        for b in &bins {
            assert!((b.width() - 0.8).abs() < 1e-9);
            assert_eq!(b.count, 1);
        }
        assert_eq!(bins[4].upper, 5.0);
    }

    #[test]
    fn histogram_counts_every_value() {
        let values = [0.3, 7.1, 7.1, 2.2, 9.9, 0.0, 5.5, 3.3, 9.9];
        for bin_count in 1..12 {
            let total: usize = histogram(&values, bin_count).iter().map(|b| b.count).sum();
            assert_eq!(total, values.len(), "bin_count={bin_count}");
        }
    }

    #[test]
    fn histogram_of_identical_values_is_single_bin() {
        let bins = histogram(&[4.0, 4.0, 4.0], 5);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
        assert_eq!(bins[0].lower, 4.0);
        assert_eq!(bins[0].upper, 4.0);
    }

    #[test]
    fn histogram_of_empty_input_or_zero_bins_is_empty() {
        assert!(histogram(&[], 5).is_empty());
        assert!(histogram(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn day_grouping_sums_area_per_date() {
        let data = vec![
            m("1", "A", 1.5, "2024-01-15 10:00:00", None),
            m("2", "A", 2.5, "2024-01-15 23:59:59", None),
            m("3", "B", 4.0, "2024-01-16 00:00:00", None),
        ];
        let days = group_by_day(&data);
        let d15 = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let d16 = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        assert_eq!(days[&d15], DayTotals { sum: 4.0, count: 2 });
        assert_eq!(days[&d16], DayTotals { sum: 4.0, count: 1 });
    }

    #[test]
    fn sample_grouping_keeps_member_order() {
        let data = vec![
            m("1", "A", 1.0, "2024-01-01", None),
            m("2", "B", 2.0, "2024-01-01", None),
            m("3", "A", 3.0, "2024-01-01", None),
        ];
        let groups = group_by_sample(&data);
        let ids: Vec<&str> = groups["A"].iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(mean_area(&groups["A"]), 2.0);
        assert_eq!(count_by_operator(&data)["Unknown"], 3);
    }
}
