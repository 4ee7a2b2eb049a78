use std::cmp::Ordering;
use std::fmt;

use super::model::Measurement;

// ---------------------------------------------------------------------------
// Sort column / direction
// ---------------------------------------------------------------------------

/// Table columns a measurement list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Id,
    SampleId,
    AreaUm2,
    AreaPixels,
    Timestamp,
    Operator,
    ImageName,
}

impl SortColumn {
    pub const ALL: [SortColumn; 7] = [
        SortColumn::Id,
        SortColumn::SampleId,
        SortColumn::AreaUm2,
        SortColumn::AreaPixels,
        SortColumn::Timestamp,
        SortColumn::Operator,
        SortColumn::ImageName,
    ];

    /// Table header label.
    pub fn label(self) -> &'static str {
        match self {
            SortColumn::Id => "ID",
            SortColumn::SampleId => "Sample",
            SortColumn::AreaUm2 => "Area (µm²)",
            SortColumn::AreaPixels => "Area (px)",
            SortColumn::Timestamp => "Date/Time",
            SortColumn::Operator => "Operator",
            SortColumn::ImageName => "Image",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "⏶",
            SortDirection::Descending => "⏷",
        }
    }
}

// ---------------------------------------------------------------------------
// Sort state
// ---------------------------------------------------------------------------

/// Current ordering; `column == None` keeps load order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<SortColumn>,
    pub direction: SortDirection,
}

impl SortState {
    /// Request `column`: the same column again flips direction, a new one
    /// starts ascending.
    pub fn toggle(&mut self, column: SortColumn) {
        if self.column == Some(column) {
            self.direction = self.direction.flipped();
        } else {
            self.column = Some(column);
            self.direction = SortDirection::Ascending;
        }
    }
}

// ---------------------------------------------------------------------------
// Comparator
// ---------------------------------------------------------------------------

/// Sort key for one text cell. Variant order is the sort order: missing,
/// then numeric-looking, then other text.
#[derive(Debug)]
enum TextKey {
    Missing,
    Number(f64),
    Text(String),
}

impl TextKey {
    fn of(value: Option<&str>) -> Self {
        match value {
            None => TextKey::Missing,
            Some(s) => match s.trim().parse::<f64>() {
                Ok(n) => TextKey::Number(n),
                Err(_) => TextKey::Text(s.to_lowercase()),
            },
        }
    }

    fn rank(&self) -> u8 {
        match self {
            TextKey::Missing => 0,
            TextKey::Number(_) => 1,
            TextKey::Text(_) => 2,
        }
    }

    fn order(&self, other: &Self) -> Ordering {
        match (self, other) {
            (TextKey::Number(x), TextKey::Number(y)) => x.total_cmp(y),
            (TextKey::Text(x), TextKey::Text(y)) => x.cmp(y),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Missing values first, then numeric-looking values by number, then the
/// rest case-insensitively.
fn compare_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    TextKey::of(a).order(&TextKey::of(b))
}

/// Ascending comparison of two measurements on one column. Returns
/// `Equal` for tied keys so a stable sort keeps their relative order.
pub fn compare(a: &Measurement, b: &Measurement, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Id => compare_text(Some(&a.id), Some(&b.id)),
        SortColumn::SampleId => compare_text(Some(&a.sample_id), Some(&b.sample_id)),
        SortColumn::AreaUm2 => a.area_um2.total_cmp(&b.area_um2),
        SortColumn::AreaPixels => a.area_pixels.cmp(&b.area_pixels),
        SortColumn::Timestamp => a.timestamp.cmp(&b.timestamp),
        SortColumn::Operator => compare_text(a.operator.as_deref(), b.operator.as_deref()),
        SortColumn::ImageName => compare_text(a.image_name.as_deref(), b.image_name.as_deref()),
    }
}

/// Stable in-place sort of `indices` (into `measurements`) by `state`.
pub fn sort_indices(indices: &mut [usize], measurements: &[Measurement], state: &SortState) {
    let Some(column) = state.column else {
        return;
    };
    indices.sort_by(|&i, &j| {
        let ord = compare(&measurements[i], &measurements[j], column);
        match state.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::RawMeasurement;

    fn m(id: &str, area: f64, ts: &str, image: Option<&str>) -> Measurement {
        RawMeasurement {
            id: Some(id.into()),
            sample_id: Some("S".into()),
            area_um2: Some(area),
            timestamp: Some(ts.into()),
            image_name: image.map(String::from),
            ..Default::default()
        }
        .into_measurement()
        .unwrap()
    }

    #[test]
    fn toggle_flips_same_column_and_resets_on_new_column() {
        let mut state = SortState::default();
        state.toggle(SortColumn::AreaUm2);
        assert_eq!(state.direction, SortDirection::Ascending);
        state.toggle(SortColumn::AreaUm2);
        assert_eq!(state.direction, SortDirection::Descending);
        state.toggle(SortColumn::Id);
        assert_eq!(state.column, Some(SortColumn::Id));
        assert_eq!(state.direction, SortDirection::Ascending);
    }

    #[test]
    fn numeric_looking_ids_compare_numerically() {
        let data = vec![
            m("10", 1.0, "2024-01-01", None),
            m("9", 1.0, "2024-01-01", None),
            m("100", 1.0, "2024-01-01", None),
        ];
        let mut idx = vec![0, 1, 2];
        let state = SortState {
            column: Some(SortColumn::Id),
            direction: SortDirection::Ascending,
        };
        sort_indices(&mut idx, &data, &state);
        assert_eq!(idx, vec![1, 0, 2]);
    }

    #[test]
    fn text_compare_ignores_case() {
        let data = vec![
            m("a", 1.0, "2024-01-01", Some("beta.jpg")),
            m("b", 1.0, "2024-01-01", Some("Alpha.jpg")),
            m("c", 1.0, "2024-01-01", None),
        ];
        let mut idx = vec![0, 1, 2];
        let state = SortState {
            column: Some(SortColumn::ImageName),
            direction: SortDirection::Ascending,
        };
        sort_indices(&mut idx, &data, &state);
        assert_eq!(idx, vec![2, 1, 0]);
    }

    #[test]
    fn descending_reverses_distinct_keys_and_keeps_ties_stable() {
        let data = vec![
            m("a", 2.0, "2024-01-02", None),
            m("b", 1.0, "2024-01-01", None),
            m("c", 2.0, "2024-01-03", None),
        ];
        let mut asc = vec![0, 1, 2];
        let mut state = SortState::default();
        state.toggle(SortColumn::AreaUm2);
        sort_indices(&mut asc, &data, &state);
        assert_eq!(asc, vec![1, 0, 2]);

        let mut desc = vec![0, 1, 2];
        state.toggle(SortColumn::AreaUm2);
        sort_indices(&mut desc, &data, &state);
        assert_eq!(desc, vec![0, 2, 1]);
    }

    #[test]
    fn mixed_ids_sort_the_same_for_every_load_order() {
        let ids = ["9", "10", "1a", "a2", "B"];
        let expected = vec!["9", "10", "1a", "a2", "B"];
        let mut reversed = expected.clone();
        reversed.reverse();

        let mut orders: Vec<Vec<&str>> = (0..ids.len())
            .map(|k| ids.iter().cycle().skip(k).take(ids.len()).copied().collect())
            .collect();
        orders.push(ids.iter().rev().copied().collect());

        for order in orders {
            let data: Vec<Measurement> =
                order.iter().map(|id| m(id, 1.0, "2024-01-01", None)).collect();
            let sorted = |direction| {
                let mut idx: Vec<usize> = (0..data.len()).collect();
                let state = SortState {
                    column: Some(SortColumn::Id),
                    direction,
                };
                sort_indices(&mut idx, &data, &state);
                idx.iter().map(|&i| data[i].id.as_str()).collect::<Vec<_>>()
            };
            assert_eq!(sorted(SortDirection::Ascending), expected, "load order {order:?}");
            assert_eq!(sorted(SortDirection::Descending), reversed, "load order {order:?}");
        }
    }

    #[test]
    fn dates_compare_as_timestamps() {
        let data = vec![
            m("a", 1.0, "2024-01-15 09:00:00", None),
            m("b", 1.0, "2024-01-02T23:00:00", None),
        ];
        assert_eq!(
            compare(&data[0], &data[1], SortColumn::Timestamp),
            Ordering::Greater
        );
    }
}
