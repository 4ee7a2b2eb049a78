use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;

use microscope_dashboard::data::example;
use microscope_dashboard::data::export::{export_file, ExportFormat};
use microscope_dashboard::data::filter::FilterCriteria;
use microscope_dashboard::data::loader::{self, FileSource, Source};
use microscope_dashboard::data::model::{parse_timestamp, Measurement};
use microscope_dashboard::data::service::DatasetService;
use microscope_dashboard::data::sort::{SortColumn, SortDirection};
use microscope_dashboard::DataError;

fn unique_test_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!("microdash_{name}_{nanos}"));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn measurement(id: &str, sample: &str, area: f64, ts: &str) -> Measurement {
    Measurement {
        id: id.to_string(),
        sample_id: sample.to_string(),
        area_pixels: (area * 100.0).round() as u64,
        area_um2: area,
        timestamp: parse_timestamp(ts).unwrap(),
        image_id: None,
        image_name: None,
        operator: None,
        scale_pixels_per_um: 10.0,
    }
}

fn example_service() -> DatasetService {
    let mut service = DatasetService::new(10);
    service.load(example::measurements());
    service.load_samples(example::samples());
    service
}

fn view_ids(service: &DatasetService) -> Vec<String> {
    service.filtered().map(|m| m.id.clone()).collect()
}

#[test]
fn aggregate_of_ten_twenty_thirty() {
    let mut service = DatasetService::default();
    service.load(vec![
        measurement("A", "S1", 10.0, "2024-01-01 10:00:00"),
        measurement("B", "S1", 20.0, "2024-01-01 11:00:00"),
        measurement("C", "S2", 30.0, "2024-01-02 09:00:00"),
    ]);

    let stats = service.aggregate();
    assert_eq!(stats.count, 3);
    assert!((stats.mean - 20.0).abs() < 1e-9);
    assert!((stats.std_dev - 8.1650).abs() < 1e-3);
    assert_eq!(stats.min, 10.0);
    assert_eq!(stats.max, 30.0);
    assert_eq!(stats.distinct_samples, 2);
}

#[test]
fn sample_filter_keeps_load_order() {
    let mut service = example_service();
    let count = service.apply_filter(FilterCriteria::default().with_sample("SAMPLE_001"));
    assert_eq!(count, 2);
    assert_eq!(view_ids(&service), vec!["MEAS_001", "MEAS_003"]);
}

#[test]
fn applying_the_same_filter_twice_is_idempotent() {
    let mut service = example_service();
    let criteria = FilterCriteria::default()
        .with_start_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        .with_end_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

    service.apply_filter(criteria.clone());
    let first = view_ids(&service);
    service.apply_filter(criteria);
    assert_eq!(view_ids(&service), first);
    assert_eq!(first.len(), 4);
}

#[test]
fn explicit_sort_is_stable_and_toggle_reverses() {
    let mut service = example_service();

    service.sort(SortColumn::AreaUm2, SortDirection::Ascending);
    let ascending = view_ids(&service);
    assert_eq!(ascending.first().map(String::as_str), Some("MEAS_004"));
    assert_eq!(ascending.last().map(String::as_str), Some("MEAS_003"));

    service.sort(SortColumn::AreaUm2, SortDirection::Ascending);
    assert_eq!(view_ids(&service), ascending);

    service.toggle_sort(SortColumn::AreaUm2);
    let mut reversed = ascending.clone();
    reversed.reverse();
    assert_eq!(view_ids(&service), reversed);
}

#[test]
fn mixed_id_sort_does_not_depend_on_load_order() {
    let ids = ["10", "1a", "9", "MEAS_2", "meas_10"];
    let load = |order: &[&str]| {
        let mut service = DatasetService::default();
        service.load(
            order
                .iter()
                .map(|id| measurement(id, "S1", 1.0, "2024-01-01 10:00:00"))
                .collect(),
        );
        service.sort(SortColumn::Id, SortDirection::Ascending);
        let ascending = view_ids(&service);
        service.toggle_sort(SortColumn::Id);
        (ascending, view_ids(&service))
    };

    let (ascending, descending) = load(&ids);
    assert_eq!(ascending, vec!["9", "10", "1a", "meas_10", "MEAS_2"]);
    let mut reversed = ascending.clone();
    reversed.reverse();
    assert_eq!(descending, reversed);

    let mut backwards = ids;
    backwards.reverse();
    assert_eq!(load(&backwards), (ascending, descending));
}

#[test]
fn pages_concatenate_to_the_view() {
    let mut service = example_service();
    service.sort(SortColumn::Timestamp, SortDirection::Descending);
    let view = view_ids(&service);

    let total_pages = service.paginate(1, 2).total_pages;
    assert_eq!(total_pages, 3);

    let mut joined = Vec::new();
    for page in 1..=total_pages {
        joined.extend(service.paginate(page, 2).rows.iter().map(|m| m.id.clone()));
    }
    assert_eq!(joined, view);
}

#[test]
fn page_past_the_end_is_empty_and_keeps_state() {
    let mut service = example_service();
    let page = service.paginate(2, 10);
    assert!(page.rows.is_empty());
    assert_eq!(page.total_pages, 1);
    assert_eq!(service.page(), 1);
    assert_eq!(service.current_page().rows.len(), 5);
}

#[test]
fn histogram_counts_cover_every_filtered_value() {
    let mut service = example_service();
    let bins = service.histogram(5);
    assert_eq!(bins.len(), 5);
    assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);

    service.apply_filter(FilterCriteria::default().with_sample("SAMPLE_002"));
    let bins = service.histogram(3);
    assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
}

#[test]
fn mean_lies_between_min_and_max() {
    let service = example_service();
    let stats = service.aggregate();
    assert!(stats.min <= stats.mean && stats.mean <= stats.max);
}

#[test]
fn exported_json_feeds_back_into_a_file_source() {
    let dir = unique_test_dir("export_reload");
    let mut service = example_service();
    service.apply_filter(FilterCriteria::default().with_operator("Maria Santos"));

    let day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    let path = dir.join(ExportFormat::Json.default_file_name(day));
    let written = export_file(&path, ExportFormat::Json, service.filtered()).unwrap();
    assert_eq!(written, 2);

    let source = FileSource {
        measurements: path,
        samples: None,
    };
    let snapshot = source.fetch().unwrap();
    assert!(snapshot.samples.is_none());
    let ids: Vec<&str> = snapshot.measurements.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["MEAS_002", "MEAS_005"]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn chain_falls_through_a_missing_file_to_example_data() {
    let dir = unique_test_dir("chain");
    let chain: Vec<Box<dyn Source>> = vec![
        Box::new(FileSource {
            measurements: dir.join("absent.json"),
            samples: None,
        }),
        Box::new(loader::ExampleSource),
    ];

    let snapshot = loader::load_first_success(&chain).unwrap();
    assert_eq!(snapshot.origin, "example data");
    assert_eq!(snapshot.measurements.len(), 5);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn malformed_document_leaves_the_dataset_untouched() {
    let mut service = example_service();
    let err = service.load_json("{ not json").unwrap_err();
    assert!(matches!(err, DataError::MalformedInput(_)));
    assert_eq!(service.len(), 5);
}
