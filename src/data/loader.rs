use std::io::Read;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use super::api::ApiClient;
use super::example;
use super::model::{Measurement, RawMeasurement, RawSample, Sample};
use crate::config::DashboardConfig;
use crate::error::DataError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load measurements from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.json` – `{ "measurements": [ {...}, ... ] }`
/// * `.csv`  – header row with the record field names (the export layout)
pub fn load_file(path: &Path) -> Result<Vec<Measurement>, DataError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => parse_measurements(&std::fs::read_to_string(path)?),
        "csv" => parse_csv(std::fs::File::open(path)?),
        other => Err(DataError::UnsupportedFormat(other.to_string())),
    }
}

/// Load samples from a `{ "samples": [...] }` JSON file.
pub fn load_samples_file(path: &Path) -> Result<Vec<Sample>, DataError> {
    parse_samples(&std::fs::read_to_string(path)?)
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Expected shape:
///
/// ```json
/// {
///   "measurements": [
///     { "id": "MEAS_001", "sampleId": "SAMPLE_001", "area_pixels": 1250,
///       "area_um2": 12.5, "dataHora": "2024-01-15 10:30:00",
///       "imagemId": "IMG_001", "nomeImagem": "amostra_001.jpg",
///       "operator": "Dr. João Silva", "scale_pixels_per_um": 10.0 }
///   ]
/// }
/// ```
///
/// Unusable records are dropped with a warning; a document without the
/// `measurements` array is rejected as a whole.
pub fn parse_measurements(text: &str) -> Result<Vec<Measurement>, DataError> {
    let records = top_level_array(text, "measurements")?;
    Ok(decode_records(records, "measurement", RawMeasurement::into_measurement))
}

/// Same policy as [`parse_measurements`] for `{ "samples": [...] }`.
pub fn parse_samples(text: &str) -> Result<Vec<Sample>, DataError> {
    let records = top_level_array(text, "samples")?;
    Ok(decode_records(records, "sample", RawSample::into_sample))
}

fn top_level_array(text: &str, key: &str) -> Result<Vec<JsonValue>, DataError> {
    let root: JsonValue = serde_json::from_str(text)?;
    match root {
        JsonValue::Object(mut obj) => match obj.remove(key) {
            Some(JsonValue::Array(items)) => Ok(items),
            Some(other) => Err(DataError::InvalidFormat(format!(
                "\"{key}\" is {}, expected an array",
                json_kind(&other)
            ))),
            None => Err(DataError::MalformedInput(format!(
                "missing top-level \"{key}\" array"
            ))),
        },
        other => Err(DataError::MalformedInput(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

fn decode_records<R, T>(
    records: Vec<JsonValue>,
    what: &str,
    convert: fn(R) -> Result<T, String>,
) -> Vec<T>
where
    R: DeserializeOwned,
{
    let total = records.len();
    let kept: Vec<T> = records
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| {
            let result = serde_json::from_value::<R>(value)
                .map_err(|e| e.to_string())
                .and_then(convert);
            match result {
                Ok(item) => Some(item),
                Err(reason) => {
                    log::warn!("Dropping {what} record {i}: {reason}");
                    None
                }
            }
        })
        .collect();
    if kept.len() < total {
        log::warn!("Kept {} of {total} {what} records", kept.len());
    }
    kept
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// CSV layout: header row naming record fields (`id`, `sampleId`,
/// `area_um2`, `area_pixels`, `dataHora`, `operator`, `nomeImagem`, ...).
/// Rows go through the same drop policy as JSON records.
pub fn parse_csv<R: Read>(input: R) -> Result<Vec<Measurement>, DataError> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers()?.clone();
    for required in ["id", "sampleId", "area_um2", "dataHora"] {
        if !headers.iter().any(|h| h == required) {
            return Err(DataError::MalformedInput(format!(
                "CSV missing '{required}' column"
            )));
        }
    }

    let mut measurements = Vec::new();
    for (row_no, result) in reader.deserialize::<RawMeasurement>().enumerate() {
        let converted = result
            .map_err(|e| e.to_string())
            .and_then(RawMeasurement::into_measurement);
        match converted {
            Ok(m) => measurements.push(m),
            Err(reason) => log::warn!("Dropping CSV row {row_no}: {reason}"),
        }
    }
    Ok(measurements)
}

// ---------------------------------------------------------------------------
// Source chain
// ---------------------------------------------------------------------------

/// What one source produced. `samples == None` means the source had no
/// sample list and the caller keeps whatever it has.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub origin: String,
    pub measurements: Vec<Measurement>,
    pub samples: Option<Vec<Sample>>,
}

/// One place measurements can come from.
pub trait Source {
    fn name(&self) -> String;
    fn fetch(&self) -> Result<Snapshot, DataError>;
}

/// Remote API: `GET /measurements`, then `GET /samples` best-effort.
pub struct ApiSource {
    client: ApiClient,
}

impl ApiSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl Source for ApiSource {
    fn name(&self) -> String {
        format!("API {}", self.client.base_url())
    }

    fn fetch(&self) -> Result<Snapshot, DataError> {
        let measurements = self.client.measurements()?;
        let samples = match self.client.samples() {
            Ok(s) => Some(s),
            Err(e) => {
                log::warn!("Samples unavailable from API: {e}");
                None
            }
        };
        Ok(Snapshot {
            origin: self.name(),
            measurements,
            samples,
        })
    }
}

/// Local JSON/CSV file, with an optional samples file beside it.
pub struct FileSource {
    pub measurements: PathBuf,
    pub samples: Option<PathBuf>,
}

impl Source for FileSource {
    fn name(&self) -> String {
        format!("file {}", self.measurements.display())
    }

    fn fetch(&self) -> Result<Snapshot, DataError> {
        let measurements = load_file(&self.measurements)?;
        let samples = self.samples.as_deref().and_then(|p| match load_samples_file(p) {
            Ok(s) => Some(s),
            Err(e) => {
                log::warn!("Samples unavailable from {}: {e}", p.display());
                None
            }
        });
        Ok(Snapshot {
            origin: self.name(),
            measurements,
            samples,
        })
    }
}

/// Built-in demonstration data. Never fails.
pub struct ExampleSource;

impl Source for ExampleSource {
    fn name(&self) -> String {
        "example data".to_string()
    }

    fn fetch(&self) -> Result<Snapshot, DataError> {
        Ok(Snapshot {
            origin: self.name(),
            measurements: example::measurements(),
            samples: Some(example::samples()),
        })
    }
}

/// API (if enabled), then the configured file, then example data.
pub fn default_chain(config: &DashboardConfig) -> Vec<Box<dyn Source>> {
    let mut chain: Vec<Box<dyn Source>> = Vec::new();
    if config.use_api {
        match ApiClient::new(&config.api_base_url, config.request_timeout()) {
            Ok(client) => chain.push(Box::new(ApiSource::new(client))),
            Err(e) => log::warn!("Skipping API source: {e}"),
        }
    }
    chain.push(Box::new(FileSource {
        measurements: config.measurements_path.clone(),
        samples: Some(config.samples_path.clone()),
    }));
    chain.push(Box::new(ExampleSource));
    chain
}

/// Try each source in order and return the first success. Failures are
/// logged and fall through; only when every source fails is the last
/// error returned.
pub fn load_first_success(sources: &[Box<dyn Source>]) -> Result<Snapshot, DataError> {
    let mut last_err = DataError::NetworkUnavailable("no data sources configured".to_string());
    for source in sources {
        match source.fetch() {
            Ok(snapshot) => {
                log::info!(
                    "Loaded {} measurements from {}",
                    snapshot.measurements.len(),
                    snapshot.origin
                );
                return Ok(snapshot);
            }
            Err(e) => {
                log::warn!("{} failed, trying next source: {e}", source.name());
                last_err = e;
            }
        }
    }
    Err(last_err)
}
