use std::io::Write;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::model::{format_timestamp, Measurement};
use crate::error::DataError;

/// Fixed CSV column order.
pub const CSV_HEADERS: [&str; 7] = [
    "id",
    "sampleId",
    "area_um2",
    "area_pixels",
    "dataHora",
    "operator",
    "nomeImagem",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// `medicoes_YYYY-MM-DD.<ext>`
    pub fn default_file_name(self, date: NaiveDate) -> String {
        format!("medicoes_{}.{}", date.format("%Y-%m-%d"), self.extension())
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Header row plus one row per measurement, every field quoted.
pub fn write_csv<'a, W, I>(out: W, measurements: I) -> Result<(), DataError>
where
    W: Write,
    I: IntoIterator<Item = &'a Measurement>,
{
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(out);
    writer.write_record(CSV_HEADERS)?;
    for m in measurements {
        let area = m.area_um2.to_string();
        let pixels = m.area_pixels.to_string();
        let timestamp = format_timestamp(&m.timestamp);
        let row: [&str; 7] = [
            &m.id,
            &m.sample_id,
            &area,
            &pixels,
            &timestamp,
            m.operator.as_deref().unwrap_or(""),
            m.image_name.as_deref().unwrap_or(""),
        ];
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct JsonExport<'a> {
    exported_at: String,
    total_records: usize,
    measurements: Vec<&'a Measurement>,
}

/// `{ exported_at, total_records, measurements }`, pretty-printed. The
/// result loads back through the JSON loader.
pub fn write_json<'a, W, I>(
    out: W,
    measurements: I,
    exported_at: DateTime<Utc>,
) -> Result<(), DataError>
where
    W: Write,
    I: IntoIterator<Item = &'a Measurement>,
{
    let measurements: Vec<&Measurement> = measurements.into_iter().collect();
    let doc = JsonExport {
        exported_at: exported_at.to_rfc3339(),
        total_records: measurements.len(),
        measurements,
    };
    serde_json::to_writer_pretty(out, &doc)?;
    Ok(())
}

/// Write `measurements` to `path` in `format`. Returns the record count.
pub fn export_file<'a, I>(
    path: &Path,
    format: ExportFormat,
    measurements: I,
) -> Result<usize, DataError>
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let rows: Vec<&Measurement> = measurements.into_iter().collect();
    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
    match format {
        ExportFormat::Csv => write_csv(file, rows.iter().copied())?,
        ExportFormat::Json => write_json(file, rows.iter().copied(), Utc::now())?,
    }
    log::info!("Exported {} measurements to {}", rows.len(), path.display());
    Ok(rows.len())
}
