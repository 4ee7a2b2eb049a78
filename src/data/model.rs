use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Label used wherever a measurement has no operator.
pub const UNKNOWN_OPERATOR: &str = "Unknown";
/// Pixel-to-micrometre scale assumed when a record omits it.
pub const DEFAULT_SCALE_PIXELS_PER_UM: f64 = 10.0;
/// Wire format for every timestamp written back out.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Parse the timestamp shapes seen in measurement files.
///
/// Offsets are converted to UTC and dropped; naive values are taken as
/// UTC already. A bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn serialize_timestamp<S: serde::Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_timestamp(ts))
}

fn serialize_opt_timestamp<S: serde::Serializer>(
    ts: &Option<NaiveDateTime>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match ts {
        Some(ts) => s.serialize_str(&format_timestamp(ts)),
        None => s.serialize_none(),
    }
}

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

/// One area reading of a sample. Field names on the wire follow
/// `measurements.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub id: String,
    #[serde(rename = "sampleId")]
    pub sample_id: String,
    pub area_pixels: u64,
    pub area_um2: f64,
    #[serde(rename = "dataHora", serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "imagemId")]
    pub image_id: Option<String>,
    #[serde(rename = "nomeImagem")]
    pub image_name: Option<String>,
    pub operator: Option<String>,
    pub scale_pixels_per_um: f64,
}

impl Measurement {
    /// Operator name, or [`UNKNOWN_OPERATOR`].
    pub fn operator_label(&self) -> &str {
        self.operator.as_deref().unwrap_or(UNKNOWN_OPERATOR)
    }
}

/// Lenient decode target for one record; converted by
/// [`RawMeasurement::into_measurement`].
#[derive(Debug, Default, Deserialize)]
pub struct RawMeasurement {
    pub id: Option<String>,
    #[serde(rename = "sampleId")]
    pub sample_id: Option<String>,
    pub area_pixels: Option<f64>,
    pub area_um2: Option<f64>,
    #[serde(rename = "dataHora")]
    pub timestamp: Option<String>,
    #[serde(rename = "imagemId")]
    pub image_id: Option<String>,
    #[serde(rename = "nomeImagem")]
    pub image_name: Option<String>,
    pub operator: Option<String>,
    pub scale_pixels_per_um: Option<f64>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl RawMeasurement {
    /// Validate and fill defaults. The error string says why the record
    /// was dropped.
    pub fn into_measurement(self) -> Result<Measurement, String> {
        let id = non_empty(self.id).ok_or("missing id")?;
        let sample_id = non_empty(self.sample_id).ok_or("missing sampleId")?;

        let area_um2 = self.area_um2.ok_or("missing area_um2")?;
        if !area_um2.is_finite() || area_um2 < 0.0 {
            return Err(format!("invalid area_um2 {area_um2}"));
        }

        let raw_ts = self.timestamp.ok_or("missing dataHora")?;
        let timestamp =
            parse_timestamp(&raw_ts).ok_or_else(|| format!("unparseable dataHora '{raw_ts}'"))?;

        let scale = self
            .scale_pixels_per_um
            .unwrap_or(DEFAULT_SCALE_PIXELS_PER_UM);
        if !scale.is_finite() || scale <= 0.0 {
            return Err(format!("invalid scale_pixels_per_um {scale}"));
        }

        let area_pixels = match self.area_pixels {
            Some(px) if px.is_finite() && px >= 0.0 => px.round() as u64,
            Some(px) => return Err(format!("invalid area_pixels {px}")),
            None => (area_um2 * scale * scale).round() as u64,
        };

        Ok(Measurement {
            id,
            sample_id,
            area_pixels,
            area_um2,
            timestamp,
            image_id: non_empty(self.image_id),
            image_name: non_empty(self.image_name),
            operator: non_empty(self.operator),
            scale_pixels_per_um: scale,
        })
    }
}

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// A physical specimen. Wire names follow `samples.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "dataColeta", serialize_with = "serialize_opt_timestamp")]
    pub collected_at: Option<NaiveDateTime>,
    #[serde(rename = "operadorResponsavel")]
    pub responsible_operator: String,
}

impl Sample {
    /// Stand-in for a sample id that no loaded sample matches.
    pub fn placeholder(id: &str) -> Self {
        Sample {
            id: id.to_string(),
            name: id.to_string(),
            kind: "Unknown".to_string(),
            collected_at: None,
            responsible_operator: "N/A".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSample {
    pub id: Option<String>,
    pub nome: Option<String>,
    pub tipo: Option<String>,
    #[serde(rename = "dataColeta")]
    pub data_coleta: Option<String>,
    #[serde(rename = "operadorResponsavel")]
    pub operador_responsavel: Option<String>,
}

impl RawSample {
    pub fn into_sample(self) -> Result<Sample, String> {
        let id = non_empty(self.id).ok_or("missing id")?;
        Ok(Sample {
            name: non_empty(self.nome).unwrap_or_else(|| id.clone()),
            kind: non_empty(self.tipo).unwrap_or_else(|| "Unknown".to_string()),
            collected_at: self.data_coleta.as_deref().and_then(parse_timestamp),
            responsible_operator: non_empty(self.operador_responsavel)
                .unwrap_or_else(|| "N/A".to_string()),
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn parses_every_supported_timestamp_shape() {
        let expected = ymd_hms(2024, 1, 15, 10, 30, 0);
        assert_eq!(parse_timestamp("2024-01-15 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T10:30:00.000"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 10:30"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-15"),
            Some(ymd_hms(2024, 1, 15, 0, 0, 0))
        );
        assert_eq!(parse_timestamp("15/01/2024"), None);
        assert_eq!(parse_timestamp("  "), None);
    }

    #[test]
    fn missing_area_pixels_is_derived_from_scale() {
        let raw = RawMeasurement {
            id: Some("MEAS_001".into()),
            sample_id: Some("SAMPLE_001".into()),
            area_um2: Some(12.5),
            timestamp: Some("2024-01-15 10:30:00".into()),
            ..Default::default()
        };
        let m = raw.into_measurement().unwrap();
        assert_eq!(m.area_pixels, 1250);
        assert_eq!(m.scale_pixels_per_um, DEFAULT_SCALE_PIXELS_PER_UM);
        assert_eq!(m.operator_label(), UNKNOWN_OPERATOR);
    }

    #[test]
    fn records_without_required_fields_are_rejected() {
        let no_id = RawMeasurement {
            sample_id: Some("S".into()),
            area_um2: Some(1.0),
            timestamp: Some("2024-01-15".into()),
            ..Default::default()
        };
        assert!(no_id.into_measurement().is_err());

        let negative = RawMeasurement {
            id: Some("M".into()),
            sample_id: Some("S".into()),
            area_um2: Some(-1.0),
            timestamp: Some("2024-01-15".into()),
            ..Default::default()
        };
        assert!(negative.into_measurement().is_err());

        let zero_scale = RawMeasurement {
            id: Some("M".into()),
            sample_id: Some("S".into()),
            area_um2: Some(1.0),
            timestamp: Some("2024-01-15".into()),
            scale_pixels_per_um: Some(0.0),
            ..Default::default()
        };
        assert!(zero_scale.into_measurement().is_err());
    }

    #[test]
    fn measurement_serializes_with_wire_names() {
        let m = RawMeasurement {
            id: Some("MEAS_001".into()),
            sample_id: Some("SAMPLE_001".into()),
            area_um2: Some(12.5),
            timestamp: Some("2024-01-15T10:30:00".into()),
            operator: Some("Maria Santos".into()),
            ..Default::default()
        }
        .into_measurement()
        .unwrap();
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["sampleId"], "SAMPLE_001");
        assert_eq!(json["dataHora"], "2024-01-15 10:30:00");
        assert_eq!(json["area_pixels"], 1250);
        assert_eq!(json["operator"], "Maria Santos");
    }

    #[test]
    fn sample_defaults_fill_missing_display_fields() {
        let s = RawSample {
            id: Some("SAMPLE_009".into()),
            ..Default::default()
        }
        .into_sample()
        .unwrap();
        assert_eq!(s.name, "SAMPLE_009");
        assert_eq!(s.kind, "Unknown");
        assert_eq!(s.collected_at, None);
        assert_eq!(Sample::placeholder("X").responsible_operator, "N/A");
    }
}
