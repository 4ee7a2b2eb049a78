//! Built-in demonstration dataset, used when no other source answers.

use super::model::{parse_timestamp, Measurement, Sample, DEFAULT_SCALE_PIXELS_PER_UM};

const MEASUREMENTS: [(&str, &str, u64, f64, &str, &str, &str, &str); 5] = [
    (
        "MEAS_001",
        "SAMPLE_001",
        1250,
        12.50,
        "2024-01-15 10:30:00",
        "IMG_001",
        "amostra_001.jpg",
        "Dr. João Silva",
    ),
    (
        "MEAS_002",
        "SAMPLE_002",
        890,
        8.90,
        "2024-01-15 11:45:00",
        "IMG_002",
        "amostra_002.jpg",
        "Maria Santos",
    ),
    (
        "MEAS_003",
        "SAMPLE_001",
        1520,
        15.20,
        "2024-01-15 14:20:00",
        "IMG_003",
        "amostra_003.jpg",
        "Dr. João Silva",
    ),
    (
        "MEAS_004",
        "SAMPLE_003",
        750,
        7.50,
        "2024-01-15 16:10:00",
        "IMG_004",
        "amostra_004.jpg",
        "Carlos Oliveira",
    ),
    (
        "MEAS_005",
        "SAMPLE_002",
        1100,
        11.00,
        "2024-01-16 09:15:00",
        "IMG_005",
        "amostra_005.jpg",
        "Maria Santos",
    ),
];

const SAMPLES: [(&str, &str, &str, &str, &str); 3] = [
    ("SAMPLE_001", "Sangue Paciente A", "Sangue", "2024-01-15 08:00:00", "Dr. João Silva"),
    ("SAMPLE_002", "Tecido Muscular", "Tecido", "2024-01-15 09:30:00", "Maria Santos"),
    ("SAMPLE_003", "Célula Neural", "Neurônio", "2024-01-15 15:00:00", "Carlos Oliveira"),
];

pub fn measurements() -> Vec<Measurement> {
    MEASUREMENTS
        .iter()
        .filter_map(|&(id, sample, px, um2, ts, img_id, img_name, op)| {
            Some(Measurement {
                id: id.to_string(),
                sample_id: sample.to_string(),
                area_pixels: px,
                area_um2: um2,
                timestamp: parse_timestamp(ts)?,
                image_id: Some(img_id.to_string()),
                image_name: Some(img_name.to_string()),
                operator: Some(op.to_string()),
                scale_pixels_per_um: DEFAULT_SCALE_PIXELS_PER_UM,
            })
        })
        .collect()
}

pub fn samples() -> Vec<Sample> {
    SAMPLES
        .iter()
        .map(|&(id, name, kind, collected, operator)| Sample {
            id: id.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            collected_at: parse_timestamp(collected),
            responsible_operator: operator.to_string(),
        })
        .collect()
}
