use std::fs::File;
use std::io::BufWriter;

use chrono::{Duration, NaiveDate};
use serde_json::json;

use microscope_dashboard::data::model::{Measurement, Sample, DEFAULT_SCALE_PIXELS_PER_UM};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let operators = ["Dr. João Silva", "Maria Santos", "Carlos Oliveira", "Ana Costa"];
    // (id, name, type, typical area µm², spread)
    let sample_specs = [
        ("SAMPLE_001", "Sangue Paciente A", "Sangue", 12.0, 2.0),
        ("SAMPLE_002", "Tecido Muscular", "Tecido", 9.0, 1.5),
        ("SAMPLE_003", "Célula Neural", "Neurônio", 7.5, 1.0),
        ("SAMPLE_004", "Sangue Paciente B", "Sangue", 13.5, 2.5),
        ("SAMPLE_005", "Tecido Epitelial", "Tecido", 10.0, 3.0),
    ];

    let start = NaiveDate::from_ymd_opt(2024, 1, 15)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .expect("valid start date");

    let samples: Vec<Sample> = sample_specs
        .iter()
        .enumerate()
        .map(|(i, &(id, name, kind, _, _))| Sample {
            id: id.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            collected_at: Some(start + Duration::hours(i as i64)),
            responsible_operator: operators[i % operators.len()].to_string(),
        })
        .collect();

    let mut measurements = Vec::new();
    let mut timestamp = start;
    for n in 1..=300 {
        let (sample_id, _, _, mean, spread) = sample_specs[rng.below(sample_specs.len())];
        let area_um2 = (rng.gauss(mean, spread).max(0.5) * 100.0).round() / 100.0;
        let scale = DEFAULT_SCALE_PIXELS_PER_UM;
        timestamp += Duration::minutes(20 + rng.below(240) as i64);

        measurements.push(Measurement {
            id: format!("MEAS_{n:03}"),
            sample_id: sample_id.to_string(),
            area_pixels: (area_um2 * scale * scale).round() as u64,
            area_um2,
            timestamp,
            image_id: Some(format!("IMG_{n:03}")),
            image_name: Some(format!("amostra_{n:03}.jpg")),
            operator: Some(operators[rng.below(operators.len())].to_string()),
            scale_pixels_per_um: scale,
        });
    }

    let write = |path: &str, value: serde_json::Value| {
        let file = BufWriter::new(File::create(path).expect("Failed to create output file"));
        serde_json::to_writer_pretty(file, &value).expect("Failed to write JSON");
    };
    write("measurements.json", json!({ "measurements": measurements }));
    write("samples.json", json!({ "samples": samples }));

    println!(
        "Wrote {} measurements over {} samples to measurements.json / samples.json",
        measurements.len(),
        samples.len()
    );
}
