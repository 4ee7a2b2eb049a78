use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use eframe::egui;

use microscope_dashboard::config::DashboardConfig;
use microscope_dashboard::data::api::{ApiClient, ApiResponse, NewMeasurement, NewSample};
use microscope_dashboard::data::loader::{default_chain, load_first_success, Snapshot};
use microscope_dashboard::DataError;

// ---------------------------------------------------------------------------
// Background work
// ---------------------------------------------------------------------------

/// Outcome of a job run off the UI thread.
#[derive(Debug)]
pub enum TaskResult {
    Reload {
        generation: u64,
        result: Result<Snapshot, DataError>,
    },
    Health(Result<(), DataError>),
    Submitted {
        what: String,
        result: Result<ApiResponse, DataError>,
    },
}

/// Runs blocking network/file jobs on short-lived threads and hands the
/// results back through a channel the UI drains every frame.
pub struct Worker {
    tx: Sender<TaskResult>,
    rx: Receiver<TaskResult>,
    ctx: Option<egui::Context>,
}

impl Worker {
    pub fn new(ctx: Option<egui::Context>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, ctx }
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() -> TaskResult + Send + 'static,
    {
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        thread::spawn(move || {
            // The receiver only disappears on shutdown.
            let _ = tx.send(job());
            if let Some(ctx) = ctx {
                ctx.request_repaint();
            }
        });
    }

    /// Run the source chain for `config`.
    pub fn reload(&self, generation: u64, config: DashboardConfig) {
        self.spawn(move || TaskResult::Reload {
            generation,
            result: load_first_success(&default_chain(&config)),
        });
    }

    pub fn check_health(&self, config: &DashboardConfig) {
        let base = config.api_base_url.clone();
        let timeout = config.request_timeout();
        self.spawn(move || {
            TaskResult::Health(ApiClient::new(&base, timeout).and_then(|c| c.health()))
        });
    }

    pub fn submit_sample(&self, config: &DashboardConfig, sample: NewSample) {
        let base = config.api_base_url.clone();
        let timeout = config.request_timeout();
        self.spawn(move || TaskResult::Submitted {
            what: format!("sample {}", sample.id),
            result: ApiClient::new(&base, timeout).and_then(|c| c.create_sample(&sample)),
        });
    }

    pub fn submit_measurement(&self, config: &DashboardConfig, measurement: NewMeasurement) {
        let base = config.api_base_url.clone();
        let timeout = config.request_timeout();
        self.spawn(move || TaskResult::Submitted {
            what: format!("measurement {}", measurement.id),
            result: ApiClient::new(&base, timeout).and_then(|c| c.create_measurement(&measurement)),
        });
    }

    /// Results that arrived since the last call.
    pub fn drain(&self) -> Vec<TaskResult> {
        self.rx.try_iter().collect()
    }
}
