use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use eframe::egui;

use microscope_dashboard::config::DashboardConfig;
use microscope_dashboard::data::api::{NewMeasurement, NewSample};
use microscope_dashboard::data::example;
use microscope_dashboard::data::export::{export_file, ExportFormat};
use microscope_dashboard::data::filter::FilterCriteria;
use microscope_dashboard::data::loader::{self, Snapshot};
use microscope_dashboard::data::service::DatasetService;

use crate::color::ColorMap;
use crate::tasks::{TaskResult, Worker};

// ---------------------------------------------------------------------------
// Reload serialization
// ---------------------------------------------------------------------------

/// Allows one reload at a time and tags each with a generation so a
/// response made stale by [`ReloadGate::invalidate`] can be recognised.
#[derive(Debug, Default)]
pub struct ReloadGate {
    generation: u64,
    in_flight: bool,
}

impl ReloadGate {
    /// Start a reload, or `None` if one is already running.
    pub fn begin(&mut self) -> Option<u64> {
        if self.in_flight {
            return None;
        }
        self.generation += 1;
        self.in_flight = true;
        Some(self.generation)
    }

    /// Finish the reload tagged `generation`; false means it is stale.
    pub fn finish(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.in_flight = false;
        true
    }

    /// Forget any running reload; its result will be discarded.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.in_flight = false;
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }
}

// ---------------------------------------------------------------------------
// Auto-refresh timer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AutoRefresh {
    pub interval: Duration,
    next_due: Option<Instant>,
}

impl AutoRefresh {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.next_due.is_some()
    }

    /// Start or cancel the timer. Cancelling is the only way to stop it.
    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        self.next_due = enabled.then(|| now + self.interval);
    }

    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval.max(Duration::from_secs(1));
        if self.enabled() {
            self.next_due = Some(now + self.interval);
        }
    }

    /// True once per elapsed interval; re-arms itself.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// Time until the next tick, for scheduling a repaint.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

// ---------------------------------------------------------------------------
// Form buffers
// ---------------------------------------------------------------------------

/// Editable filter controls; turned into [`FilterCriteria`] on Apply.
#[derive(Debug, Clone)]
pub struct FilterForm {
    pub use_start: bool,
    pub start: NaiveDate,
    pub use_end: bool,
    pub end: NaiveDate,
    pub sample: Option<String>,
    pub operator: Option<String>,
    pub search: String,
}

impl Default for FilterForm {
    fn default() -> Self {
        let today = Utc::now().date_naive();
        Self {
            use_start: false,
            start: today,
            use_end: false,
            end: today,
            sample: None,
            operator: None,
            search: String::new(),
        }
    }
}

impl FilterForm {
    pub fn to_criteria(&self) -> FilterCriteria {
        let mut criteria = FilterCriteria::default().with_search(self.search.trim());
        if self.use_start {
            criteria = criteria.with_start_date(self.start);
        }
        if self.use_end {
            criteria = criteria.with_end_date(self.end);
        }
        if let Some(sample) = &self.sample {
            criteria = criteria.with_sample(sample.clone());
        }
        if let Some(op) = &self.operator {
            criteria = criteria.with_operator(op.clone());
        }
        criteria
    }
}

/// Text buffers for the measurement registration form.
#[derive(Debug, Clone, Default)]
pub struct MeasurementForm {
    pub id: String,
    pub sample_id: String,
    pub area: f64,
    pub image_id: String,
    pub image_name: String,
    pub operator: String,
}

impl MeasurementForm {
    pub fn to_request(&self) -> Option<NewMeasurement> {
        let opt = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        if self.id.trim().is_empty() || self.sample_id.trim().is_empty() || self.area < 0.0 {
            return None;
        }
        Some(NewMeasurement {
            id: self.id.trim().to_string(),
            sample_id: self.sample_id.trim().to_string(),
            area: self.area,
            image_id: opt(&self.image_id),
            image_name: opt(&self.image_name),
            operator: opt(&self.operator),
        })
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Measurements,
    Samples,
    Charts,
    Register,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::Measurements,
        Tab::Samples,
        Tab::Charts,
        Tab::Register,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Measurements => "Measurements",
            Tab::Samples => "Samples",
            Tab::Charts => "Charts",
            Tab::Register => "Register",
        }
    }
}

/// Which rows an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    Filtered,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,
    pub service: DatasetService,
    pub tab: Tab,
    pub filter_form: FilterForm,
    pub sample_form: NewSample,
    pub measurement_form: MeasurementForm,

    /// Operator colours for charts.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,

    /// Where the active measurements came from.
    pub origin: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
    pub api_online: Option<bool>,
    pub auto_refresh: AutoRefresh,

    reload: ReloadGate,
    worker: Worker,
}

impl AppState {
    pub fn new(config: DashboardConfig, ctx: Option<egui::Context>) -> Self {
        Self {
            service: DatasetService::new(config.page_size),
            auto_refresh: AutoRefresh::new(config.refresh_interval()),
            config,
            tab: Tab::default(),
            filter_form: FilterForm::default(),
            sample_form: NewSample::default(),
            measurement_form: MeasurementForm::default(),
            color_map: None,
            status: None,
            origin: None,
            last_update: None,
            api_online: None,
            reload: ReloadGate::default(),
            worker: Worker::new(ctx),
        }
    }

    pub fn loading(&self) -> bool {
        self.reload.in_flight()
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::error!("{text}");
        self.status = Some(Status {
            text,
            is_error: true,
        });
    }

    // -- loading ------------------------------------------------------------

    /// Start the source chain unless a reload is already running.
    pub fn request_reload(&mut self) {
        match self.reload.begin() {
            Some(generation) => {
                log::debug!("Starting reload #{generation}");
                self.worker.reload(generation, self.config.clone());
            }
            None => log::debug!("Reload already in flight, dropping request"),
        }
    }

    /// Apply finished background jobs. Called once per frame.
    pub fn poll_tasks(&mut self) {
        for result in self.worker.drain() {
            match result {
                TaskResult::Reload { generation, result } => {
                    if !self.reload.finish(generation) {
                        log::debug!("Discarding stale reload #{generation}");
                        continue;
                    }
                    match result {
                        Ok(snapshot) => self.apply_snapshot(snapshot),
                        Err(e) => self.error(format!("Reload failed: {e}")),
                    }
                }
                TaskResult::Health(result) => {
                    self.api_online = Some(result.is_ok());
                    if let Err(e) = result {
                        log::warn!("API health check failed: {e}");
                    }
                }
                TaskResult::Submitted { what, result } => match result {
                    Ok(reply) => {
                        let msg = reply.message.unwrap_or_else(|| "saved".to_string());
                        self.info(format!("Registered {what}: {msg}"));
                        self.request_reload();
                    }
                    Err(e) => self.error(format!("Could not register {what}: {e}")),
                },
            }
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        let count = self.service.load(snapshot.measurements);
        match snapshot.samples {
            Some(samples) => self.service.load_samples(samples),
            None if self.service.samples().next().is_none() => {
                self.service.load_samples(example::samples())
            }
            None => {}
        }
        self.rebuild_color_map();
        self.last_update = Some(Utc::now());
        self.info(format!(
            "{} measurements from {} ({count} shown)",
            self.service.len(),
            snapshot.origin
        ));
        self.origin = Some(snapshot.origin);
    }

    fn rebuild_color_map(&mut self) {
        let operators = self.service.distinct_operators();
        self.color_map = (!operators.is_empty()).then(|| ColorMap::new(&operators));
    }

    /// Load a user-picked measurements file. On failure the current
    /// dataset stays active.
    pub fn open_measurements(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(measurements) => {
                // A manual load supersedes whatever reload is running.
                self.reload.invalidate();
                self.apply_snapshot(Snapshot {
                    origin: path.display().to_string(),
                    measurements,
                    samples: None,
                });
            }
            Err(e) => self.error(format!("Could not load {}: {e}", path.display())),
        }
    }

    pub fn open_samples(&mut self, path: &Path) {
        match loader::load_samples_file(path) {
            Ok(samples) => {
                let n = samples.len();
                self.service.load_samples(samples);
                self.info(format!("{n} samples loaded from {}", path.display()));
            }
            Err(e) => self.error(format!("Could not load {}: {e}", path.display())),
        }
    }

    // -- filter -------------------------------------------------------------

    pub fn apply_filters(&mut self) {
        let n = self.service.apply_filter(self.filter_form.to_criteria());
        log::debug!("Filter applied, {n} rows");
    }

    pub fn clear_filters(&mut self) {
        self.filter_form = FilterForm::default();
        self.apply_filters();
    }

    // -- export / clear -----------------------------------------------------

    pub fn export(&mut self, path: &Path, format: ExportFormat, scope: ExportScope) {
        let result = match scope {
            ExportScope::Filtered => export_file(path, format, self.service.filtered()),
            ExportScope::All => export_file(path, format, self.service.all()),
        };
        match result {
            Ok(n) => self.info(format!("Exported {n} measurements to {}", path.display())),
            Err(e) => self.error(format!("Export failed: {e}")),
        }
    }

    /// Empty the dataset and reset every view; any running reload is
    /// discarded when it lands.
    pub fn clear(&mut self) {
        self.reload.invalidate();
        self.service.clear();
        self.filter_form = FilterForm::default();
        self.color_map = None;
        self.origin = None;
        self.last_update = None;
        self.info("Data cleared");
    }

    // -- API ----------------------------------------------------------------

    pub fn check_health(&mut self) {
        self.worker.check_health(&self.config);
    }

    pub fn submit_sample(&mut self) -> Result<()> {
        let form = &self.sample_form;
        if form.id.trim().is_empty() || form.nome.trim().is_empty() {
            anyhow::bail!("sample id and name are required");
        }
        self.worker.submit_sample(&self.config, form.clone());
        Ok(())
    }

    pub fn submit_measurement(&mut self) -> Result<()> {
        let request = self
            .measurement_form
            .to_request()
            .context("measurement id, sample id and a non-negative area are required")?;
        self.worker.submit_measurement(&self.config, request);
        Ok(())
    }

    /// Fire the auto-refresh timer if due and return how long until the
    /// next tick.
    pub fn tick(&mut self, now: Instant) -> Option<Duration> {
        if self.auto_refresh.poll(now) {
            self.request_reload();
        }
        self.auto_refresh.remaining(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_gate_drops_overlapping_requests() {
        let mut gate = ReloadGate::default();
        let first = gate.begin().unwrap();
        assert!(gate.begin().is_none());
        assert!(gate.finish(first));
        assert!(gate.begin().is_some());
    }

    #[test]
    fn reload_gate_discards_results_after_invalidate() {
        let mut gate = ReloadGate::default();
        let stale = gate.begin().unwrap();
        gate.invalidate();
        let fresh = gate.begin().unwrap();
        assert!(!gate.finish(stale));
        assert!(gate.in_flight());
        assert!(gate.finish(fresh));
        assert!(!gate.in_flight());
    }

    #[test]
    fn auto_refresh_fires_once_per_interval_and_cancels() {
        let start = Instant::now();
        let mut timer = AutoRefresh::new(Duration::from_secs(30));
        assert!(!timer.poll(start + Duration::from_secs(60)));

        timer.set_enabled(true, start);
        assert!(!timer.poll(start + Duration::from_secs(29)));
        assert!(timer.poll(start + Duration::from_secs(30)));
        assert!(!timer.poll(start + Duration::from_secs(31)));
        assert_eq!(
            timer.remaining(start + Duration::from_secs(31)),
            Some(Duration::from_secs(29))
        );

        timer.set_enabled(false, start);
        assert!(!timer.poll(start + Duration::from_secs(600)));
        assert_eq!(timer.remaining(start), None);
    }

    #[test]
    fn filter_form_builds_inclusive_day_bounds() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let form = FilterForm {
            use_start: true,
            start: day,
            use_end: true,
            end: day,
            sample: Some("SAMPLE_001".into()),
            operator: None,
            search: "  ".into(),
        };
        let criteria = form.to_criteria();
        assert_eq!(criteria.end, day.and_hms_opt(23, 59, 59));
        assert_eq!(criteria.sample_id.as_deref(), Some("SAMPLE_001"));
        assert!(criteria.search.is_empty());
    }

    #[test]
    fn snapshot_without_samples_falls_back_to_example_samples() {
        let mut state = AppState::new(DashboardConfig::default(), None);
        state.apply_snapshot(Snapshot {
            origin: "test".into(),
            measurements: example::measurements(),
            samples: None,
        });
        assert_eq!(state.service.samples().count(), example::samples().len());
        assert_eq!(state.origin.as_deref(), Some("test"));
        assert!(state.color_map.is_some());

        state.clear();
        assert!(state.service.is_empty());
        assert!(state.color_map.is_none());
    }

    #[test]
    fn broken_file_keeps_last_good_dataset() {
        let mut state = AppState::new(DashboardConfig::default(), None);
        state.apply_snapshot(Snapshot {
            origin: "test".into(),
            measurements: example::measurements(),
            samples: None,
        });
        state.open_measurements(Path::new("/nonexistent/measurements.json"));
        assert_eq!(state.service.len(), 5);
        assert!(state.status.as_ref().is_some_and(|s| s.is_error));
    }

    #[test]
    fn measurement_form_requires_ids() {
        let mut form = MeasurementForm {
            id: "M1".into(),
            area: 3.0,
            ..Default::default()
        };
        assert!(form.to_request().is_none());
        form.sample_id = "S1".into();
        let req = form.to_request().unwrap();
        assert_eq!(req.image_id, None);
    }
}
