pub mod alerts;
pub mod classifier;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::{
    FaultAlert, FaultVerdict, IrradianceLevel, PanelInfo, PanelState, Severity, TheoreticalCurve,
};
use crate::export::{self, ComparisonRow, ExportError};
use crate::simulation::simulator::DEFAULT_FAULT_PROBABILITY;
use crate::simulation::{
    generate_historical_alerts, Clock, FixedClock, MeasurementSimulator, RandomSource,
};

pub use alerts::AlertLog;
pub use classifier::{ClassifierThresholds, CurveDiagnostics, FaultClassifier};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("alert not found: {0}")]
    AlertNotFound(String),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Monitor shared between the live loop and its readers
pub type SharedMonitor<R, C> = Arc<RwLock<PanelMonitor<R, C>>>;

/// Owns one panel's state, its alert log and the simulator feeding it
pub struct PanelMonitor<R, C> {
    state: PanelState,
    alerts: AlertLog,
    simulator: MeasurementSimulator<R, C>,
    fault_probability: f64,
    alert_threshold: Severity,
    selected_irradiance: IrradianceLevel,
    live: bool,
    alert_seq: u64,
}

impl<R: RandomSource, C: Clock> PanelMonitor<R, C> {
    pub fn new(
        info: PanelInfo,
        simulator: MeasurementSimulator<R, C>,
        initial_irradiance: f64,
        initial_temperature_c: f64,
    ) -> Self {
        let current = simulator.initial_measurement(initial_irradiance, initial_temperature_c);
        Self {
            state: PanelState::new(info, current),
            alerts: AlertLog::new(),
            simulator,
            fault_probability: DEFAULT_FAULT_PROBABILITY,
            alert_threshold: Severity::Warning,
            selected_irradiance: IrradianceLevel::W800,
            live: true,
            alert_seq: 0,
        }
    }

    /// Build a monitor from config, including the fabricated alert backlog
    pub fn from_config(cfg: &Config, random: R, clock: C) -> Self {
        let sim_cfg = &cfg.simulation;
        let simulator =
            MeasurementSimulator::new(random, clock, FaultClassifier::new(cfg.classifier.clone()))
                .with_panel_area(sim_cfg.panel_area_m2);

        let mut monitor = Self::new(
            cfg.panel.clone(),
            simulator,
            sim_cfg.initial_irradiance,
            sim_cfg.initial_temperature_c,
        )
        .with_fault_probability(sim_cfg.fault_probability)
        .with_alert_threshold(cfg.alerts.threshold);

        let panel_id = monitor.state.info.id.clone();
        // pin the backlog to the same instant the initial reading was taken
        let now = FixedClock(monitor.state.current.timestamp());
        let backlog = generate_historical_alerts(
            &panel_id,
            sim_cfg.history_alerts,
            monitor.simulator.random_mut(),
            &now,
        );
        monitor.alerts = AlertLog::with_backlog(backlog);
        monitor
    }

    pub fn with_fault_probability(mut self, fault_probability: f64) -> Self {
        self.fault_probability = fault_probability;
        self
    }

    pub fn with_alert_threshold(mut self, threshold: Severity) -> Self {
        self.alert_threshold = threshold;
        self
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    pub fn fault_probability(&self) -> f64 {
        self.fault_probability
    }

    pub fn alert_threshold(&self) -> Severity {
        self.alert_threshold
    }

    /// Take one live reading. Returns the alert it raised, if any.
    pub fn tick(&mut self) -> Option<FaultAlert> {
        let verdict = self.advance(self.fault_probability);
        if verdict.is_fault() && verdict.severity >= self.alert_threshold {
            Some(self.raise(&verdict))
        } else {
            None
        }
    }

    /// Force a faulted reading and record its alert unconditionally
    pub fn simulate_random_fault(&mut self) -> FaultAlert {
        let verdict = self.advance(1.0);
        self.raise(&verdict)
    }

    pub fn acknowledge_alert(&mut self, id: &str) -> Result<(), MonitorError> {
        self.alerts.acknowledge(id)?;
        info!(alert_id = id, "alert acknowledged");
        Ok(())
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn set_live(&mut self, live: bool) {
        if self.live != live {
            info!(live, "live monitoring toggled");
        }
        self.live = live;
    }

    pub fn selected_irradiance(&self) -> IrradianceLevel {
        self.selected_irradiance
    }

    pub fn set_selected_irradiance(&mut self, level: IrradianceLevel) {
        self.selected_irradiance = level;
    }

    /// Reference curve for the selected irradiance level
    pub fn theoretical_curve(&self) -> &TheoreticalCurve {
        self.simulator.references().get(self.selected_irradiance)
    }

    pub fn iv_comparison(&self) -> Vec<ComparisonRow> {
        export::iv_comparison(self.state.current.curve(), self.theoretical_curve())
    }

    pub fn pv_comparison(&self) -> Vec<ComparisonRow> {
        export::pv_comparison(self.state.current.curve(), self.theoretical_curve())
    }

    /// Write the current I-V comparison as a dated CSV file under `directory`
    pub fn export_iv_csv(&self, directory: &Path) -> Result<PathBuf, MonitorError> {
        let date = self.simulator.clock().now().date_naive();
        let path = export::write_iv_csv_file(directory, date, &self.iv_comparison())?;
        info!(path = %path.display(), "exported I-V curve");
        Ok(path)
    }

    fn advance(&mut self, fault_probability: f64) -> FaultVerdict {
        let (measurement, verdict) = self.simulator.tick(&self.state.current, fault_probability);
        self.state = self.state.with_reading(measurement, &verdict);
        verdict
    }

    fn raise(&mut self, verdict: &FaultVerdict) -> FaultAlert {
        let timestamp = self.state.current.timestamp();
        let id = format!(
            "alert-{}-{}-{}",
            self.state.info.id,
            timestamp.timestamp_millis(),
            self.alert_seq
        );
        self.alert_seq += 1;

        let alert = FaultAlert::from_verdict(id, self.state.info.id.clone(), timestamp, verdict);
        warn!(
            alert_id = %alert.id,
            fault = %alert.fault_type,
            severity = %alert.severity,
            message = %alert.message,
            "{}",
            alert.severity.alert_title()
        );
        self.alerts.record(alert.clone());
        alert
    }
}

/// Tick the monitor every `tick_seconds` while live monitoring is on
pub async fn run_live<R, C>(monitor: SharedMonitor<R, C>, tick_seconds: u64)
where
    R: RandomSource + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut interval = tokio::time::interval(Duration::from_secs(tick_seconds.max(1)));
    loop {
        interval.tick().await;
        let mut monitor = monitor.write().await;
        if !monitor.is_live() {
            continue;
        }
        monitor.tick();
        let current = &monitor.state().current;
        info!(
            irradiance = current.irradiance(),
            temperature_c = current.temperature(),
            power_w = current.power(),
            efficiency_percent = current.efficiency(),
            status = %monitor.state().status,
            "measurement tick"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FaultType;
    use crate::simulation::ScriptedRandom;
    use chrono::{TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap())
    }

    fn monitor(
        fractions: &[f64],
        irradiance: f64,
        temperature_c: f64,
    ) -> PanelMonitor<ScriptedRandom, FixedClock> {
        let simulator = MeasurementSimulator::new(
            ScriptedRandom::new(fractions.to_vec()),
            clock(),
            FaultClassifier::default(),
        );
        PanelMonitor::new(PanelInfo::default(), simulator, irradiance, temperature_c)
    }

    #[test]
    fn test_normal_tick_raises_nothing() {
        let mut m = monitor(&[0.5, 0.5, 0.99], 800.0, 30.0);
        assert!(m.tick().is_none());
        assert_eq!(m.state().status, Severity::Normal);
        assert_eq!(m.state().status_message, "Panel operating normally.");
        assert!(m.alerts().is_empty());
    }

    #[test]
    fn test_fault_tick_raises_alert() {
        // no drift, fault roll hits, pick cell crack
        let mut m = monitor(&[0.5, 0.5, 0.0, 0.0], 800.0, 30.0);
        let alert = m.tick().unwrap();

        assert_eq!(alert.fault_type, FaultType::CellCrack);
        assert_eq!(alert.severity, Severity::Warning);
        assert_eq!(alert.panel_id, "panel-001");
        assert!(!alert.is_acknowledged());
        assert_eq!(
            alert.id,
            format!("alert-panel-001-{}-0", clock().0.timestamp_millis())
        );
        assert_eq!(m.state().status, Severity::Warning);
        assert_eq!(m.alerts().iter().next(), Some(&alert));
    }

    #[test]
    fn test_threshold_filters_live_alerts() {
        let mut m = monitor(&[0.5, 0.5, 0.0, 0.0], 800.0, 30.0)
            .with_alert_threshold(Severity::Critical);
        assert!(m.tick().is_none());
        // state still reflects the warning
        assert_eq!(m.state().status, Severity::Warning);
        assert!(m.alerts().is_empty());
    }

    #[test]
    fn test_manual_fault_always_alerts() {
        let mut m = monitor(&[0.5, 0.5, 0.0, 0.9], 600.0, 25.0)
            .with_alert_threshold(Severity::Critical);
        let alert = m.simulate_random_fault();
        assert_eq!(alert.fault_type, FaultType::Shading);
        assert_eq!(m.alerts().len(), 1);

        let second = m.simulate_random_fault();
        assert_ne!(alert.id, second.id);
        assert_eq!(m.alerts().len(), 2);
    }

    #[test]
    fn test_acknowledge_alert() {
        let mut m = monitor(&[0.5, 0.5, 0.0, 0.0], 800.0, 30.0);
        let alert = m.simulate_random_fault();
        m.acknowledge_alert(&alert.id).unwrap();
        assert_eq!(m.alerts().unacknowledged_count(), 0);
        assert!(matches!(
            m.acknowledge_alert("nope"),
            Err(MonitorError::AlertNotFound(_))
        ));
    }

    #[test]
    fn test_selected_irradiance_drives_comparison() {
        let mut m = monitor(&[0.5], 800.0, 30.0);
        assert_eq!(m.selected_irradiance(), IrradianceLevel::W800);
        m.set_selected_irradiance(IrradianceLevel::W400);
        assert_eq!(m.theoretical_curve().irradiance, IrradianceLevel::W400);

        let rows = m.iv_comparison();
        assert_eq!(rows.len(), m.state().current.curve().len());
        assert_eq!(rows[0].measured, m.state().current.curve().current()[0]);
    }

    #[test]
    fn test_from_config_builds_backlog() {
        let mut cfg = Config::default();
        cfg.simulation.history_alerts = 4;
        cfg.simulation.fault_probability = 0.25;
        // every backlog entry: 1h ago, cell crack, warning, acknowledged
        let random = ScriptedRandom::new(vec![0.0, 0.1, 0.9, 0.9]);
        let m = PanelMonitor::from_config(&cfg, random, clock());

        assert_eq!(m.alerts().len(), 4);
        assert_eq!(m.fault_probability(), 0.25);
        assert_eq!(m.alert_threshold(), Severity::Warning);
        assert!(m.alerts().iter().all(|a| a.panel_id == "panel-001"));
        assert_eq!(m.state().current.irradiance(), 800.0);
    }

    #[test]
    fn test_export_writes_dated_file() {
        let m = monitor(&[0.5], 800.0, 30.0);
        let dir = std::env::temp_dir().join(format!("pv-export-{}", std::process::id()));
        let path = m.export_iv_csv(&dir).unwrap();
        assert!(path.ends_with("iv-curve-data-2024-06-21.csv"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Voltage,Measured Current,Theoretical Current"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_run_live_ticks_immediately() {
        let shared = Arc::new(RwLock::new(monitor(&[0.5, 0.5, 0.99], 800.0, 30.0)));
        let handle = tokio::spawn(run_live(shared.clone(), 60));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        let mut m = shared.write().await;
        assert_eq!(m.simulator.random_mut().draws(), 3);
    }

    #[tokio::test]
    async fn test_run_live_skips_when_paused() {
        let mut paused = monitor(&[0.5, 0.5, 0.99], 800.0, 30.0);
        paused.set_live(false);
        let shared = Arc::new(RwLock::new(paused));
        let handle = tokio::spawn(run_live(shared.clone(), 60));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        let mut m = shared.write().await;
        assert_eq!(m.simulator.random_mut().draws(), 0);
    }
}
