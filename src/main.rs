use anyhow::Result;
use pv_fault_monitor::{config, controller, simulation, telemetry};
use config::Config;
use controller::{run_live, PanelMonitor};
use simulation::{SeededRandom, SystemClock};
use std::sync::Arc;
use telemetry::init_tracing;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;

    let monitor = PanelMonitor::from_config(
        &cfg,
        SeededRandom::new(cfg.simulation.random_seed),
        SystemClock,
    );
    info!(
        panel_id = %monitor.state().info.id,
        panel_name = %monitor.state().info.name,
        backlog = monitor.alerts().len(),
        unacknowledged = monitor.alerts().unacknowledged_count(),
        tick_seconds = cfg.simulation.tick_seconds,
        "starting PV fault monitor"
    );

    let monitor = Arc::new(RwLock::new(monitor));
    let live = tokio::spawn(run_live(monitor.clone(), cfg.simulation.tick_seconds));

    telemetry::shutdown_signal().await;
    live.abort();

    let monitor = monitor.read().await;
    match monitor.export_iv_csv(&cfg.export.directory) {
        Ok(path) => info!(path = %path.display(), "final I-V curve written"),
        Err(e) => warn!(error = %e, "failed to export I-V curve"),
    }
    info!(
        state = %serde_json::to_string(monitor.state())?,
        alerts = monitor.alerts().len(),
        "final panel state"
    );

    warn!("shutdown complete");
    Ok(())
}
