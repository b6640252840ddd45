use anyhow::Result;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::controller::classifier::ClassifierThresholds;
use crate::domain::{PanelInfo, Severity};
use crate::simulation::simulator::{
    DEFAULT_FAULT_PROBABILITY, INITIAL_IRRADIANCE, INITIAL_TEMPERATURE_C,
};
use crate::domain::power::PANEL_AREA_M2;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    pub panel: PanelInfo,
    #[validate(nested)]
    pub simulation: SimulationConfig,
    #[validate(nested)]
    pub classifier: ClassifierThresholds,
    pub alerts: AlertsConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SimulationConfig {
    #[validate(range(min = 1))]
    pub tick_seconds: u64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub fault_probability: f64,
    /// Random seed for reproducibility (None = random)
    pub random_seed: Option<u64>,
    #[validate(range(min = 100.0, max = 1000.0))]
    pub initial_irradiance: f64,
    #[validate(range(min = 10.0, max = 70.0))]
    pub initial_temperature_c: f64,
    #[validate(range(min = 0.01))]
    pub panel_area_m2: f64,
    /// Size of the fabricated alert backlog at startup
    pub history_alerts: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 5,
            fault_probability: DEFAULT_FAULT_PROBABILITY,
            random_seed: None,
            initial_irradiance: INITIAL_IRRADIANCE,
            initial_temperature_c: INITIAL_TEMPERATURE_C,
            panel_area_m2: PANEL_AREA_M2,
            history_alerts: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Lowest severity that raises an alert on a live tick
    pub threshold: Severity,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            threshold: Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("exports"),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("PVMON__").split("__"));
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }
}
