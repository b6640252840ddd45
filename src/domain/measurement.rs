use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::power::{efficiency, peak_power, PANEL_AREA_M2};
use super::{Curve, FaultType, Severity};

/// One synthetic sensor reading.
///
/// Power and efficiency are derived from the curve when the snapshot is built,
/// including on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MeasurementSnapshot")]
pub struct MeasurementData {
    timestamp: DateTime<Utc>,
    /// W/m², not necessarily on an [`IrradianceLevel`](super::IrradianceLevel)
    irradiance: f64,
    /// Panel temperature in °C
    temperature: f64,
    /// Peak power of the curve in W
    power: f64,
    /// Conversion efficiency in %
    efficiency: f64,
    panel_area_m2: f64,
    curve: Curve,
}

/// Inputs of a reading; incoming power and efficiency are ignored
#[derive(Deserialize)]
struct MeasurementSnapshot {
    timestamp: DateTime<Utc>,
    irradiance: f64,
    temperature: f64,
    #[serde(default = "default_panel_area")]
    panel_area_m2: f64,
    curve: Curve,
}

fn default_panel_area() -> f64 {
    PANEL_AREA_M2
}

impl From<MeasurementSnapshot> for MeasurementData {
    fn from(s: MeasurementSnapshot) -> Self {
        Self::with_panel_area(
            s.timestamp,
            s.irradiance,
            s.temperature,
            s.curve,
            s.panel_area_m2,
        )
    }
}

impl MeasurementData {
    /// Build a snapshot for the standard 1.7 m² panel
    pub fn new(timestamp: DateTime<Utc>, irradiance: f64, temperature: f64, curve: Curve) -> Self {
        Self::with_panel_area(timestamp, irradiance, temperature, curve, PANEL_AREA_M2)
    }

    pub fn with_panel_area(
        timestamp: DateTime<Utc>,
        irradiance: f64,
        temperature: f64,
        curve: Curve,
        panel_area_m2: f64,
    ) -> Self {
        let power = peak_power(&curve);
        Self {
            timestamp,
            irradiance,
            temperature,
            power,
            efficiency: efficiency(power, irradiance, panel_area_m2),
            panel_area_m2,
            curve,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn irradiance(&self) -> f64 {
        self.irradiance
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn power(&self) -> f64 {
        self.power
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    pub fn panel_area_m2(&self) -> f64 {
        self.panel_area_m2
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }
}

/// Result of classifying a measured curve against its reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultVerdict {
    #[serde(rename = "type")]
    pub fault_type: FaultType,
    pub severity: Severity,
    pub message: String,
}

impl FaultVerdict {
    pub fn new(fault_type: FaultType, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            fault_type,
            severity,
            message: message.into(),
        }
    }

    pub fn normal() -> Self {
        Self::new(
            FaultType::Normal,
            Severity::Normal,
            "Panel operating normally.",
        )
    }

    pub fn is_fault(&self) -> bool {
        self.fault_type.is_fault()
    }
}
