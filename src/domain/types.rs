use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use thiserror::Error;

/// Errors raised when building domain values from untrusted input
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("Curve sample count mismatch: {voltage} voltage vs {current} current samples")]
    SampleCountMismatch { voltage: usize, current: usize },
    #[error("Curve has no samples")]
    EmptyCurve,
    #[error("Unknown irradiance level: {0} W/m² (expected 200, 400, 600, 800 or 1000)")]
    UnknownIrradianceLevel(u32),
}

// ============================================================================
// Irradiance Buckets
// ============================================================================

/// Discrete irradiance level (W/m²) used to select a reference curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum IrradianceLevel {
    W200,
    W400,
    W600,
    W800,
    W1000,
}

impl IrradianceLevel {
    /// All levels in scan order
    pub const ALL: [IrradianceLevel; 5] = [
        IrradianceLevel::W200,
        IrradianceLevel::W400,
        IrradianceLevel::W600,
        IrradianceLevel::W800,
        IrradianceLevel::W1000,
    ];

    pub const fn watts(self) -> u32 {
        match self {
            IrradianceLevel::W200 => 200,
            IrradianceLevel::W400 => 400,
            IrradianceLevel::W600 => 600,
            IrradianceLevel::W800 => 800,
            IrradianceLevel::W1000 => 1000,
        }
    }

    pub fn watts_per_m2(self) -> f64 {
        f64::from(self.watts())
    }

    /// Snap a continuous irradiance to the nearest level.
    ///
    /// The scan starts from 1000 W/m² and walks the levels left to right, only
    /// moving on a strictly smaller distance. Exact midpoints therefore resolve
    /// to the lower level (500 -> 400), except 900 which stays at 1000.
    pub fn nearest(irradiance: f64) -> Self {
        Self::ALL.iter().fold(IrradianceLevel::W1000, |best, &level| {
            let candidate = (level.watts_per_m2() - irradiance).abs();
            let current = (best.watts_per_m2() - irradiance).abs();
            if candidate < current {
                level
            } else {
                best
            }
        })
    }
}

impl TryFrom<u32> for IrradianceLevel {
    type Error = DomainError;

    fn try_from(watts: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|level| level.watts() == watts)
            .ok_or(DomainError::UnknownIrradianceLevel(watts))
    }
}

impl From<IrradianceLevel> for u32 {
    fn from(level: IrradianceLevel) -> Self {
        level.watts()
    }
}

impl std::fmt::Display for IrradianceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} W/m²", self.watts())
    }
}

// ============================================================================
// Fault Classification
// ============================================================================

/// Fault category of a panel reading
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FaultType {
    #[default]
    Normal,
    /// Cracked cells reduce the active area, lowering Isc
    CellCrack,
    /// Localized overheating, visible as a Voc shift at high temperature
    HotSpot,
    /// Partial obstruction, visible as a step in the I-V curve
    Shading,
}

impl FaultType {
    /// Faults the simulator can inject, in pick order
    pub const INJECTABLE: [FaultType; 3] =
        [FaultType::CellCrack, FaultType::HotSpot, FaultType::Shading];

    pub fn is_fault(self) -> bool {
        self != FaultType::Normal
    }
}

/// Alert severity, ordered from least to most severe
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl Severity {
    /// Title used for alert notifications, e.g. "Critical Alert"
    pub fn alert_title(self) -> &'static str {
        match self {
            Severity::Normal => "Normal Alert",
            Severity::Warning => "Warning Alert",
            Severity::Critical => "Critical Alert",
        }
    }
}
