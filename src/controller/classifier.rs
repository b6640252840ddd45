//! # Fault Classifier
//!
//! Compares a measured I-V curve with the fault-free reference for the same
//! irradiance bucket and grades the deviation. Rules are evaluated in a fixed
//! priority order and only the first match is reported:
//!
//! 1. Isc drop -> cell crack (warning / critical)
//! 2. Voc deviation at high temperature -> hot spot (warning / critical)
//! 3. Step in the curve steeper than the reference -> shading (warning)
//! 4. Otherwise normal

use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::{Validate, ValidationError};

use crate::domain::{Curve, FaultType, FaultVerdict, MeasurementData, Severity};

/// Classification thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_severity_bands"))]
pub struct ClassifierThresholds {
    /// Isc drop (%) above which a cell crack warning is raised
    #[validate(range(min = 0.0, max = 100.0))]
    pub isc_warning_drop_percent: f64,
    /// Isc drop (%) above which the cell crack is critical
    #[validate(range(min = 0.0, max = 100.0))]
    pub isc_critical_drop_percent: f64,
    /// Voc deviation (%) above which a hot spot is suspected
    #[validate(range(min = 0.0, max = 100.0))]
    pub voc_warning_deviation_percent: f64,
    /// Voc deviation (%) above which the hot spot is critical
    #[validate(range(min = 0.0, max = 100.0))]
    pub voc_critical_deviation_percent: f64,
    /// Panel temperature (°C) a hot spot requires
    pub hot_spot_temperature_c: f64,
    /// Excess slope (A/V) over the reference that counts as a step
    #[validate(range(min = 0.0))]
    pub step_threshold_a_per_v: f64,
    /// Current (A) at or below which a sample counts as open circuit
    #[validate(range(min = 0.0))]
    pub open_circuit_current_a: f64,
}

/// Each critical threshold must sit at or above its warning threshold
fn validate_severity_bands(t: &ClassifierThresholds) -> Result<(), ValidationError> {
    if t.isc_critical_drop_percent < t.isc_warning_drop_percent {
        return Err(ValidationError::new("isc_critical_below_warning"));
    }
    if t.voc_critical_deviation_percent < t.voc_warning_deviation_percent {
        return Err(ValidationError::new("voc_critical_below_warning"));
    }
    Ok(())
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            isc_warning_drop_percent: 10.0,
            isc_critical_drop_percent: 20.0,
            voc_warning_deviation_percent: 5.0,
            voc_critical_deviation_percent: 10.0,
            hot_spot_temperature_c: 40.0,
            step_threshold_a_per_v: 0.5,
            open_circuit_current_a: 0.05,
        }
    }
}

/// Intermediate figures of a curve comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveDiagnostics {
    pub measured_isc: f64,
    pub theoretical_isc: f64,
    /// Positive when the measured Isc is below the reference
    pub isc_drop_percent: f64,
    pub measured_voc: f64,
    pub theoretical_voc: f64,
    pub voc_deviation_percent: f64,
    /// Largest amount by which a measured segment slope, rescaled to the
    /// reference Isc, exceeds the reference slope
    pub max_step: f64,
}

impl CurveDiagnostics {
    pub fn compute(measured: &Curve, reference: &Curve, open_circuit_current: f64) -> Self {
        let measured_isc = measured.max_current();
        let theoretical_isc = reference.max_current();
        let isc_drop_percent = relative_percent(theoretical_isc - measured_isc, theoretical_isc);

        let measured_voc = measured.voltage()[open_circuit_index(measured, open_circuit_current)];
        let theoretical_voc =
            reference.voltage()[open_circuit_index(reference, open_circuit_current)];
        let voc_deviation_percent =
            relative_percent(theoretical_voc - measured_voc, theoretical_voc).abs();
        let scale = isc_scale(measured_isc, theoretical_isc);

        Self {
            measured_isc,
            theoretical_isc,
            isc_drop_percent,
            measured_voc,
            theoretical_voc,
            voc_deviation_percent,
            max_step: max_step_excess(measured, reference, scale),
        }
    }
}

/// `delta / base * 100`, or 0 for a zero base
fn relative_percent(delta: f64, base: f64) -> f64 {
    if base == 0.0 {
        return 0.0;
    }
    delta / base * 100.0
}

/// First sample at or below the open-circuit current, else the last sample
fn open_circuit_index(curve: &Curve, open_circuit_current: f64) -> usize {
    curve
        .current()
        .iter()
        .position(|&i| i <= open_circuit_current)
        .unwrap_or(curve.len() - 1)
}

/// `|Δcurrent / Δvoltage|` per segment; None where the voltage does not advance
fn segment_slopes(curve: &Curve) -> impl Iterator<Item = Option<f64>> + '_ {
    curve.points().tuple_windows().map(|((v0, i0), (v1, i1))| {
        let dv = v1 - v0;
        (dv != 0.0).then(|| ((i1 - i0) / dv).abs())
    })
}

/// Factor that brings the measured curve to the reference Isc, 1 when either is not positive
fn isc_scale(measured_isc: f64, theoretical_isc: f64) -> f64 {
    if measured_isc > 0.0 && theoretical_isc > 0.0 {
        theoretical_isc / measured_isc
    } else {
        1.0
    }
}

/// Slopes of both curves are compared at the same Isc, so a healthy curve
/// that is only brighter or dimmer than its reference shows no step
fn max_step_excess(measured: &Curve, reference: &Curve, scale: f64) -> f64 {
    segment_slopes(measured)
        .zip_longest(segment_slopes(reference))
        .filter_map(|pair| match pair {
            EitherOrBoth::Both(m, r) => m.map(|m| m * scale - r.unwrap_or(0.0)),
            EitherOrBoth::Left(m) => m.map(|m| m * scale),
            EitherOrBoth::Right(_) => None,
        })
        .fold(0.0, f64::max)
}

/// Grades measured curves against their references
#[derive(Debug, Clone, Default)]
pub struct FaultClassifier {
    thresholds: ClassifierThresholds,
}

impl FaultClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    pub fn diagnose(&self, measured: &Curve, reference: &Curve) -> CurveDiagnostics {
        CurveDiagnostics::compute(measured, reference, self.thresholds.open_circuit_current_a)
    }

    /// Classify a reading against the reference curve of its irradiance bucket
    pub fn classify(&self, measured: &MeasurementData, reference: &Curve) -> FaultVerdict {
        let diagnostics = self.diagnose(measured.curve(), reference);
        debug!(
            isc_drop_percent = diagnostics.isc_drop_percent,
            voc_deviation_percent = diagnostics.voc_deviation_percent,
            max_step = diagnostics.max_step,
            temperature = measured.temperature(),
            "curve diagnostics"
        );
        self.verdict(&diagnostics, measured.temperature())
    }

    /// Apply the priority rules to precomputed diagnostics
    pub fn verdict(&self, d: &CurveDiagnostics, temperature_c: f64) -> FaultVerdict {
        let t = &self.thresholds;

        if d.isc_drop_percent > t.isc_warning_drop_percent
            && d.isc_drop_percent <= t.isc_critical_drop_percent
        {
            return FaultVerdict::new(
                FaultType::CellCrack,
                Severity::Warning,
                format!(
                    "Possible cell crack detected. Current (Isc) is {:.1}% below expected value.",
                    d.isc_drop_percent
                ),
            );
        }

        if d.isc_drop_percent > t.isc_critical_drop_percent {
            return FaultVerdict::new(
                FaultType::CellCrack,
                Severity::Critical,
                format!(
                    "Severe cell crack detected. Current (Isc) is {:.1}% below expected value.",
                    d.isc_drop_percent
                ),
            );
        }

        // A Voc shift alone can be measurement noise; it needs heat to count
        if d.voc_deviation_percent > t.voc_warning_deviation_percent
            && temperature_c > t.hot_spot_temperature_c
        {
            let severity = if d.voc_deviation_percent > t.voc_critical_deviation_percent {
                Severity::Critical
            } else {
                Severity::Warning
            };
            return FaultVerdict::new(
                FaultType::HotSpot,
                severity,
                format!(
                    "Hot spot detected. Voltage deviation {:.1}% with high temperature ({:.1}°C).",
                    d.voc_deviation_percent, temperature_c
                ),
            );
        }

        if d.max_step > t.step_threshold_a_per_v {
            return FaultVerdict::new(
                FaultType::Shading,
                Severity::Warning,
                "Partial shading detected. Step-like pattern observed in I-V curve.",
            );
        }

        FaultVerdict::normal()
    }
}
