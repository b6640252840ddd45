//! # Power and Efficiency
//!
//! Derived electrical quantities of an I-V curve.

use super::Curve;

/// Active area of the simulated panel in m²
pub const PANEL_AREA_M2: f64 = 1.7;

/// Pointwise power (W) for matching voltage/current samples
pub fn power_curve(voltage: &[f64], current: &[f64]) -> Vec<f64> {
    voltage.iter().zip(current).map(|(v, i)| v * i).collect()
}

/// Maximum power point of a curve in W
pub fn peak_power(curve: &Curve) -> f64 {
    curve
        .points()
        .map(|(v, i)| v * i)
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Conversion efficiency in percent.
///
/// Non-positive irradiance yields 0 instead of dividing by zero.
pub fn efficiency(peak_power_w: f64, irradiance: f64, panel_area_m2: f64) -> f64 {
    if irradiance <= 0.0 || panel_area_m2 <= 0.0 {
        return 0.0;
    }
    peak_power_w / (irradiance * panel_area_m2) * 100.0
}
