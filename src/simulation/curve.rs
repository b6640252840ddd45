//! # I-V Curve Generation
//!
//! Single-diode style approximation of a 40 V / 10 A panel at standard test
//! conditions, with optional fault signatures applied to the current samples.

use crate::domain::{Curve, FaultType, IrradianceLevel, TheoreticalCurve, CURVE_POINTS};

use crate::domain::power::power_curve;

/// Open-circuit voltage at 25 °C (V)
pub const NOMINAL_VOC_V: f64 = 40.0;
/// Short-circuit current at 1000 W/m² (A)
pub const NOMINAL_ISC_A: f64 = 10.0;
/// Voc temperature coefficient (fraction per °C)
pub const VOC_TEMP_COEFFICIENT: f64 = 0.0025;
/// Reference conditions
pub const REFERENCE_TEMPERATURE_C: f64 = 25.0;
pub const REFERENCE_IRRADIANCE: f64 = 1000.0;
/// Shape constant `a` of `I = Isc * (1 - e^((V - Voc) / a))`
pub const CURVE_SHAPE_FACTOR: f64 = 0.7;

const CELL_CRACK_FACTOR: f64 = 0.85;
const HOT_SPOT_MIN_TEMPERATURE_C: f64 = 40.0;
const HOT_SPOT_MAX_LOSS: f64 = 0.3;
const SHADING_FACTOR: f64 = 0.6;

// Sample index ranges of the fault signatures
const HOT_SPOT_START: usize = CURVE_POINTS * 7 / 10;
const SHADING_START: usize = CURVE_POINTS * 3 / 10;
const SHADING_END: usize = CURVE_POINTS * 6 / 10;

/// Voc falls linearly as the panel heats above 25 °C
pub fn open_circuit_voltage(temperature_c: f64) -> f64 {
    NOMINAL_VOC_V * (1.0 - VOC_TEMP_COEFFICIENT * (temperature_c - REFERENCE_TEMPERATURE_C))
}

/// Isc scales linearly with irradiance
pub fn short_circuit_current(irradiance: f64) -> f64 {
    NOMINAL_ISC_A * (irradiance / REFERENCE_IRRADIANCE)
}

/// Generate a 50-point I-V curve from 0 V to Voc.
///
/// Inputs are not validated; callers clamp them into physical ranges.
pub fn generate_curve(irradiance: f64, temperature_c: f64, fault: FaultType) -> Curve {
    let voc = open_circuit_voltage(temperature_c);
    let isc = short_circuit_current(irradiance);

    let last = (CURVE_POINTS - 1) as f64;
    let voltage: Vec<f64> = (0..CURVE_POINTS)
        .map(|i| (i as f64 / last) * voc)
        .collect();

    let mut current: Vec<f64> = voltage
        .iter()
        .map(|&v| {
            if v >= voc {
                0.0
            } else {
                isc * (1.0 - ((v - voc) / CURVE_SHAPE_FACTOR).exp())
            }
        })
        .collect();

    apply_fault(&mut current, temperature_c, fault);

    Curve::from_samples(voltage, current)
}

fn apply_fault(current: &mut [f64], temperature_c: f64, fault: FaultType) {
    match fault {
        FaultType::Normal => {}
        FaultType::CellCrack => {
            current.iter_mut().for_each(|i| *i *= CELL_CRACK_FACTOR);
        }
        FaultType::HotSpot => {
            if temperature_c > HOT_SPOT_MIN_TEMPERATURE_C {
                let span = (CURVE_POINTS - HOT_SPOT_START) as f64;
                for (offset, i) in current[HOT_SPOT_START..].iter_mut().enumerate() {
                    *i *= 1.0 - HOT_SPOT_MAX_LOSS * (offset as f64 / span);
                }
            }
        }
        FaultType::Shading => {
            current[SHADING_START..SHADING_END]
                .iter_mut()
                .for_each(|i| *i *= SHADING_FACTOR);
        }
    }
}

/// Fault-free reference curve for a bucket at 25 °C
pub fn theoretical_curve(level: IrradianceLevel) -> TheoreticalCurve {
    let curve = generate_curve(
        level.watts_per_m2(),
        REFERENCE_TEMPERATURE_C,
        FaultType::Normal,
    );
    let power = power_curve(curve.voltage(), curve.current());
    TheoreticalCurve {
        irradiance: level,
        curve,
        power,
    }
}

/// Precomputed reference curves for every irradiance bucket
#[derive(Debug, Clone)]
pub struct ReferenceLibrary {
    curves: Vec<TheoreticalCurve>,
}

impl Default for ReferenceLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceLibrary {
    pub fn new() -> Self {
        Self {
            curves: IrradianceLevel::ALL
                .into_iter()
                .map(theoretical_curve)
                .collect(),
        }
    }

    pub fn get(&self, level: IrradianceLevel) -> &TheoreticalCurve {
        // ALL is in declaration order, so the discriminant is the index
        &self.curves[level as usize]
    }

    /// Reference for the bucket nearest to a measured irradiance
    pub fn for_irradiance(&self, irradiance: f64) -> &TheoreticalCurve {
        self.get(IrradianceLevel::nearest(irradiance))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TheoreticalCurve> {
        self.curves.iter()
    }
}
