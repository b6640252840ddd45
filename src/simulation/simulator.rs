//! # Measurement Simulator
//!
//! Produces one synthetic panel reading per tick. Irradiance and temperature
//! random-walk from the previous reading, a fault is occasionally injected
//! into the generated curve, and the result is classified against the
//! reference curve of its irradiance bucket.

use tracing::debug;

use super::curve::{generate_curve, ReferenceLibrary};
use crate::domain::power::PANEL_AREA_M2;
use super::random::{Clock, RandomSource};
use crate::controller::classifier::FaultClassifier;
use crate::domain::{FaultType, FaultVerdict, MeasurementData};

/// Irradiance random-walk bounds (W/m²)
pub const IRRADIANCE_MIN: f64 = 100.0;
pub const IRRADIANCE_MAX: f64 = 1000.0;
/// Temperature random-walk bounds (°C)
pub const TEMPERATURE_MIN_C: f64 = 10.0;
pub const TEMPERATURE_MAX_C: f64 = 70.0;
/// Maximum change per tick
pub const IRRADIANCE_STEP: f64 = 50.0;
pub const TEMPERATURE_STEP_C: f64 = 1.0;

/// Default probability that a tick carries an injected fault
pub const DEFAULT_FAULT_PROBABILITY: f64 = 0.1;

/// Starting conditions of a fresh panel
pub const INITIAL_IRRADIANCE: f64 = 800.0;
pub const INITIAL_TEMPERATURE_C: f64 = 30.0;

/// Drives the random walk for a single panel
pub struct MeasurementSimulator<R, C> {
    random: R,
    clock: C,
    classifier: FaultClassifier,
    references: ReferenceLibrary,
    panel_area_m2: f64,
}

impl<R: RandomSource, C: Clock> MeasurementSimulator<R, C> {
    pub fn new(random: R, clock: C, classifier: FaultClassifier) -> Self {
        Self {
            random,
            clock,
            classifier,
            references: ReferenceLibrary::new(),
            panel_area_m2: PANEL_AREA_M2,
        }
    }

    pub fn with_panel_area(mut self, panel_area_m2: f64) -> Self {
        self.panel_area_m2 = panel_area_m2;
        self
    }

    pub fn references(&self) -> &ReferenceLibrary {
        &self.references
    }

    pub fn classifier(&self) -> &FaultClassifier {
        &self.classifier
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable access to the random source, shared with other synthesizers
    pub fn random_mut(&mut self) -> &mut R {
        &mut self.random
    }

    /// Fault-free reading at the given conditions, stamped with the current time
    pub fn initial_measurement(&self, irradiance: f64, temperature_c: f64) -> MeasurementData {
        let curve = generate_curve(irradiance, temperature_c, FaultType::Normal);
        MeasurementData::with_panel_area(
            self.clock.now(),
            irradiance,
            temperature_c,
            curve,
            self.panel_area_m2,
        )
    }

    /// Advance the random walk by one reading and classify it
    pub fn tick(
        &mut self,
        previous: &MeasurementData,
        fault_probability: f64,
    ) -> (MeasurementData, FaultVerdict) {
        let irradiance = (previous.irradiance()
            + self.random.uniform(-IRRADIANCE_STEP, IRRADIANCE_STEP))
        .clamp(IRRADIANCE_MIN, IRRADIANCE_MAX);
        let temperature = (previous.temperature()
            + self.random.uniform(-TEMPERATURE_STEP_C, TEMPERATURE_STEP_C))
        .clamp(TEMPERATURE_MIN_C, TEMPERATURE_MAX_C);

        let injected = self.pick_fault(fault_probability);
        if injected.is_fault() {
            debug!(fault = %injected, irradiance, temperature, "injecting simulated fault");
        }

        let curve = generate_curve(irradiance, temperature, injected);
        let measurement = MeasurementData::with_panel_area(
            self.clock.now(),
            irradiance,
            temperature,
            curve,
            self.panel_area_m2,
        );

        let reference = self.references.for_irradiance(irradiance);
        let verdict = self.classifier.classify(&measurement, &reference.curve);

        (measurement, verdict)
    }

    fn pick_fault(&mut self, fault_probability: f64) -> FaultType {
        // NaN compares false against everything, so it never injects
        let probability = if fault_probability.is_nan() {
            0.0
        } else {
            fault_probability.clamp(0.0, 1.0)
        };

        if self.random.uniform(0.0, 1.0) >= probability {
            return FaultType::Normal;
        }

        let choices = FaultType::INJECTABLE.len();
        let idx = (self.random.uniform(0.0, 1.0) * choices as f64) as usize;
        FaultType::INJECTABLE[idx.min(choices - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Severity;
    use crate::simulation::random::{FixedClock, ScriptedRandom, SeededRandom};
    use chrono::{TimeZone, Utc};

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap())
    }

    fn scripted(fractions: &[f64]) -> MeasurementSimulator<ScriptedRandom, FixedClock> {
        MeasurementSimulator::new(
            ScriptedRandom::new(fractions.to_vec()),
            fixed_clock(),
            FaultClassifier::default(),
        )
    }

    #[test]
    fn test_initial_measurement() {
        let sim = scripted(&[0.5]);
        let m = sim.initial_measurement(INITIAL_IRRADIANCE, INITIAL_TEMPERATURE_C);
        assert_eq!(m.irradiance(), 800.0);
        assert_eq!(m.temperature(), 30.0);
        assert!(m.power() > 0.0);
        assert!(m.efficiency() > 0.0);
        assert_eq!(m.timestamp(), fixed_clock().0);
    }

    #[test]
    fn test_tick_random_walk_deltas() {
        // irradiance +25, temperature -0.5, no fault
        let mut sim = scripted(&[0.75, 0.25, 0.99]);
        let prev = sim.initial_measurement(800.0, 30.0);
        let (next, verdict) = sim.tick(&prev, 0.1);

        assert!((next.irradiance() - 825.0).abs() < 1e-9);
        assert!((next.temperature() - 29.5).abs() < 1e-9);
        assert_eq!(verdict, FaultVerdict::normal());
        assert_eq!(sim.random_mut().draws(), 3);
    }

    #[test]
    fn test_tick_clamps_to_bounds() {
        let mut sim = scripted(&[0.99, 0.99, 0.99]);
        let prev = sim.initial_measurement(990.0, 69.8);
        let (next, _) = sim.tick(&prev, 0.0);
        assert_eq!(next.irradiance(), IRRADIANCE_MAX);
        assert_eq!(next.temperature(), TEMPERATURE_MAX_C);

        let mut sim = scripted(&[0.0, 0.0, 0.99]);
        let prev = sim.initial_measurement(120.0, 10.5);
        let (next, _) = sim.tick(&prev, 0.0);
        assert_eq!(next.irradiance(), IRRADIANCE_MIN);
        assert_eq!(next.temperature(), TEMPERATURE_MIN_C);
    }

    #[test]
    fn test_injected_cell_crack_is_classified() {
        // no drift, fault roll hits, pick index 0 (cell crack)
        let mut sim = scripted(&[0.5, 0.5, 0.0, 0.0]);
        let prev = sim.initial_measurement(800.0, 30.0);
        let (next, verdict) = sim.tick(&prev, 0.1);

        assert_eq!(verdict.fault_type, FaultType::CellCrack);
        assert_eq!(verdict.severity, Severity::Warning);
        assert!(next.power() < prev.power());
    }

    #[test]
    fn test_injected_shading_is_classified() {
        // pick fraction 0.9 -> index 2 (shading)
        let mut sim = scripted(&[0.5, 0.5, 0.0, 0.9]);
        let prev = sim.initial_measurement(600.0, 25.0);
        let (_, verdict) = sim.tick(&prev, 1.0);
        assert_eq!(verdict.fault_type, FaultType::Shading);
        assert_eq!(verdict.severity, Severity::Warning);
    }

    #[test]
    fn test_fault_probability_edges() {
        let mut sim = scripted(&[0.5, 0.5, 0.0, 0.0]);
        assert_eq!(sim.pick_fault(0.0), FaultType::Normal);

        let mut sim = scripted(&[0.999]);
        assert_ne!(sim.pick_fault(1.0), FaultType::Normal);
        assert_eq!(sim.pick_fault(f64::NAN), FaultType::Normal);
    }

    #[test]
    fn test_seeded_simulation_is_reproducible() {
        let run = || {
            let mut sim = MeasurementSimulator::new(
                SeededRandom::new(Some(7)),
                fixed_clock(),
                FaultClassifier::default(),
            );
            let mut m = sim.initial_measurement(800.0, 30.0);
            let mut verdicts = Vec::new();
            for _ in 0..50 {
                let (next, verdict) = sim.tick(&m, 0.3);
                verdicts.push(verdict);
                m = next;
            }
            (m, verdicts)
        };
        assert_eq!(run(), run());
    }
}
