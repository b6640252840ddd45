//! # Panel Simulation Module
//!
//! Synthesizes measurement data for a single PV panel.
//!
//! ## Components
//!
//! - **Curve**: I-V curve generator with fault signatures, plus the reference library
//! - **Power**: Power curve, peak power and efficiency, re-exported from the domain
//! - **Random**: Injectable random source and clock
//! - **Simulator**: Random-walk measurement ticks with fault injection and classification
//! - **History**: Backlog of past alerts for a freshly started monitor
//!
//! ## Usage
//!
//! ```rust
//! use pv_fault_monitor::controller::classifier::FaultClassifier;
//! use pv_fault_monitor::simulation::{MeasurementSimulator, SeededRandom, SystemClock};
//!
//! let mut sim = MeasurementSimulator::new(
//!     SeededRandom::new(Some(42)),
//!     SystemClock,
//!     FaultClassifier::default(),
//! );
//!
//! let first = sim.initial_measurement(800.0, 30.0);
//! let (next, verdict) = sim.tick(&first, 0.1);
//! assert!(next.irradiance() >= 100.0 && next.irradiance() <= 1000.0);
//! println!("{}: {}", verdict.severity, verdict.message);
//! ```

pub mod curve;
pub mod history;
pub mod random;
pub mod simulator;

pub use crate::domain::power::{efficiency, peak_power, power_curve, PANEL_AREA_M2};
pub use curve::{generate_curve, theoretical_curve, ReferenceLibrary};
pub use history::generate_historical_alerts;
pub use random::{Clock, FixedClock, RandomSource, ScriptedRandom, SeededRandom, SystemClock};
pub use simulator::MeasurementSimulator;
