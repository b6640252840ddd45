//! Simulated PV panel monitor: synthetic I-V measurements, reference curves,
//! fault classification and an alert log driven by a live tick loop.

pub mod config;
pub mod controller;
pub mod domain;
pub mod export;
pub mod simulation;
pub mod telemetry;
