use serde::{Deserialize, Serialize};

use super::{DomainError, IrradianceLevel};

/// Number of samples in every generated I-V curve
pub const CURVE_POINTS: usize = 50;

/// Immutable I-V curve: voltage samples (V) with the current (A) at each sample.
///
/// Both sequences always have the same, non-zero length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveSamples")]
pub struct Curve {
    voltage: Vec<f64>,
    current: Vec<f64>,
}

#[derive(Deserialize)]
struct CurveSamples {
    voltage: Vec<f64>,
    current: Vec<f64>,
}

impl TryFrom<CurveSamples> for Curve {
    type Error = DomainError;

    fn try_from(samples: CurveSamples) -> Result<Self, Self::Error> {
        Curve::new(samples.voltage, samples.current)
    }
}

impl Curve {
    pub fn new(voltage: Vec<f64>, current: Vec<f64>) -> Result<Self, DomainError> {
        if voltage.len() != current.len() {
            return Err(DomainError::SampleCountMismatch {
                voltage: voltage.len(),
                current: current.len(),
            });
        }
        if voltage.is_empty() {
            return Err(DomainError::EmptyCurve);
        }
        Ok(Self { voltage, current })
    }

    /// For generators that build both sequences with the same length
    pub(crate) fn from_samples(voltage: Vec<f64>, current: Vec<f64>) -> Self {
        debug_assert_eq!(voltage.len(), current.len());
        debug_assert!(!voltage.is_empty());
        Self { voltage, current }
    }

    pub fn voltage(&self) -> &[f64] {
        &self.voltage
    }

    pub fn current(&self) -> &[f64] {
        &self.current
    }

    pub fn len(&self) -> usize {
        self.voltage.len()
    }

    /// Always false for a constructed curve
    pub fn is_empty(&self) -> bool {
        self.voltage.is_empty()
    }

    /// (voltage, current) pairs in ascending voltage order
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.voltage.iter().copied().zip(self.current.iter().copied())
    }

    /// Highest current on the curve, i.e. the short-circuit current for a healthy panel
    pub fn max_current(&self) -> f64 {
        self.current.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Reference curve for one irradiance bucket at 25 °C, fault free
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheoreticalCurve {
    pub irradiance: IrradianceLevel,
    pub curve: Curve,
    /// Pointwise power (W) of `curve`
    pub power: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_rejects_mismatched_lengths() {
        let err = Curve::new(vec![0.0, 1.0], vec![1.0]).unwrap_err();
        assert_eq!(
            err,
            DomainError::SampleCountMismatch {
                voltage: 2,
                current: 1
            }
        );
        assert_eq!(Curve::new(vec![], vec![]), Err(DomainError::EmptyCurve));
    }

    #[test]
    fn test_curve_points_and_max_current() {
        let curve = Curve::new(vec![0.0, 10.0, 20.0], vec![5.0, 4.5, 0.0]).unwrap();
        assert_eq!(curve.len(), 3);
        assert!(!curve.is_empty());
        assert_eq!(curve.max_current(), 5.0);
        let points: Vec<_> = curve.points().collect();
        assert_eq!(points, vec![(0.0, 5.0), (10.0, 4.5), (20.0, 0.0)]);
    }

    #[test]
    fn test_curve_deserialization_is_validated() {
        let ok: Curve = serde_json::from_str(r#"{"voltage":[0.0,1.0],"current":[2.0,0.0]}"#)
            .unwrap();
        assert_eq!(ok.current(), &[2.0, 0.0]);

        let bad = serde_json::from_str::<Curve>(r#"{"voltage":[0.0,1.0],"current":[2.0]}"#);
        assert!(bad.is_err());
    }
}
