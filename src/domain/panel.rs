use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{FaultType, FaultVerdict, MeasurementData, Severity};

/// Static panel metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelInfo {
    pub id: String,
    pub name: String,
    pub location: String,
    pub installed_date: NaiveDate,
    pub last_maintenance: Option<NaiveDate>,
}

impl Default for PanelInfo {
    fn default() -> Self {
        Self {
            id: "panel-001".to_string(),
            name: "PV Array 1".to_string(),
            location: "Roof - South Facing".to_string(),
            installed_date: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap_or_default(),
            last_maintenance: NaiveDate::from_ymd_opt(2024, 3, 10),
        }
    }
}

/// Panel metadata plus the latest reading and the status mirrored from its verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelState {
    pub info: PanelInfo,
    pub status: Severity,
    pub status_message: String,
    pub current: MeasurementData,
}

impl PanelState {
    pub fn new(info: PanelInfo, current: MeasurementData) -> Self {
        Self {
            info,
            status: Severity::Normal,
            status_message: "Operating normally".to_string(),
            current,
        }
    }

    /// Replace the reading and status in one step
    pub fn with_reading(&self, measurement: MeasurementData, verdict: &FaultVerdict) -> Self {
        Self {
            info: self.info.clone(),
            status: verdict.severity,
            status_message: verdict.message.clone(),
            current: measurement,
        }
    }
}

/// Recorded fault verdict for one panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultAlert {
    pub id: String,
    pub panel_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub fault_type: FaultType,
    pub severity: Severity,
    pub message: String,
    acknowledged: bool,
}

impl FaultAlert {
    pub fn new(
        id: impl Into<String>,
        panel_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        verdict: FaultVerdict,
        acknowledged: bool,
    ) -> Self {
        Self {
            id: id.into(),
            panel_id: panel_id.into(),
            timestamp,
            fault_type: verdict.fault_type,
            severity: verdict.severity,
            message: verdict.message,
            acknowledged,
        }
    }

    /// New, unacknowledged alert for a fresh verdict
    pub fn from_verdict(
        id: impl Into<String>,
        panel_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        verdict: &FaultVerdict,
    ) -> Self {
        Self::new(id, panel_id, timestamp, verdict.clone(), false)
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// Acknowledgement is one-way
    pub fn acknowledge(&mut self) {
        self.acknowledged = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Curve;

    fn measurement() -> MeasurementData {
        let curve = Curve::new(vec![0.0, 40.0], vec![8.0, 0.0]).unwrap();
        MeasurementData::new(Utc::now(), 800.0, 30.0, curve)
    }

    #[test]
    fn test_default_panel_info() {
        let info = PanelInfo::default();
        assert_eq!(info.id, "panel-001");
        assert_eq!(
            info.installed_date,
            NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()
        );
        assert_eq!(info.last_maintenance, NaiveDate::from_ymd_opt(2024, 3, 10));
    }

    #[test]
    fn test_with_reading_mirrors_verdict() {
        let state = PanelState::new(PanelInfo::default(), measurement());
        assert_eq!(state.status, Severity::Normal);

        let verdict = FaultVerdict::new(FaultType::Shading, Severity::Warning, "shade");
        let next = measurement();
        let state = state.with_reading(next.clone(), &verdict);

        assert_eq!(state.status, Severity::Warning);
        assert_eq!(state.status_message, "shade");
        assert_eq!(state.current, next);
        assert_eq!(state.info.id, "panel-001");
    }

    #[test]
    fn test_alert_acknowledge_is_one_way() {
        let verdict = FaultVerdict::new(FaultType::HotSpot, Severity::Critical, "hot");
        let mut alert = FaultAlert::from_verdict("alert-1", "panel-001", Utc::now(), &verdict);
        assert!(!alert.is_acknowledged());
        assert_eq!(alert.fault_type, FaultType::HotSpot);

        alert.acknowledge();
        alert.acknowledge();
        assert!(alert.is_acknowledged());
    }
}
