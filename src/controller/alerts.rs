use std::collections::VecDeque;

use super::MonitorError;
use crate::domain::FaultAlert;

/// Alerts for one panel, newest first
#[derive(Debug, Clone, Default)]
pub struct AlertLog {
    alerts: VecDeque<FaultAlert>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the log with older alerts, already sorted newest first
    pub fn with_backlog(backlog: Vec<FaultAlert>) -> Self {
        Self {
            alerts: backlog.into(),
        }
    }

    /// Record a new alert at the front
    pub fn record(&mut self, alert: FaultAlert) {
        self.alerts.push_front(alert);
    }

    pub fn acknowledge(&mut self, id: &str) -> Result<(), MonitorError> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|alert| alert.id == id)
            .ok_or_else(|| MonitorError::AlertNotFound(id.to_string()))?;
        alert.acknowledge();
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&FaultAlert> {
        self.alerts.iter().find(|alert| alert.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FaultAlert> {
        self.alerts.iter()
    }

    pub fn unacknowledged(&self) -> impl Iterator<Item = &FaultAlert> {
        self.alerts.iter().filter(|alert| !alert.is_acknowledged())
    }

    pub fn unacknowledged_count(&self) -> usize {
        self.unacknowledged().count()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
