//! # Alert Backlog
//!
//! Fabricates a plausible week of past alerts so a freshly started monitor
//! has something to show.

use chrono::Duration;

use super::random::{Clock, RandomSource};
use crate::domain::{FaultAlert, FaultType, FaultVerdict, Severity};

/// Oldest backlog entry, in hours before now
const MAX_HOURS_AGO: f64 = 24.0 * 7.0;

const BACKLOG_TYPES: [FaultType; 4] = [
    FaultType::CellCrack,
    FaultType::HotSpot,
    FaultType::Shading,
    FaultType::Normal,
];

/// Generate up to `count` historical alerts, newest first.
///
/// Normal entries are only kept 30% of the time, so fewer than `count`
/// alerts may come back.
pub fn generate_historical_alerts<R, C>(
    panel_id: &str,
    count: usize,
    random: &mut R,
    clock: &C,
) -> Vec<FaultAlert>
where
    R: RandomSource + ?Sized,
    C: Clock + ?Sized,
{
    let now = clock.now();
    let mut alerts = Vec::with_capacity(count);

    for i in 0..count {
        let hours_ago = random.uniform(1.0, MAX_HOURS_AGO).floor() as i64;
        let timestamp = now - Duration::hours(hours_ago);

        let idx = (random.uniform(0.0, 1.0) * BACKLOG_TYPES.len() as f64) as usize;
        let fault_type = BACKLOG_TYPES[idx.min(BACKLOG_TYPES.len() - 1)];

        let verdict = match fault_type {
            FaultType::CellCrack => {
                if random.uniform(0.0, 1.0) > 0.5 {
                    FaultVerdict::new(
                        fault_type,
                        Severity::Warning,
                        "Possible cell crack detected. Schedule maintenance.",
                    )
                } else {
                    FaultVerdict::new(
                        fault_type,
                        Severity::Critical,
                        "Severe cell crack detected. Immediate inspection recommended.",
                    )
                }
            }
            FaultType::HotSpot => {
                if random.uniform(0.0, 1.0) > 0.7 {
                    FaultVerdict::new(
                        fault_type,
                        Severity::Critical,
                        "Critical hot spot detected. Risk of permanent damage.",
                    )
                } else {
                    FaultVerdict::new(
                        fault_type,
                        Severity::Warning,
                        "Hot spot detected. Temperature above threshold.",
                    )
                }
            }
            FaultType::Shading => FaultVerdict::new(
                fault_type,
                Severity::Warning,
                "Partial shading detected affecting performance.",
            ),
            FaultType::Normal => FaultVerdict::new(
                fault_type,
                Severity::Normal,
                "Panel operating within normal parameters.",
            ),
        };

        if fault_type.is_fault() || random.uniform(0.0, 1.0) > 0.7 {
            let acknowledged = random.uniform(0.0, 1.0) > 0.3;
            alerts.push(FaultAlert::new(
                format!("alert-{panel_id}-{i}"),
                panel_id,
                timestamp,
                verdict,
                acknowledged,
            ));
        }
    }

    alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::random::{FixedClock, ScriptedRandom, SeededRandom};
    use chrono::{TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_backlog_is_sorted_and_within_a_week() {
        let mut rng = SeededRandom::new(Some(3));
        let alerts = generate_historical_alerts("panel-001", 40, &mut rng, &clock());

        assert!(!alerts.is_empty());
        assert!(alerts.len() <= 40);
        for pair in alerts.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }
        for alert in &alerts {
            let age = clock().0 - alert.timestamp;
            assert!(age >= Duration::hours(1));
            assert!(age <= Duration::hours(168));
            assert_eq!(alert.panel_id, "panel-001");
            assert!(alert.id.starts_with("alert-panel-001-"));
        }
    }

    #[test]
    fn test_scripted_backlog_entry() {
        // hours 0.0 -> 1h ago, type 0.1 -> cell crack, severity 0.9 -> warning, ack 0.9
        let mut rng = ScriptedRandom::new(vec![0.0, 0.1, 0.9, 0.9]);
        let alerts = generate_historical_alerts("p", 1, &mut rng, &clock());

        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.id, "alert-p-0");
        assert_eq!(alert.fault_type, FaultType::CellCrack);
        assert_eq!(alert.severity, Severity::Warning);
        assert!(alert.is_acknowledged());
        assert_eq!(alert.timestamp, clock().0 - Duration::hours(1));
    }

    #[test]
    fn test_normal_entries_are_mostly_dropped() {
        // type 0.9 -> normal, keep roll 0.5 -> dropped
        let mut rng = ScriptedRandom::new(vec![0.5, 0.9, 0.5]);
        let alerts = generate_historical_alerts("p", 3, &mut rng, &clock());
        assert!(alerts.is_empty());
    }
}
