use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

use crate::timer::Lap;
use crate::util::{mean, round_1dp, std_dev};

/// Aggregate figures for a set of laps. The default value is the empty
/// summary (`laps == 0`), which the UI renders as blank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub avg: f64,
    pub best: u64,
    pub worst: u64,
    pub on_target_pct: f64,
    pub consistency: f64,
    #[serde(default)]
    pub laps: usize,
}

impl SessionSummary {
    pub fn is_empty(&self) -> bool {
        self.laps == 0
    }
}

pub fn summarize(laps: &[Lap], tolerance_ms: u64) -> SessionSummary {
    if laps.is_empty() {
        return SessionSummary::default();
    }

    let times = laps.iter().map(|l| l.lap_time as f64).collect::<Vec<f64>>();

    let (best, worst) = match laps.iter().map(|l| l.lap_time).minmax() {
        MinMaxResult::NoElements => (0, 0),
        MinMaxResult::OneElement(t) => (t, t),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };

    let on_target = laps
        .iter()
        .filter(|l| l.delta.unsigned_abs() <= tolerance_ms)
        .count();

    let consistency = match std_dev(&times) {
        Some(sd) if sd.is_finite() => sd,
        _ => 0.0,
    };

    SessionSummary {
        avg: mean(&times).unwrap_or(0.0),
        best,
        worst,
        on_target_pct: round_1dp(on_target as f64 / laps.len() as f64 * 100.0),
        consistency,
        laps: laps.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lap(lap_time: u64, delta: i64) -> Lap {
        Lap { lap_time, delta }
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[], 100);
        assert!(summary.is_empty());
        assert_eq!(summary, SessionSummary::default());
        assert_eq!(summary.avg, 0.0);
        assert_eq!(summary.on_target_pct, 0.0);
    }

    #[test]
    fn test_summarize_three_laps() {
        let laps = [lap(1000, 0), lap(2000, 0), lap(3000, 0)];
        let summary = summarize(&laps, 0);

        assert_eq!(summary.avg, 2000.0);
        assert_eq!(summary.best, 1000);
        assert_eq!(summary.worst, 3000);
        assert_eq!(summary.laps, 3);
        assert!((summary.consistency - 816.5).abs() < 0.05);
        assert_eq!(summary.on_target_pct, 100.0);
    }

    #[test]
    fn test_summarize_single_lap() {
        let summary = summarize(&[lap(4200, 200)], 100);
        assert_eq!(summary.best, 4200);
        assert_eq!(summary.worst, 4200);
        assert_eq!(summary.consistency, 0.0);
        assert_eq!(summary.on_target_pct, 0.0);
    }

    #[test]
    fn test_on_target_pct_rounds_to_one_decimal() {
        let laps = [lap(1000, 0), lap(1050, 50), lap(1300, 300)];
        assert_eq!(summarize(&laps, 50).on_target_pct, 66.7);
        assert_eq!(summarize(&laps, 0).on_target_pct, 33.3);
        assert_eq!(summarize(&laps, 300).on_target_pct, 100.0);
    }

    #[test]
    fn test_fast_laps_count_by_magnitude() {
        let laps = [lap(900, -100), lap(800, -200)];
        assert_eq!(summarize(&laps, 100).on_target_pct, 50.0);
    }

    #[test]
    fn test_average_may_be_fractional() {
        let summary = summarize(&[lap(1000, 0), lap(1001, 0)], 0);
        assert_eq!(summary.avg, 1000.5);
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = summarize(&[lap(1000, 0)], 0);
        let json = serde_json::to_value(summary).unwrap();
        assert!(json.get("onTargetPct").is_some());
        assert!(json.get("consistency").is_some());

        // older records without a lap count still load
        let legacy = r#"{"avg":1.0,"best":1,"worst":1,"onTargetPct":100.0,"consistency":0.0}"#;
        let parsed: SessionSummary = serde_json::from_str(legacy).unwrap();
        assert_eq!(parsed.laps, 0);
    }
}
