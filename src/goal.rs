use serde::{Deserialize, Serialize};

/// Largest goal or tolerance accepted; keeps every delta representable as `i64`
pub const MAX_MS: u64 = i64::MAX as u64;

/// Pace goal for a single lap. A `goal_ms` of zero disables classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalConfig {
    #[serde(rename = "goalTime")]
    pub goal_ms: u64,
    #[serde(rename = "tolerance")]
    pub tolerance_ms: u64,
}

impl GoalConfig {
    pub fn new(goal_ms: u64, tolerance_ms: u64) -> Self {
        Self {
            goal_ms,
            tolerance_ms,
        }
    }

    /// Build from user-entered seconds; bad input disables the field.
    pub fn from_secs(goal_secs: f64, tolerance_secs: f64) -> Self {
        Self {
            goal_ms: secs_to_ms(goal_secs),
            tolerance_ms: secs_to_ms(tolerance_secs),
        }
    }

    pub fn is_set(&self) -> bool {
        self.goal_ms > 0
    }

    pub fn delta(&self, lap_ms: u64) -> i64 {
        delta(lap_ms, self.goal_ms)
    }

    pub fn status(&self, delta_ms: i64) -> LapStatus {
        status(delta_ms, self.goal_ms, self.tolerance_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum LapStatus {
    #[strum(serialize = "")]
    None,
    #[strum(serialize = "ON")]
    On,
    #[strum(serialize = "FAST")]
    Fast,
    #[strum(serialize = "SLOW")]
    Slow,
}

impl LapStatus {
    /// Short spoken-style line for lap `lap_index` (1-based)
    pub fn announcement(&self, lap_index: usize) -> String {
        match self {
            LapStatus::None => format!("Lap {lap_index}"),
            LapStatus::On => format!("Lap {lap_index}: on pace"),
            LapStatus::Fast => format!("Lap {lap_index}: fast"),
            LapStatus::Slow => format!("Lap {lap_index}: slow"),
        }
    }

    /// Vibration pattern in milliseconds, alternating on/off
    pub fn haptic_pattern(&self) -> &'static [u32] {
        match self {
            LapStatus::None => &[],
            LapStatus::On => &[100, 50, 100],
            LapStatus::Fast => &[200, 100, 200],
            LapStatus::Slow => &[500],
        }
    }
}

/// Lap duration minus goal, or zero when no goal is set
pub fn delta(lap_ms: u64, goal_ms: u64) -> i64 {
    if goal_ms == 0 {
        0
    } else {
        let d = lap_ms as i128 - goal_ms as i128;
        d.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }
}

/// Classify a delta. The tolerance bound is inclusive.
pub fn status(delta_ms: i64, goal_ms: u64, tolerance_ms: u64) -> LapStatus {
    if goal_ms == 0 {
        LapStatus::None
    } else if delta_ms.unsigned_abs() <= tolerance_ms {
        LapStatus::On
    } else if delta_ms < 0 {
        LapStatus::Fast
    } else {
        LapStatus::Slow
    }
}

pub fn secs_to_ms(secs: f64) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    let ms = (secs * 1000.0).round();
    if ms >= MAX_MS as f64 {
        MAX_MS
    } else {
        ms as u64
    }
}

/// Parse a seconds field as typed by the user. Anything unparsable is 0.
pub fn parse_secs(input: &str) -> u64 {
    input.trim().parse::<f64>().map(secs_to_ms).unwrap_or(0)
}
