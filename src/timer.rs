use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::feedback::{LapEvent, LapFeedback, NoFeedback};
use crate::goal::GoalConfig;
use crate::TICK_RATE_MS;

/// One recorded split. `delta` is relative to the goal in force when the
/// lap was taken (zero when no goal was set).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lap {
    pub lap_time: u64,
    pub delta: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Stopped,
    Running,
    Paused,
}

/// The live stopwatch: accumulated time, current lap boundary and the laps
/// recorded so far.
pub struct LapTimer {
    state: TimerState,
    total_ms: u64,
    lap_start_ms: u64,
    laps: Vec<Lap>,
    goal: GoalConfig,
    feedback: Box<dyn LapFeedback>,
}

impl std::fmt::Debug for LapTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LapTimer")
            .field("state", &self.state)
            .field("total_ms", &self.total_ms)
            .field("lap_start_ms", &self.lap_start_ms)
            .field("laps", &self.laps)
            .field("goal", &self.goal)
            .finish_non_exhaustive()
    }
}

impl Default for LapTimer {
    fn default() -> Self {
        Self::new(GoalConfig::default())
    }
}

impl LapTimer {
    pub fn new(goal: GoalConfig) -> Self {
        Self {
            state: TimerState::Stopped,
            total_ms: 0,
            lap_start_ms: 0,
            laps: vec![],
            goal,
            feedback: Box::new(NoFeedback),
        }
    }

    pub fn with_feedback(mut self, feedback: Box<dyn LapFeedback>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    pub fn lap_start_ms(&self) -> u64 {
        self.lap_start_ms
    }

    pub fn current_lap_ms(&self) -> u64 {
        self.total_ms - self.lap_start_ms
    }

    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }

    pub fn goal(&self) -> GoalConfig {
        self.goal
    }

    /// Applies to laps recorded from now on; existing laps keep their delta.
    pub fn set_goal(&mut self, goal: GoalConfig) {
        self.goal = goal;
    }

    pub fn set_goal_ms(&mut self, goal_ms: u64) {
        self.goal.goal_ms = goal_ms;
    }

    pub fn set_tolerance_ms(&mut self, tolerance_ms: u64) {
        self.goal.tolerance_ms = tolerance_ms;
    }

    /// Entering the running state opens a fresh lap at the current total.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.lap_start_ms = self.total_ms;
        self.state = TimerState::Running;
        debug!(total_ms = self.total_ms, "timer started");
    }

    pub fn pause(&mut self) {
        if self.is_running() {
            self.state = TimerState::Paused;
            debug!(total_ms = self.total_ms, "timer paused");
        }
    }

    pub fn toggle(&mut self) {
        if self.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Accumulates elapsed time; ignored unless running.
    pub fn advance(&mut self, delta_ms: u64) {
        if self.is_running() {
            self.total_ms = self.total_ms.saturating_add(delta_ms);
        }
    }

    pub fn on_tick(&mut self) {
        self.advance(TICK_RATE_MS);
    }

    /// Closes the current lap. Returns `None` (and records nothing) unless
    /// the timer is running.
    pub fn lap(&mut self) -> Option<LapEvent> {
        if !self.is_running() {
            return None;
        }

        let lap_time = self.current_lap_ms();
        let delta = self.goal.delta(lap_time);
        let status = self.goal.status(delta);
        let lap = Lap { lap_time, delta };

        self.laps.push(lap);
        self.lap_start_ms = self.total_ms;

        let event = LapEvent {
            lap_index: self.laps.len(),
            lap,
            status,
        };
        debug!(lap = event.lap_index, lap_time, delta, %status, "lap recorded");

        if let Err(e) = self.feedback.notify(&event) {
            debug!("lap feedback failed: {}", e);
        }

        Some(event)
    }

    pub fn reset(&mut self) {
        self.state = TimerState::Stopped;
        self.total_ms = 0;
        self.lap_start_ms = 0;
        self.laps.clear();
        debug!("timer reset");
    }

    /// Hands over the recorded laps and resets the timer
    pub fn take_laps(&mut self) -> Vec<Lap> {
        let laps = std::mem::take(&mut self.laps);
        self.reset();
        laps
    }
}
