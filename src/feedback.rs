//! Lap feedback sinks.
//!
//! The timer hands every recorded lap to a [`LapFeedback`] implementation.
//! Feedback is best effort: errors returned here are logged by the timer and
//! never affect lap recording.

use std::io::{self, Write};

use crate::error::Result;
use crate::goal::LapStatus;
use crate::timer::Lap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapEvent {
    /// 1-based position of the lap in the live sequence
    pub lap_index: usize,
    pub lap: Lap,
    pub status: LapStatus,
}

impl LapEvent {
    pub fn announcement(&self) -> String {
        self.status.announcement(self.lap_index)
    }
}

pub trait LapFeedback {
    fn notify(&mut self, event: &LapEvent) -> Result<()>;
}

/// Used when nothing is listening
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeedback;

impl LapFeedback for NoFeedback {
    fn notify(&mut self, _event: &LapEvent) -> Result<()> {
        Ok(())
    }
}

/// Rings the terminal bell for off-target laps: once when fast, twice when slow
pub struct BellFeedback<W: Write> {
    out: W,
}

impl BellFeedback<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> BellFeedback<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> LapFeedback for BellFeedback<W> {
    fn notify(&mut self, event: &LapEvent) -> Result<()> {
        let bells = match event.status {
            LapStatus::Fast => 1,
            LapStatus::Slow => 2,
            LapStatus::On | LapStatus::None => 0,
        };
        if bells > 0 {
            self.out.write_all(&b"\x07\x07"[..bells])?;
            self.out.flush()?;
        }
        Ok(())
    }
}

/// Keeps every event it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingFeedback {
    pub events: Vec<LapEvent>,
}

impl LapFeedback for RecordingFeedback {
    fn notify(&mut self, event: &LapEvent) -> Result<()> {
        self.events.push(*event);
        Ok(())
    }
}
