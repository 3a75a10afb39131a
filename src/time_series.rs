use crate::timer::Lap;

/// One point on the lap chart: lap number against lap time in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapPoint {
    pub lap: f64,
    pub secs: f64,
}

impl LapPoint {
    pub fn new(lap: f64, secs: f64) -> Self {
        Self { lap, secs }
    }
}

impl From<LapPoint> for (f64, f64) {
    fn from(p: LapPoint) -> Self {
        (p.lap, p.secs)
    }
}

pub fn lap_points(laps: &[Lap]) -> Vec<LapPoint> {
    laps.iter()
        .enumerate()
        .map(|(i, lap)| LapPoint::new((i + 1) as f64, lap.lap_time as f64 / 1000.0))
        .collect()
}
