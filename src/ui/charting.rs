use crate::time_series::LapPoint;

/// X (lap number) and Y (seconds) upper bounds for the lap chart.
/// The goal line, when set, always fits on the chart.
pub fn compute_chart_params(points: &[LapPoint], goal_secs: Option<f64>) -> (f64, f64) {
    let mut highest = goal_secs.unwrap_or(0.0);
    for p in points {
        if p.secs > highest {
            highest = p.secs;
        }
    }

    let last_lap = points.last().map_or(1.0, |p| p.lap).max(2.0);

    (last_lap, (highest + highest / 10.0).ceil().max(1.0))
}

/// Horizontal reference line at the goal pace across the whole x range
pub fn goal_line(goal_secs: f64, last_lap: f64) -> [(f64, f64); 2] {
    [(1.0, goal_secs), (last_lap, goal_secs)]
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}
