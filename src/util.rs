pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Population standard deviation (divides by `n`, not `n - 1`)
pub fn std_dev(data: &[f64]) -> Option<f64> {
    match (mean(data), data.len()) {
        (Some(data_mean), count) if count > 0 => {
            let variance = data
                .iter()
                .map(|value| {
                    let diff = data_mean - *value;

                    diff * diff
                })
                .sum::<f64>()
                / count as f64;

            Some(variance.sqrt())
        }
        _ => None,
    }
}

/// Round to one decimal place, half away from zero
pub fn round_1dp(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Render milliseconds as `MM:SS.t`.
///
/// Anything at or below zero renders as `00:00.0`. Minutes are not rolled
/// over into hours; past 99 minutes the field simply grows wider.
pub fn format_time(ms: i64) -> String {
    if ms <= 0 {
        return "00:00.0".to_string();
    }

    let tenths = (ms % 1000) / 100;
    let seconds = ms / 1000;
    let minutes = seconds / 60;

    format!("{:02}:{:02}.{}", minutes, seconds % 60, tenths)
}

/// Milliseconds as seconds with one decimal. Rounding follows the exact
/// binary value of `ms / 1000`; exact ties (`x.25`, `x.75`) go away from zero.
pub fn format_delta_secs(delta_ms: i64) -> String {
    let secs = delta_ms as f64 / 1000.0;
    if delta_ms % 250 == 0 && delta_ms % 500 != 0 {
        format!("{:.1}", round_1dp(secs))
    } else {
        format!("{secs:.1}")
    }
}

/// Signed delta in seconds with one decimal, e.g. `+1.2s` or `-0.4s`
pub fn format_delta(delta_ms: i64) -> String {
    if delta_ms >= 0 {
        format!("+{}s", format_delta_secs(delta_ms))
    } else {
        format!("{}s", format_delta_secs(delta_ms))
    }
}

pub fn format_seconds(ms: f64, decimals: usize) -> String {
    format!("{:.*}s", decimals, ms / 1000.0)
}
