use crate::domain::signal::{sector_display_name, Confidence};
use chrono::{DateTime, Utc};

/// Fixed decimals; NaN and infinities read as zero and `-0.0` prints as `0.0`.
pub fn fixed(value: f64, decimals: usize) -> String {
    let (negative, digits) = magnitude(value, decimals);
    if negative {
        format!("-{digits}")
    } else {
        digits
    }
}

/// `+12.3%`, `-1.8%`, `0.0%`.
pub fn signed_percent(value: f64, decimals: usize) -> String {
    let (negative, digits) = magnitude(value, decimals);
    let sign = if negative {
        "-"
    } else if is_zero(&digits) {
        ""
    } else {
        "+"
    };
    format!("{sign}{digits}%")
}

pub fn percent(value: f64, decimals: usize) -> String {
    format!("{}%", fixed(value, decimals))
}

pub fn win_rate(value: f64) -> String {
    percent(value, 1)
}

pub fn sharpe(value: f64) -> String {
    fixed(value, 2)
}

pub fn confidence(value: &Confidence) -> String {
    match value {
        Confidence::Score(score) => percent(*score, 1),
        Confidence::Level(level) => format!("{level:?}").to_ascii_uppercase(),
    }
}

pub fn date(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// Name supplied by the source, else the known display name, else the code.
pub fn sector_label<'a>(code: &'a str, name: &'a str) -> &'a str {
    if !name.trim().is_empty() && name != code {
        return name;
    }
    sector_display_name(code).unwrap_or(code)
}

fn magnitude(value: f64, decimals: usize) -> (bool, String) {
    let value = if value.is_finite() { value } else { 0.0 };
    let digits = format!("{:.*}", decimals, value.abs());
    let negative = value < 0.0 && !is_zero(&digits);
    (negative, digits)
}

fn is_zero(digits: &str) -> bool {
    digits.chars().all(|c| c == '0' || c == '.')
}
