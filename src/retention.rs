//! Parsing of retention windows.

use anyhow::{Context, Result};
use chrono::TimeDelta;

/// Parse a retention window.
///
/// Supports a number with an optional unit suffix: `min` (minutes), `h`
/// (hours), `d` (days), `w` (weeks), `m` (months of 30 days). Plain numbers are
/// days. The `dd:hh:mm` form (days, hours, minutes) is accepted as well.
/// Examples: "15", "15d", "48h", "90min", "2w", "3m", "07:12:00".
pub fn parse_retention(window: &str) -> Result<TimeDelta> {
    let window = window.trim();

    if window.contains(':') {
        return parse_clock_form(window);
    }

    let (num_str, unit) = match window.find(|c: char| c.is_alphabetic()) {
        Some(pos) => {
            let (num, unit) = window.split_at(pos);
            (num, Some(unit))
        }
        None => (window, None),
    };

    let value: i64 = num_str.trim().parse().with_context(|| {
        format!(
            "Invalid retention window. Expected a number, got: {}",
            num_str
        )
    })?;
    if value < 0 {
        anyhow::bail!("Retention window cannot be negative: {}", window);
    }

    let delta = match unit.map(|u| u.to_ascii_lowercase()).as_deref() {
        None | Some("d") => TimeDelta::try_days(value),
        Some("min") => TimeDelta::try_minutes(value),
        Some("h") => TimeDelta::try_hours(value),
        Some("w") => TimeDelta::try_weeks(value),
        Some("m") => value.checked_mul(30).and_then(TimeDelta::try_days),
        Some(unknown) => {
            anyhow::bail!(
                "Invalid retention unit '{}'. Supported units: min (minutes), h (hours), d (days), w (weeks), m (months)",
                unknown
            );
        }
    };

    delta.with_context(|| format!("Retention window out of range: {}", window))
}

/// `dd:hh:mm`
fn parse_clock_form(window: &str) -> Result<TimeDelta> {
    let fields: Vec<&str> = window.split(':').collect();
    if fields.len() != 3 {
        anyhow::bail!(
            "Invalid retention window. Expected dd:hh:mm, got: {}",
            window
        );
    }

    let mut parsed = [0i64; 3];
    for (slot, field) in parsed.iter_mut().zip(&fields) {
        *slot = field.trim().parse().with_context(|| {
            format!("Invalid retention window. Expected dd:hh:mm, got: {}", window)
        })?;
        if *slot < 0 {
            anyhow::bail!("Retention window cannot be negative: {}", window);
        }
    }

    let [days, hours, minutes] = parsed;
    if hours >= 24 || minutes >= 60 {
        anyhow::bail!(
            "Invalid retention window. Hours must be < 24 and minutes < 60, got: {}",
            window
        );
    }

    TimeDelta::try_days(days)
        .and_then(|d| d.checked_add(&TimeDelta::hours(hours)))
        .and_then(|d| d.checked_add(&TimeDelta::minutes(minutes)))
        .with_context(|| format!("Retention window out of range: {}", window))
}
