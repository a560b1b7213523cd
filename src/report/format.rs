//! Formatted terminal output for each analysis.
//!
//! We keep formatting code in one place so the numeric code stays clean and
//! output changes are localized.

use chrono::DateTime;

use crate::app::pipeline::{DecayRun, DeriveRun, EnergyRun, ShiftRun};
use crate::domain::{Series, TimeBase};
use crate::io::IngestedData;

/// Time stamps at or after 2001-09-09 are shown as UTC dates; smaller values
/// are treated as relative seconds.
const EPOCH_DISPLAY_THRESHOLD: f64 = 1.0e9;

/// Render a time stamp for humans.
pub fn format_time(t: f64) -> String {
    if t >= EPOCH_DISPLAY_THRESHOLD {
        let secs = t.floor();
        let nanos = ((t - secs) * 1e9).round().min(999_999_999.0) as u32;
        if let Some(dt) = DateTime::from_timestamp(secs as i64, nanos) {
            return dt.format("%Y-%m-%d %H:%M:%S UTC").to_string();
        }
    }
    format!("{t:.1} s")
}

/// Render a duration in seconds as `1h 02m 03s` (or plain seconds below a minute).
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() {
        return format!("{seconds}");
    }
    let sign = if seconds < 0.0 { "-" } else { "" };
    let abs = seconds.abs();
    if abs < 60.0 {
        return format!("{sign}{abs:.1}s");
    }
    let total = abs.round() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{sign}{h}h {m:02}m {s:02}s")
    } else {
        format!("{sign}{m}m {s:02}s")
    }
}

/// One line per series: name, unit, missing count, value range.
pub fn format_data_summary(ingest: &IngestedData) -> String {
    let data = &ingest.data;
    let mut out = String::new();

    out.push_str(&format!("=== psig - {} ===\n", data.name));
    out.push_str(&format!(
        "Rows: {} used of {} read ({} issues)\n",
        ingest.rows_used,
        ingest.rows_read,
        ingest.row_errors.len()
    ));
    if let Some((t0, t1)) = data.time().span() {
        out.push_str(&format!("Time: {} .. {}\n", format_time(t0), format_time(t1)));
    }
    if let Some(dt) = data.sampling_time() {
        out.push_str(&format!("Sampling time: {}\n", format_duration(dt)));
    }

    out.push_str("\nSeries:\n");
    for series in data.iter() {
        let range = series
            .bounds()
            .map(|(lo, hi)| format!("[{lo:.3}, {hi:.3}]"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "  {:<20} {:<5} missing={:<5} range={}\n",
            series.name,
            series.unit,
            series.missing_count(),
            range
        ));
    }
    out
}

pub fn format_shift(run: &ShiftRun) -> String {
    let mut out = String::new();
    out.push_str(&format!("Shift of '{}' behind '{}':\n", run.signal, run.reference));
    out.push_str(&format!("  lag:         {:+.3} samples\n", run.lag_samples));
    if let Some(secs) = run.lag_seconds {
        out.push_str(&format!("               {} ({secs:+.1} s)\n", format_duration(secs)));
    }
    match run.peak_correlation {
        Some(c) => out.push_str(&format!("  correlation: {c:.4}\n")),
        None => out.push_str("  correlation: outside lag window\n"),
    }
    out.push_str(&format!(
        "  window:      ±{} samples, search ±{:.2}\n",
        run.kernel_radius, run.search_radius
    ));

    out.push_str("\n  lag  correlation\n");
    for (lag, value) in run.correlation.lags.iter().zip(&run.correlation.values) {
        let marker = if (*lag as f64 - run.lag_samples).abs() < 0.5 { " <" } else { "" };
        out.push_str(&format!("  {lag:>3}  {value:>+10.4}{marker}\n"));
    }
    out
}

pub fn format_decay(run: &DecayRun) -> String {
    let fit = &run.fit;
    let mut out = String::new();
    out.push_str(&format!("Decay fit of '{}': y = a·e^(b·(t - t0)) + c\n", fit.series));
    out.push_str(&format!(
        "  window:     {} .. {} ({} samples)\n",
        format_time(fit.time_origin),
        format_time(fit.time_end),
        fit.samples_used
    ));
    out.push_str(&format!("  a = {:.6}\n", fit.params.amplitude));
    out.push_str(&format!("  b = {:.6e} 1/s\n", fit.params.rate));
    out.push_str(&format!("  c = {:.6}\n", fit.params.offset));
    out.push_str(&format!("  half-life:  {}\n", format_duration(fit.half_life)));
    out.push_str(&format!(
        "  rmse={:.4} iterations={} converged={}\n",
        fit.rmse, fit.iterations, fit.converged
    ));

    out.push_str("\n  time                     fitted\n");
    for (t, y) in &run.curve {
        out.push_str(&format!("  {:<24} {y:>12.4}\n", format_time(*t)));
    }
    out
}

pub fn format_derived(run: &DeriveRun, time: &TimeBase) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} = {} [{}]\n",
        run.series.name, run.formula, run.series.unit
    ));
    out.push_str(&format_series_table(&run.series, time));
    out
}

fn format_series_table(series: &Series, time: &TimeBase) -> String {
    time.as_slice()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let value = series
                .get(i)
                .map(|v| format!("{v:>12.4}"))
                .unwrap_or_else(|| format!("{:>12}", "-"));
            format!("  {:<24} {value}\n", format_time(*t))
        })
        .collect()
}

pub fn format_energy(run: &EnergyRun) -> String {
    let window = match run.window {
        Some((t0, t1)) => format!("{} .. {}", format_time(t0), format_time(t1)),
        None => "whole series".to_string(),
    };
    format!("Energy of '{}' ({window}): {:.4} kWh\n", run.series, run.kwh)
}
