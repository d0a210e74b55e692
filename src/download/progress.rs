use rand::Rng;
use std::time::Duration;

/// Placeholder shown while the remaining time cannot be estimated.
pub const ETA_UNKNOWN: &str = "unknown";

const SIZE_UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
const SPEED_UNITS: &[&str] = &["Bps", "KBps", "MBps", "GBps"];
const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Format a byte count with binary units and two decimals, e.g. `1.50 KiB`.
pub fn human_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, SIZE_UNITS[unit_index])
}

/// Average throughput in bytes per second since the transfer started.
pub fn calculate_speed(downloaded: u64, elapsed: Duration) -> f64 {
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
    if elapsed_ms <= 0.0 {
        return 0.0;
    }

    (downloaded as f64 * 8000.0 / elapsed_ms) / 8.0
}

pub fn format_speed(bytes_per_second: f64) -> String {
    let mut speed = if bytes_per_second.is_finite() && bytes_per_second > 0.0 {
        bytes_per_second
    } else {
        0.0
    };
    let mut unit_index = 0;

    while speed >= 1024.0 && unit_index < SPEED_UNITS.len() - 1 {
        speed /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", speed, SPEED_UNITS[unit_index])
}

/// Percentage of `total` covered by `downloaded`, rounded and clamped to 100.
///
/// An unknown total (0) always reports 0.
pub fn calculate_progress(downloaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }

    let percent = (downloaded as f64 / total as f64 * 100.0).round();
    percent.min(100.0) as u8
}

/// Remaining time extrapolated from the elapsed time and the completed ratio.
///
/// Returns `None` when nothing was downloaded yet, the total is unknown, or the
/// estimate does not fit in a `Duration`.
pub fn estimate_remaining(elapsed: Duration, downloaded: u64, total: u64) -> Option<Duration> {
    if downloaded == 0 || total == 0 {
        return None;
    }

    let elapsed = elapsed.as_secs_f64();
    let remaining = elapsed * (total as f64 / downloaded as f64) - elapsed;
    Duration::try_from_secs_f64(remaining.max(0.0)).ok()
}

/// Format a duration as `HH:MM:SS`, prefixed by the day count past 24 hours.
pub fn format_eta(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let clock = format!("{:02}:{:02}:{:02}", hours, minutes, seconds);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}

pub fn eta_string(elapsed: Duration, downloaded: u64, total: u64) -> String {
    estimate_remaining(elapsed, downloaded, total)
        .map(format_eta)
        .unwrap_or_else(|| ETA_UNKNOWN.to_string())
}

/// Compact duration such as `1d2h3m4s`; zero components are omitted except seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut result = String::new();
    if days > 0 {
        result.push_str(&format!("{}d", days));
    }
    if hours > 0 {
        result.push_str(&format!("{}h", hours));
    }
    if minutes > 0 {
        result.push_str(&format!("{}m", minutes));
    }
    result.push_str(&format!("{}s", seconds));
    result
}

/// Random identifier drawn from uppercase ASCII letters and digits.
pub fn gen_id(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}
