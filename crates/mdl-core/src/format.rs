//! Human-readable formatting: byte counts, transfer rates, ETA strings.
//!
//! All functions are pure; the progress renderer composes them into its
//! per-task and aggregate lines.

/// ETA rendering precision. The aggregate line uses [`Eta::Coarse`]
/// (minute granularity), per-task lines use [`Eta::Fine`] (seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eta {
    Coarse,
    Fine,
}

/// Formats a transfer rate with a fixed 6-wide, 2-decimal numeric field.
///
/// Negative rates (no sample yet) render as `--- B/s`.
pub fn format_speed(bps: f64) -> String {
    if bps < 0.0 {
        return "--- B/s".to_string();
    }
    if bps < 1024.0 {
        format!("{:6.2} B/s", bps)
    } else if bps < 1024.0 * 1024.0 {
        format!("{:6.2} KB/s", bps / 1024.0)
    } else {
        format!("{:6.2} MB/s", bps / (1024.0 * 1024.0))
    }
}

/// Formats a byte count with one decimal and a binary-scaled unit.
pub fn format_bytes(n: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Estimates time remaining for `total - current` bytes at `speed_bps`.
///
/// Returns `N/A` when the rate is unusable, the total is unknown, or the
/// transfer is already at (or past) the total.
pub fn format_eta(speed_bps: f64, total: i64, current: i64, precision: Eta) -> String {
    if speed_bps <= 0.0 || total <= 0 || current >= total {
        return "N/A".to_string();
    }
    let remaining = (total - current) as f64 / speed_bps;
    match precision {
        Eta::Coarse => format_eta_coarse(remaining),
        Eta::Fine => format_eta_fine(remaining),
    }
}

fn format_eta_coarse(secs: f64) -> String {
    if secs < 60.0 {
        return "<1 min".to_string();
    }
    if secs < 3600.0 {
        let mut mins = (secs / 60.0).round() as u64;
        if mins >= 60 {
            return "1 hr 0 min".to_string();
        }
        if mins == 0 {
            mins = 1;
        }
        return format!("{} min", mins);
    }
    let mut hrs = (secs / 3600.0).floor() as u64;
    let mut mins = ((secs % 3600.0) / 60.0).round() as u64;
    if mins == 60 {
        hrs += 1;
        mins = 0;
    }
    format!("{} hr {} min", hrs, mins)
}

fn format_eta_fine(secs: f64) -> String {
    if secs < 1.0 {
        return "<1 sec".to_string();
    }
    if secs < 60.0 {
        let s = secs.round() as u64;
        if s >= 60 {
            return "1 min 0 sec".to_string();
        }
        return format!("{} sec", s);
    }
    if secs < 3600.0 {
        let mut mins = (secs / 60.0).floor() as u64;
        let mut s = (secs % 60.0).round() as u64;
        if s == 60 {
            mins += 1;
            s = 0;
        }
        if mins >= 60 {
            return "1 hr 0 min 0 sec".to_string();
        }
        return format!("{} min {} sec", mins, s);
    }
    let mut hrs = (secs / 3600.0).floor() as u64;
    let mut mins = ((secs % 3600.0) / 60.0).floor() as u64;
    let mut s = (secs % 60.0).round() as u64;
    if s == 60 {
        mins += 1;
        s = 0;
    }
    if mins == 60 {
        hrs += 1;
        mins = 0;
    }
    format!("{} hr {} min {} sec", hrs, mins, s)
}

/// Truncates `msg` to `max` characters, replacing the tail with `…`.
/// Used to keep error details inside one terminal row.
pub fn shorten(msg: &str, max: usize) -> String {
    if msg.chars().count() <= max {
        return msg.to_string();
    }
    let head: String = msg.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", head)
}
