const METERS_PER_MILE: f64 = 1_609.344;

/// "5.0 km (3.1 mi)". One decimal below 10 units, none above.
pub fn format_distance(meters: f64) -> String {
    if !meters.is_finite() || meters <= 0.0 {
        return "Unknown".to_string();
    }
    let km = meters / 1000.0;
    let mi = meters / METERS_PER_MILE;
    let kp = if km >= 10.0 { 0 } else { 1 };
    let mp = if mi >= 10.0 { 0 } else { 1 };
    format!("{km:.kp$} km ({mi:.mp$} mi)")
}

/// "25 mins", "1 hr 5 mins", "2 hr". Anything positive is at least a minute.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "Unknown".to_string();
    }
    let total = (seconds / 60.0).round() as u64;
    if total < 60 {
        return format!("{} mins", total.max(1));
    }
    let (h, m) = (total / 60, total % 60);
    if m > 0 {
        format!("{h} hr {m} mins")
    } else {
        format!("{h} hr")
    }
}

/// Seconds needed to cover `meters` at `pace_min_per_km`.
pub fn paced_seconds(meters: f64, pace_min_per_km: f64) -> Option<f64> {
    (meters.is_finite() && meters > 0.0).then(|| meters / 1000.0 * pace_min_per_km * 60.0)
}

pub fn truncate_ellipsis(s: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width - 1).collect();
    out.push('…');
    out
}

pub fn print_kv_block_colored_keys<F>(pairs: &[(&str, String)], color_key: F)
where
    F: Fn(&str) -> String,
{
    let key_w = pairs
        .iter()
        .map(|(k, _)| k.chars().count())
        .max()
        .unwrap_or(0);

    for (k, v) in pairs {
        let key_col = color_key(&format!("{k:>key_w$}"));

        let mut lines = v.trim_end_matches('\n').lines();
        println!("{}: {}", key_col, lines.next().unwrap_or(""));
        for line in lines {
            println!("{:>key_w$}  {}", "", line);
        }
    }
}
