use chrono::{DateTime, Utc};

/// Placeholder for articles without a usable publication date.
pub const UNKNOWN_DATE: &str = "Unknown date";

/// Short relative age for list rows: "5m", "3h", "2d", or "May 01" once
/// older than a week.
pub fn format_relative_time(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(ts) = published else {
        return String::new();
    };

    let diff = (now - ts).num_seconds();

    // Clock skew between backend and terminal
    if diff < 0 {
        return "now".to_string();
    }
    if diff < 3600 {
        return format!("{}m", diff / 60);
    }
    if diff < 86400 {
        return format!("{}h", diff / 3600);
    }
    if diff < 604800 {
        return format!("{}d", diff / 86400);
    }
    ts.format("%b %d").to_string()
}

/// Card date, e.g. "May 1, 2024".
pub fn format_card_date(published: Option<DateTime<Utc>>) -> String {
    published
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

/// Detail-page date, e.g. "May 01, 2024 14:05".
pub fn format_long_date(published: Option<DateTime<Utc>>) -> String {
    published
        .map(|dt| dt.format("%B %d, %Y %H:%M").to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}
