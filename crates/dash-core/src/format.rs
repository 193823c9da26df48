//! Display labels for timeline rows, due dates and the logout countdown.

use chrono::NaiveDate;

/// Formats a duration in minutes as `"1h 30m"`, `"2h"` or `"45m"`.
/// Negative durations are shown as `"0m"`.
pub fn format_duration_minutes(minutes: i64) -> String {
    if minutes <= 0 {
        return "0m".to_string();
    }
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// Relative label for a due date.
pub fn due_label(due: NaiveDate, today: NaiveDate) -> String {
    match (due - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Overdue by 1 day".to_string(),
        n if n < 0 => format!("Overdue by {} days", -n),
        n => format!("In {n} days"),
    }
}

/// Heading for a day bucket, e.g. `"Tomorrow · Tue, Oct 20"`.
pub fn day_header(date: NaiveDate, today: NaiveDate) -> String {
    let short = date.format("%a, %b %-d").to_string();
    match (date - today).num_days() {
        0 => format!("Today · {short}"),
        1 => format!("Tomorrow · {short}"),
        _ => short,
    }
}

/// Countdown shown in the inactivity warning, `m:ss`.
pub fn countdown_label(remaining_secs: u64) -> String {
    format!("{}:{:02}", remaining_secs / 60, remaining_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn duration_labels() {
        assert_eq!(format_duration_minutes(-5), "0m");
        assert_eq!(format_duration_minutes(45), "45m");
        assert_eq!(format_duration_minutes(120), "2h");
        assert_eq!(format_duration_minutes(90), "1h 30m");
    }

    #[test]
    fn due_labels_relative_to_today() {
        let today = date(19);
        assert_eq!(due_label(date(19), today), "Today");
        assert_eq!(due_label(date(20), today), "Tomorrow");
        assert_eq!(due_label(date(23), today), "In 4 days");
        assert_eq!(due_label(date(18), today), "Overdue by 1 day");
        assert_eq!(due_label(date(12), today), "Overdue by 7 days");
    }

    #[test]
    fn day_headers() {
        let today = date(19);
        assert_eq!(day_header(date(19), today), "Today · Mon, Oct 19");
        assert_eq!(day_header(date(20), today), "Tomorrow · Tue, Oct 20");
        assert_eq!(day_header(date(21), today), "Wed, Oct 21");
    }

    #[test]
    fn countdown_pads_seconds() {
        assert_eq!(countdown_label(300), "5:00");
        assert_eq!(countdown_label(59), "0:59");
        assert_eq!(countdown_label(3), "0:03");
    }
}
