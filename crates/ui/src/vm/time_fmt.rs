use chrono::{DateTime, Utc};

#[must_use]
pub fn format_date(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// Due-date label relative to `now`, in whole days.
#[must_use]
pub fn format_due(due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(due) = due else {
        return "No due date".into();
    };
    let days = (due.date_naive() - now.date_naive()).num_days();
    match days {
        0 => "Due today".into(),
        1 => "Due tomorrow".into(),
        d if d > 1 => format!("Due in {d} days"),
        -1 => "Overdue by 1 day".into(),
        d => format!("Overdue by {} days", -d),
    }
}
