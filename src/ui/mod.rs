pub mod chat_view;
pub mod department_view;
pub mod grades_view;
pub mod login;
pub mod schedule_table;
pub mod sidebar;

use crate::conversations::parse_timestamp;

/// `YYYY-MM-DD HH:MM` in UTC, or the raw text when it does not parse.
pub fn format_time(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}
