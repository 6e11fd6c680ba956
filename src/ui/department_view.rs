use std::fmt::Write;

use crate::api::models::{DepartmentMessage, UserId};
use crate::ui::chat_view::mark_links;
use crate::ui::format_time;

/// Department posts in the order the server sent them. Own posts are prefixed with `>`.
pub fn render_department_messages(messages: &[DepartmentMessage], current_user: UserId) -> String {
    if messages.is_empty() {
        return "Nincs üzenet ebben az intézményben.\n".to_string();
    }
    let mut out = String::new();
    for m in messages {
        let marker = if m.sender_id == Some(current_user) { ">" } else { " " };
        let _ = writeln!(
            out,
            "{} {} {}: {}",
            marker,
            format_time(&m.created_at),
            m.sender_full_name,
            mark_links(&m.text)
        );
    }
    out
}
