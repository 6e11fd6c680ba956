use std::fmt::Write;

use crate::api::models::Conversation;
use crate::ui::format_time;

const PREVIEW_LEN: usize = 40;

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > PREVIEW_LEN {
        let cut: String = flat.chars().take(PREVIEW_LEN).collect();
        format!("{cut}…")
    } else {
        flat
    }
}

/// One line per conversation, most recent first.
pub fn render_conversations(items: &[Conversation]) -> String {
    if items.is_empty() {
        return "No messages.\n".to_string();
    }
    let mut out = String::new();
    for conv in items {
        let (when, last) = conv
            .last_message()
            .map(|m| (format_time(&m.created_at), preview(&m.message)))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "[{}] {} <{}>  {} msg  {}  {}",
            conv.other_user_id,
            conv.other_user_name,
            conv.other_user_email,
            conv.messages.len(),
            when,
            last
        );
    }
    out
}
