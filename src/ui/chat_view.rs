use std::fmt::Write;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::api::models::{Conversation, UserId};
use crate::ui::format_time;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid regex"));

/// Wrap bare links in angle brackets so terminals pick them up.
pub fn mark_links(text: &str) -> String {
    URL_RE.replace_all(text, "<$0>").into_owned()
}

/// The whole thread, oldest first. Own messages are prefixed with `>`.
pub fn render_thread(conv: &Conversation, current_user: UserId) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} <{}>", conv.other_user_name, conv.other_user_email);
    for msg in &conv.messages {
        let (marker, who) = if msg.sender_id == current_user {
            (">", "me")
        } else {
            (" ", msg.sender_full_name.as_str())
        };
        let _ = writeln!(out, "{} {} {}: {}", marker, format_time(&msg.created_at), who, mark_links(&msg.message));
    }
    out
}
