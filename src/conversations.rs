//! Grouping of a flat message list into one conversation per counterpart.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::api::models::{Conversation, Message, UserId};

/// Parse a backend timestamp. `None` for anything unparseable; callers order
/// `None` before every real timestamp.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn sort_key(msg: &Message) -> Option<DateTime<Utc>> {
    parse_timestamp(&msg.created_at)
}

/// The participant of `msg` who is not `current_user`.
pub fn counterpart(msg: &Message, current_user: UserId) -> UserId {
    if msg.sender_id == current_user { msg.receiver_id } else { msg.sender_id }
}

/// Group `messages` by counterpart of `current_user`.
///
/// The counterpart's name and email come from the first message seen for that
/// counterpart (input order) and are not refreshed from later messages.
/// Messages are ascending by `created_at` inside a conversation; conversations
/// are descending by their latest message.
pub fn group_conversations(messages: &[Message], current_user: UserId) -> Vec<Conversation> {
    let mut order: Vec<UserId> = Vec::new();
    let mut buckets: HashMap<UserId, Vec<Message>> = HashMap::new();
    for msg in messages {
        let other = counterpart(msg, current_user);
        buckets
            .entry(other)
            .or_insert_with(|| {
                order.push(other);
                Vec::new()
            })
            .push(msg.clone());
    }

    let mut conversations: Vec<Conversation> = order
        .into_iter()
        .filter_map(|other| {
            let mut msgs = buckets.remove(&other)?;
            let first = msgs.first()?;
            let (name, email) = if first.sender_id == current_user {
                (first.receiver_full_name.clone(), first.receiver_email.clone())
            } else {
                (first.sender_full_name.clone(), first.sender_email.clone())
            };
            msgs.sort_by_cached_key(sort_key);
            Some(Conversation {
                other_user_id: other,
                other_user_name: name,
                other_user_email: email,
                messages: msgs,
                unread_count: 0,
            })
        })
        .collect();

    conversations.sort_by_cached_key(|c| std::cmp::Reverse(c.last_message().and_then(sort_key)));
    log::debug!("grouped {} messages into {} conversations", messages.len(), conversations.len());
    conversations
}
