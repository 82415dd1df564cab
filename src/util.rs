//! Shared utility functions for review-gate.

/// Append `item` unless it is already present, keeping first-seen order.
pub fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

/// Concatenate two lists and drop duplicates, keeping first-seen order.
pub fn concat_unique(first: &[String], second: &[String]) -> Vec<String> {
    let mut merged = Vec::with_capacity(first.len() + second.len());
    for item in first.iter().chain(second) {
        push_unique(&mut merged, item);
    }
    merged
}

/// Render a login as a GitHub mention.
pub fn to_handle(login: &str) -> String {
    format!("@{}", login)
}
