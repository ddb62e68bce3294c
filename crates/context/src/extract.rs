//! Identity extraction from free text.
//!
//! The voice front end has no state channel, so it prepends lines like
//! `ID: user_123` to a system message. Labels are matched
//! case-insensitively, first occurrence per label wins, and the value
//! runs to the end of the line.

use questline_core::session::EffectiveUser;

const LABELS: [(&str, Field); 3] = [
    ("id:", Field::Id),
    ("name:", Field::Name),
    ("email:", Field::Email),
];

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Id,
    Name,
    Email,
}

/// Extract identity fields from raw text. Returns an empty user when no
/// label matches.
pub fn extract_identity(text: &str) -> EffectiveUser {
    let mut user = EffectiveUser::default();

    for line in text.lines() {
        for (label, field) in LABELS {
            let slot = match field {
                Field::Id => &mut user.id,
                Field::Name => &mut user.name,
                Field::Email => &mut user.email,
            };
            if slot.is_some() {
                continue;
            }
            if let Some(value) = match_label(line, label) {
                *slot = Some(value);
            }
        }
    }

    user
}

/// Find `label` in `line` (case-insensitive, not inside another word) and
/// return the trimmed remainder of the line.
fn match_label(line: &str, label: &str) -> Option<String> {
    let lower = line.to_lowercase();
    // Offsets into `lower` are only valid in `line` when lowercasing
    // kept the byte length; skip the rare lines where it did not.
    if lower.len() != line.len() {
        return None;
    }
    let mut search_from = 0;
    while let Some(rel) = lower[search_from..].find(label) {
        let at = search_from + rel;
        let preceded_ok = at == 0
            || !lower[..at]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        if preceded_ok {
            let value = line[at + label.len()..].trim();
            if value.is_empty() {
                return None;
            }
            return Some(value.to_string());
        }
        search_from = at + label.len();
    }
    None
}
