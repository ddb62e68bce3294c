//! Word chunking for the stateless protocol.
//!
//! Protocol B has no native incremental channel, so the final answer is
//! split on single spaces and each chunk re-appends its trailing space
//! except the last. Rejoining the chunks reproduces the input exactly.

/// Split `text` into ordered word-sized chunks.
pub fn chunk_words(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let parts: Vec<&str> = text.split(' ').collect();
    let last = parts.len() - 1;
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            if i < last {
                format!("{part} ")
            } else {
                (*part).to_string()
            }
        })
        .collect()
}
