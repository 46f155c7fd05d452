//! Key/value summary mining.
//!
//! A line yields a field when it contains `Key: value`, where the key is a run
//! of ASCII letters and spaces directly before the colon.

use std::collections::BTreeMap;

/// Mine `Key: value` pairs line by line. Later lines overwrite earlier keys.
pub fn mine_key_values(text: &str, max_key: usize, max_value: usize) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    for line in text.lines() {
        if let Some((key, value)) = split_line(line) {
            let key_len = key.chars().count();
            let value_len = value.chars().count();
            if (1..=max_key).contains(&key_len) && (1..=max_value).contains(&value_len) {
                fields.insert(key.to_string(), value.to_string());
            }
        }
    }
    fields
}

/// Find the earliest usable colon and return the trimmed key and value.
///
/// A colon is usable when at least one key character precedes it and at
/// least one character of any kind follows it.
fn split_line(line: &str) -> Option<(&str, &str)> {
    let bytes = line.as_bytes();
    for (colon, _) in line.match_indices(':') {
        if colon + 1 >= bytes.len() {
            continue;
        }
        let key_start = bytes[..colon]
            .iter()
            .rposition(|b| !is_key_byte(*b))
            .map_or(0, |i| i + 1);
        if key_start == colon {
            continue;
        }
        return Some((line[key_start..colon].trim(), line[colon + 1..].trim()));
    }
    None
}

fn is_key_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b' '
}
