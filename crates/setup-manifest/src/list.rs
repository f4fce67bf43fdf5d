//! Quoted, comma-separated list values
//!
//! `"Source", "", Packages` parses to `["Source", "", "Packages"]`. Quoted
//! elements keep their inner whitespace and may contain commas; bare
//! elements are trimmed. An empty value is an empty list.

use std::borrow::Cow;

/// Parse a list value. Errors describe the problem without location; the
/// caller attaches the line and key.
pub fn parse_list(value: &str) -> Result<Vec<String>, String> {
    let mut items = Vec::new();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(items);
    }

    let mut chars = trimmed.char_indices().peekable();
    loop {
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        match chars.peek() {
            Some((_, '"')) => {
                chars.next();
                let mut item = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '"' {
                        closed = true;
                        break;
                    }
                    item.push(c);
                }
                if !closed {
                    return Err("unterminated quoted value".to_string());
                }
                items.push(item);
                while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
                match chars.next() {
                    None => break,
                    Some((_, ',')) => continue,
                    Some((idx, c)) => {
                        return Err(format!(
                            "expected ',' after quoted value, found '{c}' at column {}",
                            idx + 1
                        ));
                    }
                }
            }
            _ => {
                let mut item = String::new();
                let mut ended_by_comma = false;
                for (_, c) in chars.by_ref() {
                    if c == ',' {
                        ended_by_comma = true;
                        break;
                    }
                    if c == '"' {
                        return Err("unexpected '\"' inside unquoted value".to_string());
                    }
                    item.push(c);
                }
                items.push(item.trim().to_string());
                if !ended_by_comma {
                    break;
                }
            }
        }
    }

    Ok(items)
}

/// Format a list value so that [`parse_list`] returns the same elements.
pub fn format_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a scalar value so that [`unquote`] returns it unchanged.
///
/// Only values that would otherwise lose a pair of quotes are quoted.
pub fn quote_scalar(value: &str) -> Cow<'_, str> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Cow::Owned(format!("\"{value}\""))
    } else {
        Cow::Borrowed(value)
    }
}

/// Strip one pair of surrounding double quotes from a scalar value.
pub fn unquote(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed)
}
