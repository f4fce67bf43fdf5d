//! Placeholder expansion for manifest values

use std::sync::LazyLock;

use regex::Regex;

use crate::TargetVersion;

static BASE_FOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\(BaseFolder\)|\$BaseFolder").unwrap());

/// Replace `$BaseFolder` (or `$(BaseFolder)`) with `base_folder`.
pub fn expand_base_folder(value: &str, base_folder: &str) -> String {
    BASE_FOLDER
        .replace_all(value, regex::NoExpand(base_folder))
        .into_owned()
}

/// Render a `LibSuffix` template for `target`.
///
/// `%d` and `%s` become the bare version number, `%%` a literal percent
/// sign; any other `%` sequence is kept as written.
pub fn format_lib_suffix(template: &str, target: TargetVersion) -> String {
    let mut out = String::with_capacity(template.len() + 4);
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('d') | Some('s') => {
                chars.next();
                out.push_str(&target.number().to_string());
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }
    out
}
