//! Manifest text parser
//!
//! Parsing happens in two passes: the text is first split into raw sections
//! of `key=value` entries (catching structural problems with exact line
//! numbers), then each section is interpreted as either the options record
//! or a package definition.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::list::{parse_list, unquote};
use crate::model::{
    ActionKind, ExecuteEntry, Installable, Manifest, Options, PackageDefinition, SourceRef,
    TargetArtifacts, TargetVersion,
};
use crate::{Error, ParseError, Result};
use setup_fs::NormalizedPath;

/// Name of the global options section
pub const OPTIONS_SECTION: &str = "Options";

static TARGET_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[dD](\d+)(\+)?$").unwrap());
static EXECUTE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)execute(\d+)$").unwrap());

struct RawEntry {
    key: String,
    value: String,
    line: usize,
}

struct RawSection {
    name: String,
    line: usize,
    entries: Vec<RawEntry>,
}

impl RawSection {
    fn get(&self, key: &str) -> Option<&RawEntry> {
        self.entries.iter().find(|e| e.key.eq_ignore_ascii_case(key))
    }

    fn error(&self, entry: &RawEntry, message: impl Into<String>) -> ParseError {
        ParseError::new(message)
            .at_line(entry.line)
            .in_section(&self.name)
            .for_key(&entry.key)
    }

    fn require(&self, key: &str) -> std::result::Result<&RawEntry, ParseError> {
        match self.get(key) {
            Some(entry) if !unquote(&entry.value).is_empty() => Ok(entry),
            Some(entry) => Err(self.error(entry, "value must not be empty")),
            None => Err(ParseError::new(format!("missing required key '{key}'"))
                .at_line(self.line)
                .in_section(&self.name)
                .for_key(key)),
        }
    }

    fn list(&self, key: &str) -> std::result::Result<Vec<String>, ParseError> {
        match self.get(key) {
            Some(entry) => parse_list(&entry.value).map_err(|msg| self.error(entry, msg)),
            None => Ok(Vec::new()),
        }
    }

    fn optional_scalar(&self, key: &str) -> Option<(&RawEntry, String)> {
        self.get(key)
            .map(|entry| (entry, unquote(&entry.value).to_string()))
            .filter(|(_, value)| !value.is_empty())
    }
}

/// Manifests are hand-written; anything larger is almost certainly the wrong file.
pub const MAX_MANIFEST_BYTES: u64 = 4 * 1024 * 1024;

impl Manifest {
    /// Read and parse a manifest file.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let native = path.to_native();
        let size = std::fs::metadata(&native)
            .map_err(|e| setup_fs::Error::io(&native, e))?
            .len();
        if size > MAX_MANIFEST_BYTES {
            return Err(Error::ManifestTooLarge {
                path: native,
                size,
                max: MAX_MANIFEST_BYTES,
            });
        }

        let text = setup_fs::io::read_text(path)?;
        parse(&text).map_err(|source| Error::Parse {
            path: native,
            source,
        })
    }
}

/// Parse manifest text into options and packages in declared order.
pub fn parse(text: &str) -> std::result::Result<Manifest, ParseError> {
    let sections = split_sections(text)?;

    let mut manifest = Manifest::default();
    for section in &sections {
        if section.name.eq_ignore_ascii_case(OPTIONS_SECTION) {
            manifest.options = parse_options(section)?;
        } else {
            manifest.packages.push(parse_package(section)?);
        }
    }

    tracing::debug!(packages = manifest.packages.len(), "Parsed manifest");
    Ok(manifest)
}

fn split_sections(text: &str) -> std::result::Result<Vec<RawSection>, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut sections: Vec<RawSection> = Vec::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let name = rest
                .strip_suffix(']')
                .ok_or_else(|| ParseError::new("unterminated section header").at_line(line_no))?
                .trim();
            if name.is_empty() {
                return Err(ParseError::new("empty section name").at_line(line_no));
            }
            if let Some(existing) = sections.iter().find(|s| s.name.eq_ignore_ascii_case(name)) {
                return Err(ParseError::new(format!(
                    "duplicate section (first declared on line {})",
                    existing.line
                ))
                .at_line(line_no)
                .in_section(name));
            }
            sections.push(RawSection {
                name: name.to_string(),
                line: line_no,
                entries: Vec::new(),
            });
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            let err = ParseError::new(format!("expected 'key=value', found '{line}'")).at_line(line_no);
            return Err(match sections.last() {
                Some(section) => err.in_section(&section.name),
                None => err,
            });
        };
        let key = key.trim();

        let Some(section) = sections.last_mut() else {
            return Err(ParseError::new("key outside of any section")
                .at_line(line_no)
                .for_key(key));
        };
        if key.is_empty() {
            return Err(ParseError::new("empty key")
                .at_line(line_no)
                .in_section(&section.name));
        }
        if let Some(existing) = section.get(key) {
            return Err(ParseError::new(format!(
                "duplicate key (first set on line {})",
                existing.line
            ))
            .at_line(line_no)
            .in_section(&section.name)
            .for_key(key));
        }
        section.entries.push(RawEntry {
            key: key.to_string(),
            value: value.trim().to_string(),
            line: line_no,
        });
    }

    Ok(sections)
}

fn parse_options(section: &RawSection) -> std::result::Result<Options, ParseError> {
    let mut options = Options::default();

    for entry in &section.entries {
        let value = unquote(&entry.value);
        match entry.key.to_ascii_lowercase().as_str() {
            "minimumideversion" if !value.is_empty() => {
                options.minimum_ide_version =
                    Some(value.parse().map_err(|msg: String| section.error(entry, msg))?);
            }
            "defaultide" if !value.is_empty() => {
                options.default_ide =
                    Some(value.parse().map_err(|msg: String| section.error(entry, msg))?);
            }
            "defaultdestfolder" if !value.is_empty() => {
                options.default_dest_folder = Some(value.to_string());
            }
            "autostart" => {
                options.auto_start = match value {
                    "" | "0" => false,
                    "1" => true,
                    other => {
                        return Err(section.error(entry, format!("expected 0 or 1, found '{other}'")));
                    }
                };
            }
            "minimumideversion" | "defaultide" | "defaultdestfolder" => {}
            other => tracing::debug!(section = %section.name, key = other, "Ignoring unknown option"),
        }
    }

    Ok(options)
}

fn parse_package(section: &RawSection) -> std::result::Result<PackageDefinition, ParseError> {
    let name = unquote(&section.require("Name")?.value).to_string();
    let primary = unquote(&section.require("Git")?.value).to_string();
    let folder_entry = section.require("Folder")?;
    let folder = unquote(&folder_entry.value).to_string();
    setup_fs::validate_relative_folder(&folder)
        .map_err(|e| section.error(folder_entry, e.to_string()))?;

    let upstream = section.optional_scalar("Upstream").map(|(_, v)| v);
    let lib_suffix = section.optional_scalar("LibSuffix").map(|(_, v)| v);

    let installable = match section.optional_scalar("Installable") {
        Some((entry, value)) => Installable::from_code(&value).ok_or_else(|| {
            section.error(entry, format!("expected 0, 1 or 2, found '{value}'"))
        })?,
        None => Installable::default(),
    };

    let group_index = match section.optional_scalar("GroupIndex") {
        Some((entry, value)) => Some(value.parse::<u32>().map_err(|_| {
            section.error(entry, format!("expected a non-negative integer, found '{value}'"))
        })?),
        None => None,
    };

    let mut artifacts = BTreeMap::new();
    for entry in &section.entries {
        let Some(caps) = TARGET_KEY.captures(&entry.key) else {
            continue;
        };
        let version: u16 = caps[1]
            .parse()
            .map_err(|_| section.error(entry, "target version out of range"))?;
        let version = TargetVersion::new(version);
        let list = parse_list(&entry.value).map_err(|msg| section.error(entry, msg))?;
        let declared = TargetArtifacts {
            at_least: caps.get(2).is_some(),
            artifacts: list,
        };
        if artifacts.insert(version, declared).is_some() {
            return Err(section.error(entry, format!("target {version} declared more than once")));
        }
    }

    let search_paths = section.list("SearchPath")?;
    if let Some(entry) = section.get("SearchPath") {
        for path in &search_paths {
            setup_fs::validate_search_path(path).map_err(|e| section.error(entry, e.to_string()))?;
        }
    }

    let execute = parse_execute_list(section)?;

    for entry in &section.entries {
        let key = entry.key.to_ascii_lowercase();
        let known = matches!(
            key.as_str(),
            "name"
                | "git"
                | "upstream"
                | "folder"
                | "searchpath"
                | "includes"
                | "installable"
                | "libsuffix"
                | "groupindex"
                | "executecount"
        ) || TARGET_KEY.is_match(&entry.key)
            || EXECUTE_KEY.is_match(&entry.key);
        if !known {
            tracing::debug!(section = %section.name, key = %entry.key, "Ignoring unknown key");
        }
    }

    Ok(PackageDefinition {
        section: section.name.clone(),
        name,
        source: SourceRef { primary, upstream },
        folder,
        search_paths,
        include_paths: section.list("Includes")?,
        artifacts,
        installable,
        lib_suffix,
        group_index,
        execute,
    })
}

fn parse_execute_list(section: &RawSection) -> std::result::Result<Vec<ExecuteEntry>, ParseError> {
    let mut declared: BTreeMap<usize, &RawEntry> = BTreeMap::new();
    for entry in &section.entries {
        if let Some(caps) = EXECUTE_KEY.captures(&entry.key) {
            let index = caps[1]
                .parse::<usize>()
                .map_err(|_| section.error(entry, "invalid action index"))?;
            if declared.insert(index, entry).is_some() {
                return Err(section.error(entry, format!("action {index} declared more than once")));
            }
        }
    }

    let count = match section.optional_scalar("ExecuteCount") {
        Some((entry, value)) => value.parse::<usize>().map_err(|_| {
            section.error(entry, format!("expected a non-negative integer, found '{value}'"))
        })?,
        None => 0,
    };

    if let Some((&index, entry)) = declared.iter().find(|(i, _)| **i == 0 || **i > count) {
        return Err(section.error(
            entry,
            format!("action {index} is outside ExecuteCount={count}"),
        ));
    }

    (1..=count)
        .map(|index| {
            let entry = declared.get(&index).ok_or_else(|| {
                ParseError::new(format!("ExecuteCount={count} but Execute{index} is missing"))
                    .at_line(section.line)
                    .in_section(&section.name)
                    .for_key(format!("Execute{index}"))
            })?;
            parse_execute_entry(section, entry)
        })
        .collect()
}

fn parse_execute_entry(
    section: &RawSection,
    entry: &RawEntry,
) -> std::result::Result<ExecuteEntry, ParseError> {
    let tokens = parse_list(&entry.value).map_err(|msg| section.error(entry, msg))?;
    let mut tokens = tokens.into_iter();

    let kind: ActionKind = tokens
        .next()
        .ok_or_else(|| section.error(entry, "missing action"))?
        .parse()
        .map_err(|msg: String| section.error(entry, msg))?;
    let origin = tokens
        .next()
        .filter(|o| !o.trim().is_empty())
        .ok_or_else(|| section.error(entry, format!("{kind} requires an origin")))?;
    let destination = tokens.next().filter(|d| !d.trim().is_empty());
    if tokens.next().is_some() {
        return Err(section.error(entry, "too many values (expected action, origin, destination)"));
    }

    match (kind, destination) {
        (ActionKind::Delete, None) => Ok(ExecuteEntry::Delete { origin }),
        (ActionKind::Delete, Some(_)) => Err(section.error(entry, "Delete takes no destination")),
        (ActionKind::Copy, Some(destination)) => Ok(ExecuteEntry::Copy { origin, destination }),
        (ActionKind::CopyAndRun, Some(destination)) => {
            Ok(ExecuteEntry::CopyAndRun { origin, destination })
        }
        (kind, None) => Err(section.error(entry, format!("{kind} requires a destination"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_is_ignored() {
        let manifest = parse("\u{feff}[Options]\nAutoStart=1\n").unwrap();
        assert!(manifest.options.auto_start);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let text = "; comment\n# another\n\n[Options]\n; inside\nDefaultIDE=D29\n";
        let manifest = parse(text).unwrap();
        assert_eq!(manifest.options.default_ide, Some(TargetVersion::new(29)));
    }

    #[test]
    fn key_before_section_is_rejected() {
        let err = parse("Name=x\n").unwrap_err();
        assert_eq!(err.line, Some(1));
        assert_eq!(err.key.as_deref(), Some("Name"));
    }

    #[test]
    fn delete_with_destination_is_rejected() {
        let text = "[P]\nName=p\nGit=g\nFolder=f\nExecuteCount=1\nExecute1=Delete, \"a\", \"b\"\n";
        let err = parse(text).unwrap_err();
        assert_eq!(err.key.as_deref(), Some("Execute1"));
    }
}
