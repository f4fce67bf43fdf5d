//! Manifest serialization
//!
//! Writes the options section first, then packages in manifest order. List
//! values are always re-quoted so that parsing the output yields the same
//! manifest.

use std::fmt::Write as _;

use setup_fs::NormalizedPath;

use crate::list::{format_list, quote_scalar};
use crate::model::{ExecuteEntry, Installable, Manifest, Options, PackageDefinition};
use crate::parser::OPTIONS_SECTION;
use crate::Result;

impl Manifest {
    /// Render the manifest as INI text.
    pub fn to_ini_string(&self) -> String {
        let mut out = String::new();
        write_options(&mut out, &self.options);
        for package in &self.packages {
            if !out.is_empty() {
                out.push('\n');
            }
            write_package(&mut out, package);
        }
        out
    }

    /// Write the manifest to `path` atomically.
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        setup_fs::io::write_text(path, &self.to_ini_string())?;
        Ok(())
    }
}

fn write_options(out: &mut String, options: &Options) {
    if *options == Options::default() {
        return;
    }
    let _ = writeln!(out, "[{OPTIONS_SECTION}]");
    if let Some(version) = options.minimum_ide_version {
        let _ = writeln!(out, "MinimumIDEVersion={}", version.number());
    }
    if let Some(folder) = &options.default_dest_folder {
        let _ = writeln!(out, "DefaultDestFolder={}", quote_scalar(folder));
    }
    if let Some(version) = options.default_ide {
        let _ = writeln!(out, "DefaultIDE={version}");
    }
    if options.auto_start {
        let _ = writeln!(out, "AutoStart=1");
    }
}

fn write_package(out: &mut String, package: &PackageDefinition) {
    let _ = writeln!(out, "[{}]", package.section);
    let _ = writeln!(out, "Name={}", quote_scalar(&package.name));
    let _ = writeln!(out, "Git={}", quote_scalar(&package.source.primary));
    if let Some(upstream) = &package.source.upstream {
        let _ = writeln!(out, "Upstream={}", quote_scalar(upstream));
    }
    let _ = writeln!(out, "Folder={}", quote_scalar(&package.folder));
    if !package.search_paths.is_empty() {
        let _ = writeln!(out, "SearchPath={}", format_list(&package.search_paths));
    }
    if !package.include_paths.is_empty() {
        let _ = writeln!(out, "Includes={}", format_list(&package.include_paths));
    }
    for (version, declared) in &package.artifacts {
        let marker = if declared.at_least { "+" } else { "" };
        let _ = writeln!(out, "{version}{marker}={}", format_list(&declared.artifacts));
    }
    if package.installable != Installable::default() {
        let _ = writeln!(out, "Installable={}", package.installable.code());
    }
    if let Some(suffix) = &package.lib_suffix {
        let _ = writeln!(out, "LibSuffix={}", quote_scalar(suffix));
    }
    if let Some(group) = package.group_index {
        let _ = writeln!(out, "GroupIndex={group}");
    }
    if !package.execute.is_empty() {
        let _ = writeln!(out, "ExecuteCount={}", package.execute.len());
        for (idx, entry) in package.execute.iter().enumerate() {
            let _ = writeln!(out, "Execute{}={}", idx + 1, format_list(&execute_tokens(entry)));
        }
    }
}

fn execute_tokens(entry: &ExecuteEntry) -> Vec<String> {
    let mut tokens = vec![entry.kind().to_string(), entry.origin().to_string()];
    if let Some(destination) = entry.destination() {
        tokens.push(destination.to_string());
    }
    tokens
}
