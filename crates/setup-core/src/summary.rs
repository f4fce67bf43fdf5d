//! Run summary: every selected package's outcome in manifest order

use std::fmt;

use serde::Serialize;
use setup_manifest::{ActionKind, PackageDefinition, TargetVersion};

use crate::actions::{ActionEffect, ActionReport};
use crate::error::ErrorKind;
use crate::fetcher::FetchStatus;
use crate::installer::InstallResult;
use crate::registrar::{PathEntry, RegistrationReport};
use crate::Error;

/// Final state of one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageStatus {
    Installed,
    PathOnly,
    FetchedOnly,
    Partial,
    Skipped,
    Failed,
}

impl PackageStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::PathOnly => "path-only",
            Self::FetchedOnly => "fetched",
            Self::Partial => "partial",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A recorded error, flattened for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for Failure {
    fn from(error: &Error) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSummary {
    pub index: usize,
    pub action: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<ActionEffect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
}

impl From<&ActionReport> for ActionSummary {
    fn from(report: &ActionReport) -> Self {
        Self {
            index: report.index,
            action: report.kind,
            effect: report.result.as_ref().ok().cloned(),
            failure: report.result.as_ref().err().map(Failure::from),
        }
    }
}

/// Outcome of one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageReport {
    pub section: String,
    pub name: String,
    pub status: PackageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch: Option<FetchStatus>,
    pub registered: Vec<PathEntry>,
    pub missing_paths: Vec<PathEntry>,
    pub compiled: Vec<String>,
    pub actions: Vec<ActionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
    pub warnings: Vec<String>,
}

impl PackageReport {
    /// A report for a package nothing has happened to yet.
    pub fn pending(package: &PackageDefinition) -> Self {
        Self {
            section: package.section.clone(),
            name: package.name.clone(),
            status: PackageStatus::Skipped,
            fetch: None,
            registered: Vec::new(),
            missing_paths: Vec::new(),
            compiled: Vec::new(),
            actions: Vec::new(),
            failure: None,
            warnings: Vec::new(),
        }
    }

    pub fn skip(&mut self, reason: &Error) {
        self.status = PackageStatus::Skipped;
        self.failure = Some(reason.into());
    }

    pub fn fail(&mut self, error: &Error) {
        self.status = PackageStatus::Failed;
        self.failure = Some(error.into());
    }

    fn record_registration(&mut self, registration: RegistrationReport) {
        for entry in &registration.missing {
            self.warnings
                .push(format!("{} {} does not exist", entry.list, entry.path));
        }
        self.registered = registration.added;
        self.registered.extend(registration.existing);
        self.missing_paths = registration.missing;
    }

    /// Record the install step. Returns whether it completed, which is when
    /// post-install actions may run.
    pub fn apply(&mut self, result: InstallResult) -> bool {
        match result {
            InstallResult::Installed {
                registration,
                compiled,
            } => {
                self.status = PackageStatus::Installed;
                self.record_registration(registration);
                self.compiled = compiled;
                true
            }
            InstallResult::PathOnly { registration } => {
                self.status = PackageStatus::PathOnly;
                self.record_registration(registration);
                true
            }
            InstallResult::FetchedOnly => {
                self.status = PackageStatus::FetchedOnly;
                true
            }
            InstallResult::Partial {
                registration,
                compiled,
                error,
            } => {
                self.status = PackageStatus::Partial;
                self.record_registration(registration);
                self.compiled = compiled;
                self.failure = Some((&error).into());
                false
            }
            InstallResult::Unsupported(error) => {
                self.skip(&error);
                false
            }
            InstallResult::Failed {
                registration,
                error,
            } => {
                if let Some(registration) = registration {
                    self.record_registration(registration);
                }
                self.fail(&error);
                false
            }
        }
    }

    /// Failed or partial install, or any failed action.
    pub fn has_failures(&self) -> bool {
        matches!(self.status, PackageStatus::Failed | PackageStatus::Partial)
            || self.actions.iter().any(|a| a.failure.is_some())
    }

    pub fn was_cancelled(&self) -> bool {
        self.status == PackageStatus::Skipped
            && self
                .failure
                .as_ref()
                .is_some_and(|f| f.kind == ErrorKind::Cancelled)
    }
}

/// Outcomes of a run, in manifest order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub target: TargetVersion,
    pub packages: Vec<PackageReport>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.packages.iter().any(PackageReport::has_failures)
    }

    pub fn was_cancelled(&self) -> bool {
        self.packages.iter().any(PackageReport::was_cancelled)
    }

    pub fn count(&self, status: PackageStatus) -> usize {
        self.packages.iter().filter(|p| p.status == status).count()
    }

    pub fn package(&self, name: &str) -> Option<&PackageReport> {
        self.packages
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name) || p.section.eq_ignore_ascii_case(name))
    }

    /// Packages that failed outright or partially, or had failed actions.
    pub fn failed(&self) -> impl Iterator<Item = &PackageReport> {
        self.packages.iter().filter(|p| p.has_failures())
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run summary for {}:", self.target)?;
        for package in &self.packages {
            write!(f, "  {:<10} {}", package.status.label(), package.name)?;
            if let Some(failure) = &package.failure {
                write!(f, ": {}", failure.message)?;
            }
            writeln!(f)?;
            for action in &package.actions {
                if let Some(failure) = &action.failure {
                    writeln!(f, "    action {} ({}) failed: {}", action.index, action.action, failure.message)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use setup_manifest::Manifest;

    fn report() -> PackageReport {
        let manifest = Manifest::parse("[P]\nName=Pkg\nGit=g\nFolder=P\n").unwrap();
        PackageReport::pending(&manifest.packages[0])
    }

    #[test]
    fn unsupported_is_skipped_not_failed() {
        let mut report = report();
        let completed = report.apply(InstallResult::Unsupported(Error::Unsupported {
            target: TargetVersion::new(29),
            reason: "no artifacts".into(),
        }));
        assert!(!completed);
        assert_eq!(report.status, PackageStatus::Skipped);
        assert!(!report.has_failures());
    }

    #[test]
    fn failed_action_counts_as_failure() {
        let mut report = report();
        report.apply(InstallResult::FetchedOnly);
        report.actions.push(ActionSummary {
            index: 1,
            action: ActionKind::CopyAndRun,
            effect: None,
            failure: Some(Failure {
                kind: ErrorKind::Execution,
                message: "exit 1".into(),
            }),
        });
        assert!(report.has_failures());
    }

    #[test]
    fn display_lists_packages_in_order() {
        let mut first = report();
        first.status = PackageStatus::Installed;
        let mut second = report();
        second.name = "Other".into();
        second.fail(&Error::Fetch {
            package: "Other".into(),
            message: "offline".into(),
        });
        let summary = RunSummary {
            target: TargetVersion::new(29),
            packages: vec![first, second],
        };

        let text = summary.to_string();
        let installed = text.find("installed  Pkg").unwrap();
        let failed = text.find("failed     Other").unwrap();
        assert!(installed < failed, "{text}");
        assert_eq!(summary.failed().count(), 1);
    }

    #[test]
    fn json_shape_is_stable() {
        let mut report = report();
        report.fetch = Some(FetchStatus::Cloned);
        report.apply(InstallResult::Failed {
            registration: None,
            error: Error::Compile {
                artifact: "P.dproj".into(),
                diagnostics: "E2003".into(),
            },
        });
        let summary = RunSummary {
            target: TargetVersion::new(29),
            packages: vec![report],
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["target"], "D29");
        assert_eq!(json["packages"][0]["status"], "failed");
        assert_eq!(json["packages"][0]["fetch"]["status"], "cloned");
        assert_eq!(json["packages"][0]["failure"]["kind"], "compile");
    }
}
