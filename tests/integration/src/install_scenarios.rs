//! End-to-end install scenarios
//!
//! Real git remotes, the file-backed environment store and a shell-script
//! compiler: everything the `setup` binary wires, minus the command line.
//! The compiler script logs every artifact it is asked to build and fails
//! `dclApp` unless `Base/Source` is already on the search path.

#![cfg(unix)]

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use setup_core::{
    CommandCompiler, EnvironmentStore, ErrorKind, FileEnvironmentStore, PackageStatus, PathList,
    Pipeline, RunContext, RunSummary,
};
use setup_fs::NormalizedPath;
use setup_git::GitSource;
use setup_manifest::{Manifest, TargetVersion};
use setup_test_utils::manifest::ManifestBuilder;
use setup_test_utils::sandbox::Sandbox;

const D29: TargetVersion = TargetVersion::new(29);

struct Project {
    sandbox: Sandbox,
    compiler: String,
    log: PathBuf,
}

impl Project {
    fn new() -> Self {
        let sandbox = Sandbox::new();
        let log = sandbox.root().join("compile.log");
        let script = sandbox.write(
            "tools/compile.sh",
            &format!(
                r#"echo "$(basename "$SETUP_ARTIFACT")" >> "{log}"
case "$SETUP_ARTIFACT" in
  *dclApp*)
    case "$SETUP_SEARCH_PATH" in
      *Base/Source*) ;;
      *) echo "dclApp.dpk(12): F2613 Unit 'Base' not found" >&2; exit 1 ;;
    esac ;;
esac
exit 0
"#,
                log = log.display()
            ),
        );
        Self {
            compiler: format!("sh \"{}\"", script.display()),
            sandbox,
            log,
        }
    }

    fn base(&self) -> String {
        let path = self.sandbox.remote_with_files(
            "base",
            &[("Source/Base.pas", "unit Base;"), ("Packages/Base.dproj", "<Project/>")],
        );
        path.to_string_lossy().into_owned()
    }

    fn app(&self) -> String {
        let path = self.sandbox.remote_with_files(
            "app",
            &[
                ("Source/App.pas", "unit App;"),
                ("Packages/App.dproj", "<Project/>"),
                ("Packages/dclApp.dproj", "<Project/>"),
            ],
        );
        path.to_string_lossy().into_owned()
    }

    fn context(&self) -> RunContext {
        RunContext::new(NormalizedPath::new(self.sandbox.components()), D29)
    }

    fn store(&self) -> FileEnvironmentStore {
        FileEnvironmentStore::open(&NormalizedPath::new(self.sandbox.store_dir()), D29).unwrap()
    }

    fn install(&self, text: &str) -> RunSummary {
        let manifest = Manifest::parse(text).unwrap();
        let mut pipeline = Pipeline::new(
            Arc::new(GitSource::new()),
            Box::new(CommandCompiler::new(self.compiler.clone())),
            Box::new(self.store()),
        );
        pipeline.run(&manifest, &self.context()).unwrap()
    }

    /// Artifacts the compiler was invoked for, in order.
    fn compiled(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn reset_log(&self) {
        let _ = fs::remove_file(&self.log);
    }
}

fn base_then_app(base: &str, app: &str) -> String {
    ManifestBuilder::new()
        .package("Base", base, "Base")
        .key("SearchPath", "\"Source\"")
        .key("D29", "\"Packages\\Base.dproj\"")
        .package("App", app, "App")
        .key("SearchPath", "\"Source\"")
        .key("D29", "\"Packages\\App.dproj\", \"Packages\\dclApp.dproj\"")
        .build()
}

fn app_then_base(base: &str, app: &str) -> String {
    ManifestBuilder::new()
        .package("App", app, "App")
        .key("SearchPath", "\"Source\"")
        .key("D29", "\"Packages\\App.dproj\", \"Packages\\dclApp.dproj\"")
        .package("Base", base, "Base")
        .key("SearchPath", "\"Source\"")
        .key("D29", "\"Packages\\Base.dproj\"")
        .build()
}

fn status_of(summary: &RunSummary, name: &str) -> PackageStatus {
    summary.package(name).unwrap().status
}

#[test]
fn manifest_order_makes_dependencies_available() {
    let project = Project::new();
    let (base, app) = (project.base(), project.app());

    let summary = project.install(&base_then_app(&base, &app));

    assert_eq!(status_of(&summary, "Base"), PackageStatus::Installed);
    assert_eq!(status_of(&summary, "App"), PackageStatus::Installed);
    assert_eq!(project.compiled(), ["Base.dproj", "App.dproj", "dclApp.dproj"]);
    assert!(!summary.has_failures());
}

#[test]
fn reordered_manifest_fails_the_dependent_design_package_every_time() {
    let project = Project::new();
    let (base, app) = (project.base(), project.app());
    let text = app_then_base(&base, &app);

    for _ in 0..2 {
        let summary = project.install(&text);
        let report = summary.package("App").unwrap();
        assert_eq!(report.status, PackageStatus::Partial);
        assert_eq!(report.compiled, ["Packages\\App.dproj"]);
        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.kind, ErrorKind::Compile);
        assert!(failure.message.contains("F2613"));
        assert_eq!(status_of(&summary, "Base"), PackageStatus::Installed);
        assert!(summary.has_failures());
    }

    // The runtime package's registration stands; the design package never
    // made it into the package list.
    let store = project.store();
    let search = store.entries(PathList::Search).unwrap();
    assert!(search.iter().any(|p| p.as_str().ends_with("App/Source")));
    assert!(store.entries(PathList::Package).unwrap().is_empty());
}

#[test]
fn omitted_installable_defaults_to_install() {
    let project = Project::new();
    let base = project.base();
    let text = ManifestBuilder::new()
        .package("Base", &base, "Base")
        .key("D29", "\"Packages\\Base.dproj\"")
        .build();

    let summary = project.install(&text);

    assert_eq!(status_of(&summary, "Base"), PackageStatus::Installed);
    assert_eq!(project.compiled(), ["Base.dproj"]);
}

#[test]
fn path_only_package_is_never_compiled() {
    let project = Project::new();
    let base = project.base();
    let text = ManifestBuilder::new()
        .package("Base", &base, "Base")
        .key("SearchPath", "\"Source\"")
        .key("D29", "\"Packages\\Base.dproj\"")
        .key("Installable", "2")
        .build();

    let summary = project.install(&text);

    assert_eq!(status_of(&summary, "Base"), PackageStatus::PathOnly);
    assert!(project.compiled().is_empty());
    assert_eq!(project.store().entries(PathList::Search).unwrap().len(), 1);
}

#[test]
fn unsupported_target_is_skipped_and_the_run_goes_on() {
    let project = Project::new();
    let (base, app) = (project.base(), project.app());
    let text = ManifestBuilder::new()
        .package("Base", &base, "Base")
        .key("SearchPath", "\"Source\"")
        .key("D28", "\"Packages\\Base.dproj\"")
        .package("App", &app, "App")
        .key("D29", "\"Packages\\App.dproj\"")
        .build();

    let summary = project.install(&text);

    let report = summary.package("Base").unwrap();
    assert_eq!(report.status, PackageStatus::Skipped);
    assert_eq!(report.failure.as_ref().unwrap().kind, ErrorKind::Unsupported);
    assert_eq!(status_of(&summary, "App"), PackageStatus::Installed);
    assert!(!summary.has_failures());
    assert!(project.store().entries(PathList::Search).unwrap().is_empty());
}

#[test]
fn both_actions_run_in_order_when_the_first_one_fails() {
    let project = Project::new();
    let tool = project.sandbox.remote_with_files(
        "tool",
        &[
            ("bin/postinstall.sh", "#!/bin/sh\necho running >&2\nexit 3\n"),
            ("bin/Tool.bpl", "binary"),
        ],
    );
    let status = std::process::Command::new("chmod")
        .args(["+x", &tool.join("bin/postinstall.sh").to_string_lossy()])
        .status()
        .unwrap();
    assert!(status.success());
    setup_test_utils::git::git(&tool, &["add", "."]);
    setup_test_utils::git::git(&tool, &["commit", "-m", "Make executable"]);

    let text = ManifestBuilder::new()
        .package("Tool", &tool.to_string_lossy(), "Tool")
        .key("ExecuteCount", "2")
        .key(
            "Execute1",
            "\"CopyAndRun\", \"$BaseFolder\\bin\\postinstall.sh\", \"$BaseFolder\\run\\\"",
        )
        .key("Execute2", "\"Copy\", \"$BaseFolder\\bin\\Tool.bpl\", \"$BaseFolder\\out\\\"")
        .build();

    let summary = project.install(&text);

    let report = summary.package("Tool").unwrap();
    assert_eq!(report.status, PackageStatus::Installed);
    let indices: Vec<_> = report.actions.iter().map(|a| a.index).collect();
    assert_eq!(indices, [1, 2]);
    assert_eq!(report.actions[0].failure.as_ref().unwrap().kind, ErrorKind::Execution);
    assert!(report.actions[1].failure.is_none());
    assert!(summary.has_failures());
    project.sandbox.assert_file_exists("components/Tool/out/Tool.bpl");
}

#[test]
fn repeated_installs_register_each_path_once() {
    let project = Project::new();
    let base = project.base();
    let text = ManifestBuilder::new()
        .package("Base", &base, "Base")
        .key("SearchPath", "\"Source\", \"\", \"Source\"")
        .key("Includes", "\"$BaseFolder\\Source\"")
        .key("ExecuteCount", "1")
        .key("Execute1", "\"Delete\", \"$BaseFolder\\NeverThere\"")
        .build();

    let first = project.install(&text);
    project.reset_log();
    let second = project.install(&text);

    for summary in [&first, &second] {
        let report = summary.package("Base").unwrap();
        assert_eq!(report.status, PackageStatus::Installed);
        assert!(report.actions[0].failure.is_none());
    }
    let store = project.store();
    assert_eq!(store.entries(PathList::Search).unwrap().len(), 2);
    assert_eq!(store.entries(PathList::Include).unwrap().len(), 1);
    assert_eq!(store.state().search_paths.len(), 2);
}
