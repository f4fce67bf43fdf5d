//! Tests for fast-forwarding forks from upstream

use pretty_assertions::assert_eq;
use setup_fs::NormalizedPath;
use setup_git::{sync_with_upstream, GitSource, SourceControl, SyncStatus};
use setup_test_utils::git::{
    bare_clone, commit_file, configure_identity, git, head, real_git_repo_with_commit, rev_parse,
};
use tempfile::TempDir;

/// upstream repository, a bare fork of it, and a working copy of the fork
struct Fork {
    _temp: TempDir,
    upstream: std::path::PathBuf,
    origin: std::path::PathBuf,
    working_copy: NormalizedPath,
}

fn fork() -> Fork {
    let temp = TempDir::new().unwrap();
    let upstream = temp.path().join("upstream");
    real_git_repo_with_commit(&upstream);
    let origin = temp.path().join("origin.git");
    bare_clone(&upstream, &origin);

    let working_copy = NormalizedPath::new(temp.path().join("wc"));
    GitSource::new()
        .materialize(
            &origin.to_string_lossy(),
            Some(&upstream.to_string_lossy()),
            &working_copy,
        )
        .unwrap();
    configure_identity(&working_copy.to_native());

    Fork {
        _temp: temp,
        upstream,
        origin,
        working_copy,
    }
}

fn main_branch() -> String {
    "main".to_string()
}

#[test]
fn test_in_sync_fork_is_up_to_date() {
    let fx = fork();
    assert_eq!(
        sync_with_upstream(&fx.working_copy, false).unwrap(),
        SyncStatus::UpToDate { branch: main_branch() }
    );
}

#[test]
fn test_dry_run_reports_fast_forwardable_without_moving() {
    let fx = fork();
    commit_file(&fx.upstream, "new.txt", "new", "Upstream change");
    let before = head(&fx.working_copy.to_native());

    let status = sync_with_upstream(&fx.working_copy, true).unwrap();

    assert_eq!(status, SyncStatus::FastForwardable { branch: main_branch() });
    assert_eq!(head(&fx.working_copy.to_native()), before);
}

#[test]
fn test_fast_forward_updates_working_copy_and_origin() {
    let fx = fork();
    commit_file(&fx.upstream, "new.txt", "new", "Upstream change");
    let upstream_head = head(&fx.upstream);

    let status = sync_with_upstream(&fx.working_copy, false).unwrap();

    assert_eq!(status, SyncStatus::FastForwarded { branch: main_branch() });
    assert_eq!(head(&fx.working_copy.to_native()), upstream_head);
    assert!(fx.working_copy.join("new.txt").is_file());
    assert_eq!(rev_parse(&fx.origin, "main"), upstream_head);
}

#[test]
fn test_local_commits_are_ahead() {
    let fx = fork();
    commit_file(&fx.working_copy.to_native(), "local.txt", "local", "Local change");

    assert_eq!(
        sync_with_upstream(&fx.working_copy, false).unwrap(),
        SyncStatus::Ahead { branch: main_branch() }
    );
}

#[test]
fn test_changes_on_both_sides_diverge() {
    let fx = fork();
    commit_file(&fx.upstream, "up.txt", "up", "Upstream change");
    commit_file(&fx.working_copy.to_native(), "local.txt", "local", "Local change");
    let before = head(&fx.working_copy.to_native());

    assert_eq!(
        sync_with_upstream(&fx.working_copy, false).unwrap(),
        SyncStatus::Diverged { branch: main_branch() }
    );
    assert_eq!(head(&fx.working_copy.to_native()), before);
}

#[test]
fn test_missing_upstream_branch() {
    let fx = fork();
    git(&fx.upstream, &["branch", "-m", "main", "trunk"]);

    assert_eq!(
        sync_with_upstream(&fx.working_copy, false).unwrap(),
        SyncStatus::NoUpstreamBranch { branch: main_branch() }
    );
}

#[test]
fn test_working_copy_without_upstream_remote() {
    let temp = TempDir::new().unwrap();
    let origin = temp.path().join("origin");
    real_git_repo_with_commit(&origin);
    let working_copy = NormalizedPath::new(temp.path().join("wc"));
    GitSource::new()
        .materialize(&origin.to_string_lossy(), None, &working_copy)
        .unwrap();

    assert_eq!(
        sync_with_upstream(&working_copy, false).unwrap(),
        SyncStatus::NoUpstream
    );
}
