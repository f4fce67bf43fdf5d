use assert_fs::prelude::*;
use predicates::prelude::*;
use setup_fs::{CopyOutcome, Error, NormalizedPath, RobustnessConfig, copy_path, remove_path};

fn norm(path: &std::path::Path) -> NormalizedPath {
    NormalizedPath::new(path)
}

#[test]
fn test_copy_file_creates_parent_directories() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("src/lib.dll").write_str("binary").unwrap();

    let outcome = copy_path(
        &norm(&temp.path().join("src/lib.dll")),
        &norm(&temp.path().join("out/nested/lib.dll")),
        RobustnessConfig::strict(),
    )
    .unwrap();

    assert!(matches!(outcome, CopyOutcome::Copied { .. }));
    temp.child("out/nested/lib.dll").assert("binary");
}

#[test]
fn test_copy_into_existing_directory_keeps_name() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("src/python3.dll").write_str("py").unwrap();
    temp.child("bin").create_dir_all().unwrap();

    let outcome = copy_path(
        &norm(&temp.path().join("src/python3.dll")),
        &norm(&temp.path().join("bin")),
        RobustnessConfig::strict(),
    )
    .unwrap();

    assert!(outcome.target().as_str().ends_with("bin/python3.dll"));
    temp.child("bin/python3.dll").assert("py");
}

#[test]
fn test_copy_identical_file_is_unchanged() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a.txt").write_str("same").unwrap();
    temp.child("b.txt").write_str("same").unwrap();

    let outcome = copy_path(
        &norm(&temp.path().join("a.txt")),
        &norm(&temp.path().join("b.txt")),
        RobustnessConfig::strict(),
    )
    .unwrap();

    assert!(matches!(outcome, CopyOutcome::Unchanged { .. }));
}

#[test]
fn test_copy_overwrites_changed_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a.txt").write_str("new").unwrap();
    temp.child("b.txt").write_str("old").unwrap();

    copy_path(
        &norm(&temp.path().join("a.txt")),
        &norm(&temp.path().join("b.txt")),
        RobustnessConfig::strict(),
    )
    .unwrap();

    temp.child("b.txt").assert("new");
}

#[test]
fn test_copy_directory_replaces_previous_tree() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("src/tree/one.txt").write_str("1").unwrap();
    temp.child("src/tree/sub/two.txt").write_str("2").unwrap();
    temp.child("dst/stale.txt").write_str("stale").unwrap();

    copy_path(
        &norm(&temp.path().join("src/tree")),
        &norm(&temp.path().join("dst-tree")),
        RobustnessConfig::strict(),
    )
    .unwrap();
    temp.child("dst-tree/one.txt").assert("1");
    temp.child("dst-tree/sub/two.txt").assert("2");

    // Copy again over an existing tree with different content
    temp.child("src/tree/one.txt").write_str("uno").unwrap();
    copy_path(
        &norm(&temp.path().join("src/tree")),
        &norm(&temp.path().join("dst-tree")),
        RobustnessConfig::strict(),
    )
    .unwrap();
    temp.child("dst-tree/one.txt").assert("uno");

    // No staging or backup leftovers next to the target
    let leftovers: Vec<_> = std::fs::read_dir(temp.path())
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().starts_with('.'))
        .collect();
    assert!(leftovers.is_empty(), "unexpected leftovers: {leftovers:?}");
}

#[test]
fn test_copy_missing_source_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    let err = copy_path(
        &norm(&temp.path().join("missing.txt")),
        &norm(&temp.path().join("out.txt")),
        RobustnessConfig::strict(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::SourceNotFound { .. }));
    temp.child("out.txt").assert(predicate::path::missing());
}

#[test]
fn test_remove_missing_path_is_ok() {
    let temp = assert_fs::TempDir::new().unwrap();
    let removed = remove_path(&norm(&temp.path().join("nothing-here"))).unwrap();
    assert!(!removed);
}

#[test]
fn test_remove_directory_recursively() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("tree/a/b/c.txt").write_str("x").unwrap();

    let removed = remove_path(&norm(&temp.path().join("tree"))).unwrap();
    assert!(removed);
    temp.child("tree").assert(predicate::path::missing());

    // Second delete is a no-op
    assert!(!remove_path(&norm(&temp.path().join("tree"))).unwrap());
}

#[test]
fn test_remove_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("file.txt").write_str("x").unwrap();
    assert!(remove_path(&norm(&temp.path().join("file.txt"))).unwrap());
    temp.child("file.txt").assert(predicate::path::missing());
}
