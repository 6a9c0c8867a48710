use dupekeep::scanner::{Indexer, IndexerConfig, SkipReason};
use std::cell::RefCell;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::{tempdir, TempDir};

fn write_file(path: &Path, len: usize) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path)
        .unwrap()
        .write_all(&vec![b'z'; len])
        .unwrap();
}

fn index(dir: &TempDir, config: IndexerConfig) -> Indexer {
    let mut indexer = Indexer::new(config);
    indexer.add(dir.path(), true).unwrap();
    indexer
}

#[test]
fn test_bucket_order_follows_sorted_walk() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("b/2.txt"), 10);
    write_file(&dir.path().join("a/1.txt"), 10);
    write_file(&dir.path().join("c.txt"), 10);
    write_file(&dir.path().join("a/z/3.txt"), 10);

    let indexer = index(&dir, IndexerConfig::default());
    let root = dir.path();
    let expected: Vec<PathBuf> = ["a/1.txt", "a/z/3.txt", "b/2.txt", "c.txt"]
        .iter()
        .map(|p| root.join(p))
        .collect();
    assert_eq!(indexer.buckets().get(10).unwrap(), expected.as_slice());
    assert_eq!(indexer.stats().included, 4);
    assert_eq!(indexer.stats().directories, 4);
}

#[test]
fn test_below_minimum_never_bucketed() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("empty"), 0);
    write_file(&dir.path().join("tiny"), 3);
    write_file(&dir.path().join("big"), 300);

    let indexer = index(&dir, IndexerConfig::default());
    assert!(indexer.buckets().get(0).is_none());
    assert!(indexer.buckets().get(3).is_some());

    let config = IndexerConfig {
        min_size: 100,
        ..Default::default()
    };
    let indexer = index(&dir, config);
    assert!(indexer.buckets().get(3).is_none());
    assert_eq!(indexer.buckets().file_count(), 1);
    assert_eq!(indexer.stats().skipped(SkipReason::TooSmall), 2);
}

#[test]
fn test_maximum_size_filter() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("small"), 5);
    write_file(&dir.path().join("large"), 5000);

    let config = IndexerConfig {
        max_size: Some(1000),
        ..Default::default()
    };
    let indexer = index(&dir, config);
    assert_eq!(indexer.buckets().file_count(), 1);
    assert_eq!(indexer.stats().skipped(SkipReason::TooLarge), 1);
}

/// A directory named "d" is pruned by its parent's listing; nothing below it
/// is visited and directories never land in buckets.
#[test]
fn test_ignored_dirname_pruned_from_listing() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("d/inner.bin"), 42);
    write_file(&dir.path().join("d/deeper/more.bin"), 42);
    write_file(&dir.path().join("keep/d.bin"), 42);
    write_file(&dir.path().join("keep/d/nested.bin"), 42);

    let config = IndexerConfig::default().with_ignore_dirnames(["d"]);
    let indexer = index(&dir, config);

    assert_eq!(
        indexer.buckets().get(42).unwrap(),
        &[dir.path().join("keep/d.bin")]
    );
    assert_eq!(indexer.stats().skipped(SkipReason::IgnoredDirname), 2);
}

#[test]
fn test_ignore_applies_to_children_not_root() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("d");
    write_file(&root.join("inner.bin"), 7);

    let config = IndexerConfig::default().with_ignore_dirnames(["d"]);
    let mut indexer = Indexer::new(config);
    indexer.add(&root, true).unwrap();

    assert_eq!(indexer.buckets().file_count(), 1);
}

#[test]
fn test_multiple_roots_accumulate() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    write_file(&first.path().join("a.bin"), 64);
    write_file(&second.path().join("b.bin"), 64);

    let mut indexer = Indexer::new(IndexerConfig::default());
    indexer.add(first.path(), true).unwrap();
    indexer.add(second.path(), true).unwrap();
    // Overlapping root: already-registered directory, not rescanned
    indexer.add(first.path(), true).unwrap();

    assert_eq!(indexer.buckets().get(64).unwrap().len(), 2);
    assert_eq!(indexer.buckets().candidates().count(), 1);
}

#[test]
fn test_missing_root_is_diagnosed() {
    let dir = tempdir().unwrap();
    let lines = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink_lines = Rc::clone(&lines);

    let mut indexer = Indexer::new(IndexerConfig::default())
        .with_sink(move |line: &str| sink_lines.borrow_mut().push(line.to_string()));
    indexer.add(&dir.path().join("nope"), true).unwrap();

    assert!(indexer.buckets().is_empty());
    assert_eq!(indexer.stats().skipped(SkipReason::AccessDenied), 1);
    assert!(indexer.stats().had_access_problems());
    // Access failures are reported even at verbosity 0
    assert_eq!(lines.borrow().len(), 1);
    assert!(lines.borrow()[0].contains("could not access"));
}

#[test]
fn test_relative_root_made_absolute() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("sub/f.bin"), 11);
    let nested = dir.path().join("sub/../sub");

    let mut indexer = Indexer::new(IndexerConfig::default());
    indexer.add(&nested, true).unwrap();

    let path = &indexer.buckets().get(11).unwrap()[0];
    assert!(path.is_absolute());
    assert_eq!(path, &dir.path().join("sub/f.bin"));
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_skipped_and_walk_continues() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write_file(&dir.path().join("locked/secret.bin"), 20);
    write_file(&dir.path().join("open/public.bin"), 20);
    let locked = dir.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permission bits; nothing to check then
    let readable_anyway = fs::read_dir(&locked).is_ok();

    let indexer = index(&dir, IndexerConfig::default());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    if readable_anyway {
        return;
    }
    assert_eq!(
        indexer.buckets().get(20).unwrap(),
        &[dir.path().join("open/public.bin")]
    );
    assert_eq!(indexer.stats().skipped(SkipReason::AccessDenied), 1);
}

#[cfg(unix)]
#[test]
fn test_fifo_is_unsupported_kind() {
    let dir = tempdir().unwrap();
    let fifo = dir.path().join("pipe");
    let status = std::process::Command::new("mkfifo").arg(&fifo).status();
    if !status.is_ok_and(|s| s.success()) {
        eprintln!("Skipping FIFO test: mkfifo unavailable");
        return;
    }

    let indexer = index(&dir, IndexerConfig::default());
    assert!(indexer.buckets().is_empty());
    assert_eq!(indexer.stats().skipped(SkipReason::UnsupportedKind), 1);
}
