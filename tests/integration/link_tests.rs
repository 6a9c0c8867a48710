use dupekeep::scanner::{classify, Indexer, IndexerConfig, SkipReason};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write_file(path: &Path, len: usize) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path)
        .unwrap()
        .write_all(&vec![b'q'; len])
        .unwrap();
}

/// `/a/x.bin` and its hardlink `/a/x-link.bin`: one bucket entry, two aliases.
#[test]
fn test_hardlink_pair_single_representative() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("a/x.bin");
    let link = dir.path().join("a/x-link.bin");
    write_file(&original, 500);
    if let Err(e) = fs::hard_link(&original, &link) {
        eprintln!("Skipping hardlink test: failed to create hardlink: {}", e);
        return;
    }

    // Each path as its own root, original first, so it is the first-seen alias
    let mut indexer = Indexer::new(IndexerConfig::default());
    indexer.add(&original, true).unwrap();
    indexer.add(&link, true).unwrap();

    assert_eq!(indexer.buckets().get(500).unwrap(), &[original.clone()]);

    let identity = classify(&original, false).unwrap().identity;
    let aliases = indexer.inodes().aliases(identity).unwrap();
    assert_eq!(aliases, &[original.clone(), link.clone()]);
    assert_eq!(indexer.inodes().representative(identity), Some(original.as_path()));
    assert_eq!(indexer.stats().included, 1);
}

#[test]
fn test_hardlinks_reported_as_groups() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("one.bin");
    write_file(&original, 64);
    write_file(&dir.path().join("unrelated.bin"), 64);
    for name in ["two.bin", "three.bin"] {
        if fs::hard_link(&original, dir.path().join(name)).is_err() {
            eprintln!("Skipping hardlink test: hardlinks unsupported");
            return;
        }
    }

    let mut indexer = Indexer::new(IndexerConfig::default());
    indexer.add(dir.path(), true).unwrap();

    // one.bin + unrelated.bin are the distinct files of size 64
    assert_eq!(indexer.buckets().get(64).unwrap().len(), 2);
    assert_eq!(indexer.stats().hardlink_aliases, 2);

    let groups = indexer.inodes().hardlinked_groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].1.len(), 3);
}

#[test]
fn test_hardlink_below_minimum_not_registered() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("empty");
    write_file(&original, 0);
    if fs::hard_link(&original, dir.path().join("empty2")).is_err() {
        return;
    }

    let mut indexer = Indexer::new(IndexerConfig::default());
    indexer.add(dir.path(), true).unwrap();

    let identity = classify(&original, false).unwrap().identity;
    assert!(indexer.inodes().aliases(identity).is_none());
    assert_eq!(indexer.stats().hardlink_aliases, 0);
    assert_eq!(indexer.stats().skipped(SkipReason::TooSmall), 2);
}

#[cfg(unix)]
#[test]
fn test_symlinks_excluded_when_not_following() {
    let dir = tempdir().unwrap();
    let outside = tempdir().unwrap();
    let target = outside.path().join("target.bin");
    write_file(&target, 77);
    write_file(&outside.path().join("tree/inside.bin"), 77);
    std::os::unix::fs::symlink(&target, dir.path().join("file-link")).unwrap();
    std::os::unix::fs::symlink(outside.path().join("tree"), dir.path().join("dir-link")).unwrap();

    let mut indexer = Indexer::new(IndexerConfig::default());
    indexer.add(dir.path(), true).unwrap();

    assert!(indexer.buckets().is_empty());
    assert_eq!(indexer.inodes().len(), 1);
    assert_eq!(indexer.stats().skipped(SkipReason::Symlink), 2);
}

#[cfg(unix)]
#[test]
fn test_symlinks_dereferenced_when_following() {
    let dir = tempdir().unwrap();
    let outside = tempdir().unwrap();
    write_file(&outside.path().join("tree/inside.bin"), 77);
    std::os::unix::fs::symlink(outside.path().join("tree"), dir.path().join("dir-link")).unwrap();

    let config = IndexerConfig {
        follow_symlinks: true,
        ..Default::default()
    };
    let mut indexer = Indexer::new(config);
    indexer.add(dir.path(), true).unwrap();

    assert_eq!(
        indexer.buckets().get(77).unwrap(),
        &[dir.path().join("dir-link/inside.bin")]
    );
}

#[cfg(unix)]
#[test]
fn test_symlink_and_target_counted_once() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("real.bin");
    write_file(&target, 33);
    std::os::unix::fs::symlink(&target, dir.path().join("alias.bin")).unwrap();

    let config = IndexerConfig {
        follow_symlinks: true,
        ..Default::default()
    };
    let mut indexer = Indexer::new(config);
    indexer.add(dir.path(), true).unwrap();

    // "alias.bin" sorts first, so it is the representative
    assert_eq!(
        indexer.buckets().get(33).unwrap(),
        &[dir.path().join("alias.bin")]
    );
    assert_eq!(indexer.stats().hardlink_aliases, 1);
}

#[cfg(unix)]
#[test]
fn test_mutual_symlink_cycle_terminates() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a/file.bin"), 5);
    write_file(&dir.path().join("b/file.bin"), 6);
    std::os::unix::fs::symlink(dir.path().join("b"), dir.path().join("a/to-b")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("a"), dir.path().join("b/to-a")).unwrap();

    let config = IndexerConfig {
        follow_symlinks: true,
        ..Default::default()
    };
    let mut indexer = Indexer::new(config);
    indexer.add(dir.path(), true).unwrap();

    assert_eq!(indexer.buckets().file_count(), 2);
}
