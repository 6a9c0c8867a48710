use dupekeep::duplicates::{Blake3Verifier, ContentVerifier};
use dupekeep::rules::{BuiltinRule, CompositionPolicy, NamedRule, Outcome, RuleEngine, Verdict};
use dupekeep::scanner::{Indexer, IndexerConfig};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn create(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_index_verify_decide() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    create(root, "inbox/song.mp3", b"MP3 DATA 1234");
    create(root, "library/artist/album/song.mp3", b"MP3 DATA 1234");
    // Same size, different content
    create(root, "inbox/other.mp3", b"MP3 DATA 9999");
    create(root, "notes.txt", b"unique");

    let mut indexer = Indexer::new(IndexerConfig::default());
    indexer.add(root, true).unwrap();
    let (buckets, _, stats) = indexer.into_parts();
    assert_eq!(stats.included, 4);

    let candidates: Vec<_> = buckets.candidates().collect();
    assert_eq!(candidates.len(), 1);
    let (size, paths) = candidates[0];
    assert_eq!(size, 13);
    assert_eq!(paths.len(), 3);

    let sets = Blake3Verifier::new().verify(paths);
    assert_eq!(sets.len(), 1);
    let set = &sets[0];
    assert_eq!(set.len(), 2);

    let engine = RuleEngine::new(
        vec![NamedRule::new("keep deepest", BuiltinRule::keep_deepest())],
        CompositionPolicy::default(),
    );
    let decision = engine.decide(set);
    assert_eq!(decision.outcome, Outcome::Decided);
    assert_eq!(
        decision.verdict(&root.join("library/artist/album/song.mp3")),
        Verdict::Keep
    );
    assert_eq!(decision.deletions(), vec![&root.join("inbox/song.mp3")]);
}

#[cfg(unix)]
#[test]
fn test_hardlinks_never_form_a_duplicate_set() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    create(root, "a.bin", b"shared inode");
    fs::hard_link(root.join("a.bin"), root.join("b.bin")).unwrap();

    let mut indexer = Indexer::new(IndexerConfig::default());
    indexer.add(root, true).unwrap();

    assert_eq!(indexer.buckets().candidates().count(), 0);
    assert_eq!(indexer.inodes().hardlinked_groups().len(), 1);
}
