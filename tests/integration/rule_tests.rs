use dupekeep::duplicates::DuplicateSet;
use dupekeep::rules::verdict::uniform;
use dupekeep::rules::{
    compose, default_rules, BuiltinRule, CompositionPolicy, NamedRule, Outcome, Rule, RuleEngine,
    Verdict,
};
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn verdict(map: &dupekeep::rules::VerdictMap, path: &str) -> Verdict {
    map[Path::new(path)]
}

#[test]
fn test_default_rules_protect_backup_copy() {
    let set = DuplicateSet::new(["/home/u/photo.jpg", "/backup/2019/photo.jpg"]);
    let decision = compose(&default_rules(), &set, CompositionPolicy::default());

    assert_eq!(decision.verdict(Path::new("/backup/2019/photo.jpg")), Verdict::Keep);
    assert_eq!(decision.verdict(Path::new("/home/u/photo.jpg")), Verdict::Unknown);
    assert_eq!(decision.outcome, Outcome::Uncertain);
    assert!(decision.deletions().is_empty());

    let fired: Vec<&str> = decision
        .trace
        .iter()
        .filter(|t| t.verdicts.values().any(|v| *v != Verdict::Unknown))
        .map(|t| t.label.as_str())
        .collect();
    assert_eq!(fired.len(), 1);
    assert!(fired[0].contains("[Bb]ackup"));
}

#[test]
fn test_keep_longest_path_scenario() {
    let set = DuplicateSet::new(["/a/b/c.txt", "/a/bb/ccc.txt"]);
    let out = BuiltinRule::keep_longest_path().evaluate(&set);
    assert_eq!(verdict(&out, "/a/bb/ccc.txt"), Verdict::Keep);
    assert_eq!(verdict(&out, "/a/b/c.txt"), Verdict::Delete);
}

#[test]
fn test_zero_rules_compose_to_unknown() {
    let set = DuplicateSet::new(["/x/1", "/y/2", "/z/3"]);
    let decision = compose(&[], &set, CompositionPolicy::default());
    assert_eq!(decision.verdicts.len(), 3);
    assert!(decision.verdicts.values().all(|v| *v == Verdict::Unknown));
}

#[test]
fn test_all_delete_rules_compose_to_unknown() {
    let set = DuplicateSet::new(["/x/1", "/y/2"]);
    let rules: Vec<NamedRule> = (0..3)
        .map(|i| {
            NamedRule::new(format!("delete everything #{i}"), |s: &DuplicateSet| {
                uniform(s, Verdict::Delete)
            })
        })
        .collect();

    let decision = compose(&rules, &set, CompositionPolicy::default());
    assert_eq!(decision.outcome, Outcome::TotalDeletionPrevented);
    assert!(decision.verdicts.values().all(|v| *v == Verdict::Unknown));
    assert!(decision.deletions().is_empty());
}

#[test]
fn test_depth_rules_undecided_on_equal_depth() {
    let set = DuplicateSet::new(["/one/a.txt", "/two/a.txt"]);
    for rule in [BuiltinRule::keep_deepest(), BuiltinRule::keep_shallowest()] {
        let out = rule.evaluate(&set);
        assert!(out.values().all(|v| *v == Verdict::Unknown), "{rule:?}");
    }
}

#[test]
fn test_keep_newest_uses_mtime() {
    let dir = tempdir().unwrap();
    let paths: Vec<PathBuf> = ["a", "b", "c"].iter().map(|n| dir.path().join(n)).collect();
    for (i, p) in paths.iter().enumerate() {
        fs::write(p, b"same").unwrap();
        set_file_mtime(p, FileTime::from_unix_time(1_000_000 + i as i64, 0)).unwrap();
    }
    // ctime is "now" for all three, so push the newest mtime past it
    set_file_mtime(&paths[1], FileTime::from_unix_time(4_102_444_800, 0)).unwrap();

    let set = DuplicateSet::new(paths.clone());
    let out = BuiltinRule::keep_newest().evaluate(&set);
    assert_eq!(out[&paths[1]], Verdict::Keep);
    assert_eq!(out[&paths[0]], Verdict::Delete);
    assert_eq!(out[&paths[2]], Verdict::Delete);
}

#[test]
fn test_keep_newest_stat_failure_downgrades_whole_set() {
    let dir = tempdir().unwrap();
    let present = dir.path().join("present");
    fs::write(&present, b"data").unwrap();
    set_file_mtime(&present, FileTime::from_unix_time(4_102_444_800, 0)).unwrap();
    let vanished = dir.path().join("vanished");

    let set = DuplicateSet::new([present, vanished]);
    let out = BuiltinRule::keep_newest().evaluate(&set);
    assert!(out.values().all(|v| *v == Verdict::Unknown));
}

#[test]
fn test_delete_rule_asserts_protective_default() {
    let set = DuplicateSet::new(["/home/u/Downloads/song.mp3", "/home/u/Music/song.mp3"]);
    let engine = RuleEngine::new(
        vec![NamedRule::new(
            "delete downloads",
            BuiltinRule::delete_regex("/Downloads/").unwrap(),
        )],
        CompositionPolicy::default(),
    );
    let decision = engine.decide(&set);
    assert_eq!(decision.outcome, Outcome::Decided);
    assert_eq!(
        decision.deletions(),
        vec![&PathBuf::from("/home/u/Downloads/song.mp3")]
    );
}

#[test]
fn test_keep_beats_delete() {
    let set = DuplicateSet::new(["/srv/Archive/report.pdf", "/tmp2/report.pdf"]);
    let mut engine = RuleEngine::with_defaults(CompositionPolicy::default());
    engine.push(NamedRule::new(
        "delete pdfs",
        BuiltinRule::DeleteMatching {
            pattern: dupekeep::rules::PathPattern::regex(r"\.pdf$").unwrap(),
            others: Verdict::Unknown,
        },
    ));

    let decision = engine.decide(&set);
    assert_eq!(decision.verdict(Path::new("/srv/Archive/report.pdf")), Verdict::Keep);
    assert_eq!(decision.verdict(Path::new("/tmp2/report.pdf")), Verdict::Delete);
    assert_eq!(decision.outcome, Outcome::Decided);
}

#[test]
fn test_random_choice_seeded() {
    let set = DuplicateSet::new(["/a", "/b", "/c"]);
    let rule = BuiltinRule::RandomChoice { seed: Some(42) };
    let first = rule.evaluate(&set);
    assert_eq!(first.values().filter(|v| **v == Verdict::Keep).count(), 1);
    for _ in 0..5 {
        assert_eq!(rule.evaluate(&set), first);
    }
}
