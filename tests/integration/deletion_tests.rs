use dupekeep::actions::{DeleteConfig, DeleteError, DeletionPlan};
use dupekeep::duplicates::DuplicateSet;
use dupekeep::rules::{BuiltinRule, CompositionPolicy, NamedRule, Outcome, RuleEngine};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn create(path: &PathBuf, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_relaxed_policy_still_never_deletes_every_copy() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a/report.txt");
    let b = dir.path().join("b/report.txt");
    create(&a, b"content");
    create(&b, b"content");

    let relaxed = CompositionPolicy {
        forbid_total_deletion: false,
        require_certainty: false,
    };
    let engine = RuleEngine::new(
        vec![NamedRule::new(
            "delete all reports",
            BuiltinRule::delete_regex("report").unwrap(),
        )],
        relaxed,
    );
    let set = DuplicateSet::new([a.clone(), b.clone()]);
    let decision = engine.decide(&set);
    assert_eq!(decision.outcome, Outcome::Decided);
    assert_eq!(decision.deletions().len(), 2);

    let result = DeletionPlan::from_decision(&set, &decision);
    assert!(matches!(result, Err(DeleteError::AllCopiesWouldBeDeleted)));
    assert!(a.exists() && b.exists());
}

#[test]
fn test_decided_set_deleted_permanently() {
    let dir = tempdir().unwrap();
    let keep = dir.path().join("photos/2019/trip/img.jpg");
    let drop = dir.path().join("inbox/img.jpg");
    create(&keep, b"jpeg bytes");
    create(&drop, b"jpeg bytes");

    let engine = RuleEngine::new(
        vec![NamedRule::new("keep deepest", BuiltinRule::keep_deepest())],
        CompositionPolicy::default(),
    );
    let set = DuplicateSet::new([drop.clone(), keep.clone()]);
    let plan = DeletionPlan::from_decision(&set, &engine.decide(&set)).unwrap();
    assert_eq!(plan.targets().collect::<Vec<_>>(), vec![drop.as_path()]);

    let result = plan.execute(&DeleteConfig::permanent());
    assert!(result.all_succeeded());
    assert_eq!(result.bytes_freed, 10);
    assert!(keep.exists());
    assert!(!drop.exists());
}

#[test]
fn test_continue_on_error_false_stops_batch() {
    let dir = tempdir().unwrap();
    let keep = dir.path().join("deep/er/x");
    let first = dir.path().join("a/x");
    let second = dir.path().join("b/x");
    for p in [&keep, &first, &second] {
        create(p, b"x");
    }

    let engine = RuleEngine::new(
        vec![NamedRule::new("keep deepest", BuiltinRule::keep_deepest())],
        CompositionPolicy::default(),
    );
    let set = DuplicateSet::new([keep.clone(), first.clone(), second.clone()]);
    let plan = DeletionPlan::from_decision(&set, &engine.decide(&set)).unwrap();

    // First target vanishes between planning and execution
    fs::remove_file(&first).unwrap();
    let config = DeleteConfig::permanent().with_continue_on_error(false);
    let result = plan.execute(&config);

    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.success_count(), 0);
    assert!(second.exists());
}
