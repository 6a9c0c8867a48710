use dupekeep::config::{Config, ConfigError};
use dupekeep::rules::Preference;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config = Config::from_figment(figment).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.indexer.min_size, 1);
    assert!(config.indexer.max_size.is_none());
    assert!(config.rules.use_defaults);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
[indexer]
min_size = 4096
max_size = 1000000
follow_symlinks = true
ignore_dirnames = ["node_modules", ".cache"]
recursive = false

[policy]
require_certainty = false

[rules]
use_defaults = false
keep = ["^/srv/masters/"]
delete = ["/Downloads/"]
prefer = ["deepest", "longest-name"]
"#;
    fs::write(&config_path, toml_content).unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config = Config::from_figment(figment).unwrap();

    assert_eq!(config.indexer.min_size, 4096);
    assert_eq!(config.indexer.max_size, Some(1_000_000));
    assert!(config.indexer.follow_symlinks);
    assert_eq!(config.indexer.ignore_dirnames, vec!["node_modules", ".cache"]);
    assert!(!config.indexer.recursive);
    assert!(config.policy.forbid_total_deletion);
    assert!(!config.policy.require_certainty);
    assert!(!config.rules.use_defaults);
    assert_eq!(
        config.rules.prefer,
        vec![Preference::Deepest, Preference::LongestName]
    );
    assert_eq!(config.rule_engine().unwrap().rules().len(), 4);
}

#[test]
fn test_config_load_from_env() {
    // Test-only prefix so the real DUPEKEEP_ variables are never touched
    std::env::set_var("DKTEST_INDEXER__MIN_SIZE", "2048");
    std::env::set_var("DKTEST_POLICY__FORBID_TOTAL_DELETION", "false");

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("DKTEST_").split("__"));
    let config = Config::from_figment(figment).unwrap();

    assert_eq!(config.indexer.min_size, 2048);
    assert!(!config.policy.forbid_total_deletion);

    std::env::remove_var("DKTEST_INDEXER__MIN_SIZE");
    std::env::remove_var("DKTEST_POLICY__FORBID_TOTAL_DELETION");
}

#[test]
fn test_config_invalid_regex_fails_at_load() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[rules]\nkeep = [\"(unclosed\"]\n").unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let result = Config::from_figment(figment);
    assert!(matches!(result, Err(ConfigError::Rule(_))));
}

#[test]
fn test_config_wrong_type_rejected() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[indexer]\nmin_size = \"big\"\n").unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    assert!(matches!(
        Config::from_figment(figment),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_config_explicit_file_must_exist() {
    let temp_dir = tempdir().unwrap();
    let result = Config::load(Some(&temp_dir.path().join("missing.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_config_roundtrips_through_toml() {
    let mut config = Config::default();
    config.indexer.ignore_dirnames.push("target".to_string());
    config.rules.prefer.push(Preference::Newest);

    let content = toml::to_string_pretty(&config).unwrap();
    assert!(content.contains("[indexer]"));
    assert!(content.contains("\"newest\""));

    let figment = Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(&content));
    assert_eq!(Config::from_figment(figment).unwrap(), config);
}
