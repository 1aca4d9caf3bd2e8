//! Configuration tests
//!
//! Loads comparison profiles from disk and runs the compiled settings
//! against the fixtures.

use tempfile::TempDir;
use tokio::fs;

use xml_compare::config::{ConfigError, ConfigManager, OutputFormatConfig, ToleranceConfig};
use xml_compare::{Config, DiffKind, compare};

use crate::common::test_helpers::TestFixtures;

const FIXTURE_PROFILE: &str = r#"
[comparison]
whitespace_relevant = false

[[tolerate]]
path = "/doc/@timestamp"

[[tolerate]]
path = "/doc/sect1/header"

[[tolerate]]
path = "/doc/sect2/body"
kind = "unexpected"

[output]
format = "summary"
"#;

#[tokio::test]
async fn test_profile_drives_comparison() {
    let temp_dir = TempDir::new().unwrap();
    let profile = temp_dir.path().join("profile.toml");
    fs::write(&profile, FIXTURE_PROFILE).await.unwrap();

    let config = ConfigManager::load_from_file(&profile).await.unwrap();
    assert_eq!(config.output.format, OutputFormatConfig::Summary);
    assert_eq!(
        config.tolerate[2],
        ToleranceConfig::of_kind(DiffKind::Unexpected, "/doc/sect2/body")
    );

    let settings = config.to_settings().unwrap();
    let fixtures = TestFixtures::new();
    let result = compare(
        &fixtures.load("compare1.xml"),
        &fixtures.load("compare2.xml"),
        &settings,
    )
    .unwrap();

    // Only the paragraph differences survive
    assert_eq!(result.len(), 2);
    assert_eq!(result.tolerated(), 4);
    assert!(
        result
            .iter()
            .all(|detail| detail.locator().unwrap().to_string().starts_with("/doc/sect1/body/p"))
    );
}

#[tokio::test]
async fn test_json_profile_with_keys() {
    let temp_dir = TempDir::new().unwrap();
    let profile = temp_dir.path().join("profile.json");
    fs::write(&profile, r#"{ "keys": { "item": "@id" } }"#)
        .await
        .unwrap();

    let config = ConfigManager::load_from_file(&profile).await.unwrap();
    let settings = config.to_settings().unwrap();

    let fixtures = TestFixtures::new();
    let result = compare(
        &fixtures.load("catalog_expected.xml"),
        &fixtures.load("catalog_actual.xml"),
        &settings,
    )
    .unwrap();
    assert_eq!(result.len(), 1);
}

#[tokio::test]
async fn test_discovers_hidden_profile() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".xml-compare.json"),
        r#"{ "comparison": { "max_depth": 12 } }"#,
    )
    .await
    .unwrap();

    let config = ConfigManager::find_config_in(temp_dir.path())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(config.comparison.max_depth, 12);
    assert!(config.comparison.whitespace_relevant);
}

#[tokio::test]
async fn test_invalid_tolerance_path_surfaces_at_build() {
    let temp_dir = TempDir::new().unwrap();
    let profile = temp_dir.path().join("profile.toml");
    fs::write(&profile, "[[tolerate]]\npath = \"/doc/[\"\n")
        .await
        .unwrap();

    let config = ConfigManager::load_from_file(&profile).await.unwrap();
    assert!(config.to_settings().is_err());
}

#[tokio::test]
async fn test_unknown_tolerance_kind_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let profile = temp_dir.path().join("profile.toml");
    fs::write(&profile, "[[tolerate]]\npath = \"/doc\"\nkind = \"sideways\"\n")
        .await
        .unwrap();

    let result = ConfigManager::load_from_file(&profile).await;
    assert!(matches!(result, Err(ConfigError::TomlParsing(_))));
}

#[test]
fn test_default_config_matches_default_settings() {
    let settings = Config::default().to_settings().unwrap();
    assert!(settings.whitespace_relevant());
    assert!(settings.tolerance_rules().is_empty());
    assert!(settings.key_expressions().is_empty());
    assert_eq!(settings.max_depth(), xml_compare::DEFAULT_MAX_DEPTH);
}
