use xml_compare::{ComparisonSettings, DiffKind, DocumentVerifier, compare, document};

use crate::common::test_helpers::{TestFixtures, create_temp_documents, lenient_settings};

#[tokio::test]
async fn test_load_and_compare_fixtures() {
    let fixtures = TestFixtures::new();
    let (expected, actual) = tokio::try_join!(
        document::load(fixtures.compare1()),
        document::load(fixtures.compare2())
    )
    .unwrap();

    let result = compare(&expected, &actual, &lenient_settings()).unwrap();
    assert_eq!(result.of_kind(DiffKind::Different).count(), 3);
    assert_eq!(result.of_kind(DiffKind::Missing).count(), 1);
    assert_eq!(result.of_kind(DiffKind::Unexpected).count(), 1);
}

#[tokio::test]
async fn test_tolerant_verifier_accepts_reformatted_document() {
    let fixtures = TestFixtures::new();
    let verifier = DocumentVerifier::new(fixtures.compare3())
        .whitespace_relevant(false)
        .add_exclusion_path("/doc/@timestamp")
        .add_exclusion_path("/doc/sect2");

    verifier.verify_with(fixtures.compare1()).await.unwrap();
}

#[tokio::test]
async fn test_strict_verifier_rejects_changed_section() {
    let fixtures = TestFixtures::new();
    let verifier = DocumentVerifier::new(fixtures.compare3())
        .whitespace_relevant(false)
        .add_exclusion_path("/doc/@timestamp");

    match verifier.verify_with(fixtures.compare1()).await {
        Err(xml_compare::CompareError::Verification(failure)) => {
            assert!(failure.message.starts_with("The two XML documents do not match: "));
            assert!(failure.message.contains("/doc/sect2/header/text()"));
            assert!(failure.message.ends_with("(2 differences in total)"));
        }
        other => panic!("Expected verification failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_verifier_with_keys_and_tolerated_kinds() {
    let temp_dir = create_temp_documents(&[
        (
            "expected.xml",
            r#"<orders><order no="1"><total>5</total></order><order no="2"><total>7</total></order></orders>"#,
        ),
        (
            "actual.xml",
            r#"<orders><order no="2"><total>7</total></order><order no="1"><total>5</total></order><audit/></orders>"#,
        ),
    ])
    .await
    .unwrap();

    let verifier = DocumentVerifier::new(temp_dir.path().join("actual.xml"))
        .add_key_expression("order", "@no")
        .add_tolerated_diff(DiffKind::Unexpected, "/orders/audit");
    verifier
        .verify_with(temp_dir.path().join("expected.xml"))
        .await
        .unwrap();

    let unkeyed = DocumentVerifier::new(temp_dir.path().join("actual.xml"))
        .add_tolerated_diff(DiffKind::Unexpected, "/orders/audit");
    assert!(
        unkeyed
            .verify_with(temp_dir.path().join("expected.xml"))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_verifier_reports_missing_file() {
    let fixtures = TestFixtures::new();
    let verifier = DocumentVerifier::new(fixtures.path("does-not-exist.xml"));

    match verifier.verify_with(fixtures.compare1()).await {
        Err(xml_compare::CompareError::Document(xml_compare::DocumentError::Io { path, .. })) => {
            assert!(path.ends_with("does-not-exist.xml"))
        }
        other => panic!("Expected IO error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_verifier_reports_bad_settings_before_loading() {
    let verifier = DocumentVerifier::new("irrelevant.xml").add_exclusion_path("no-slash");
    assert!(matches!(
        verifier.verify_with("also-irrelevant.xml").await,
        Err(xml_compare::CompareError::Configuration(_))
    ));
}

#[test]
fn test_default_settings_are_strict() {
    let fixtures = TestFixtures::new();
    let result = compare(
        &fixtures.load("compare1.xml"),
        &fixtures.load("compare3.xml"),
        &ComparisonSettings::default(),
    )
    .unwrap();
    assert!(!result.is_equal());
    assert!(result.of_kind(DiffKind::Different).any(|detail| {
        detail.locator().unwrap().to_string() == "/doc/@timestamp"
    }));
}
