//! Comparison engine tests
//!
//! Exercises `compare` and `is_equal` through the public API with inline
//! documents and the fixture files.

use rayon::prelude::*;

use xml_compare::{
    AggregateDiff, ComparisonSettings, DiffKind, DocumentError, Element, EvaluationError,
    ObjectClassifier, compare, document, is_equal,
};

use crate::common::test_helpers::{TestFixtures, lenient_settings, parse};

fn rendered(result: &AggregateDiff) -> Vec<String> {
    let mut lines: Vec<String> = result.iter().map(|detail| detail.to_string()).collect();
    lines.sort();
    lines
}

#[test]
fn test_document_equals_itself() {
    let fixtures = TestFixtures::new();
    for name in ["compare1.xml", "compare2.xml", "compare3.xml", "catalog_actual.xml"] {
        let doc = fixtures.load(name);
        let result = compare(&doc, &doc, &ComparisonSettings::default()).unwrap();
        assert!(result.is_equal(), "{} differs from itself: {:?}", name, rendered(&result));
        assert_eq!(result.tolerated(), 0);
    }
}

#[test]
fn test_fixture_diffs() {
    let fixtures = TestFixtures::new();
    let expected = fixtures.load("compare1.xml");
    let actual = fixtures.load("compare2.xml");

    let result = compare(&expected, &actual, &lenient_settings()).unwrap();

    assert_eq!(result.len(), 5, "{:?}", rendered(&result));
    assert_eq!(result.tolerated(), 1);

    let details = result.details();
    assert_eq!(details[0].kind, DiffKind::Different);
    assert_eq!(details[0].object_classifier, ObjectClassifier::AttributeValue);
    assert_eq!(
        details[0].locator().unwrap().to_string(),
        "/doc/sect1/header/@style"
    );

    assert_eq!(details[1].object_classifier, ObjectClassifier::ElementText);
    assert_eq!(
        details[1].locator().unwrap().to_string(),
        "/doc/sect1/header/text()"
    );
    assert_eq!(details[1].expected_value.as_ref().unwrap().to_string(), "Some header");
    assert_eq!(details[1].actual_value.as_ref().unwrap().to_string(), "Some Header");

    assert_eq!(
        details[2].locator_of_expected.as_ref().unwrap().to_string(),
        "/doc/sect1/body/p[1]/text()"
    );
    assert_eq!(
        details[2].locator_of_actual.as_ref().unwrap().to_string(),
        "/doc/sect1/body/p/text()"
    );

    assert_eq!(details[3].kind, DiffKind::Missing);
    assert_eq!(details[3].object_classifier, ObjectClassifier::Element);
    assert_eq!(
        details[3].locator().unwrap().to_string(),
        "/doc/sect1/body/p[2]"
    );
    assert_eq!(
        details[3].expected_value.as_ref().unwrap().to_string(),
        "<p>This is more text.</p>"
    );

    assert_eq!(details[4].kind, DiffKind::Unexpected);
    assert_eq!(details[4].locator().unwrap().to_string(), "/doc/sect2/body");
    assert!(details[4].locator_of_expected.is_none());
}

#[test]
fn test_swapping_documents_mirrors_diffs() {
    let fixtures = TestFixtures::new();
    let first = fixtures.load("compare1.xml");
    let second = fixtures.load("compare2.xml");
    let settings = lenient_settings();

    let forward = compare(&first, &second, &settings).unwrap();
    let backward = compare(&second, &first, &settings).unwrap();

    let mut mirrored: Vec<String> = forward
        .iter()
        .map(|detail| detail.mirrored().to_string())
        .collect();
    mirrored.sort();
    assert_eq!(mirrored, rendered(&backward));
    assert_eq!(forward.tolerated(), backward.tolerated());
}

#[test]
fn test_attribute_diffs() {
    let expected = parse(r#"<doc a="1" b="2"/>"#);
    let actual = parse(r#"<doc a="1" c="3"/>"#);

    let result = compare(&expected, &actual, &ComparisonSettings::default()).unwrap();
    let kinds: Vec<(DiffKind, String)> = result
        .iter()
        .map(|detail| (detail.kind, detail.locator().unwrap().to_string()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (DiffKind::Missing, "/doc/@b".to_string()),
            (DiffKind::Unexpected, "/doc/@c".to_string()),
        ]
    );
    assert!(
        result
            .iter()
            .all(|detail| detail.object_classifier == ObjectClassifier::Attribute)
    );
}

#[test]
fn test_attribute_order_is_irrelevant() {
    let expected = parse(r#"<doc a="1" b="2"/>"#);
    let actual = parse(r#"<doc b="2" a="1"/>"#);
    assert!(is_equal(&expected, &actual, &ComparisonSettings::default()).unwrap());
}

#[test]
fn test_whitespace_policy() {
    let expected = parse("<doc><p>some  text</p></doc>");
    let actual = parse("<doc><p>\n  some text\n</p></doc>");

    let strict = compare(&expected, &actual, &ComparisonSettings::default()).unwrap();
    assert_eq!(strict.len(), 1);
    assert_eq!(
        strict.details()[0].locator().unwrap().to_string(),
        "/doc/p/text()"
    );

    let lenient = ComparisonSettings::builder()
        .whitespace_relevant(false)
        .build()
        .unwrap();
    assert!(compare(&expected, &actual, &lenient).unwrap().is_equal());
}

#[test]
fn test_attribute_values_ignore_whitespace_policy() {
    let expected = parse(r#"<doc a="x y"/>"#);
    let actual = parse(r#"<doc a="x  y"/>"#);
    let lenient = ComparisonSettings::builder()
        .whitespace_relevant(false)
        .build()
        .unwrap();
    assert!(!is_equal(&expected, &actual, &lenient).unwrap());
}

#[test]
fn test_subtree_tolerance() {
    let expected = parse("<doc><head>a</head><body><p>1</p></body></doc>");
    let actual = parse(r#"<doc><head>a</head><body x="1"><p>2</p><q/></body></doc>"#);

    let settings = ComparisonSettings::builder()
        .tolerate_any_diff_at("/doc/body")
        .build()
        .unwrap();
    let result = compare(&expected, &actual, &settings).unwrap();
    assert!(result.is_equal());
    assert_eq!(result.tolerated(), 3);
}

#[test]
fn test_exact_tolerance_is_kind_and_location_specific() {
    let expected = parse("<doc><p>1</p></doc>");
    let actual = parse("<doc><p>2</p><extra/></doc>");

    let wrong_kind = ComparisonSettings::builder()
        .tolerate_missing_at("/doc/extra")
        .build()
        .unwrap();
    assert_eq!(compare(&expected, &actual, &wrong_kind).unwrap().len(), 2);

    let ancestor_only = ComparisonSettings::builder()
        .tolerate_different_at("/doc/p")
        .build()
        .unwrap();
    assert_eq!(compare(&expected, &actual, &ancestor_only).unwrap().len(), 2);

    let exact = ComparisonSettings::builder()
        .tolerate_unexpected_at("/doc/extra")
        .tolerate_different_at("/doc/p/text()")
        .build()
        .unwrap();
    let result = compare(&expected, &actual, &exact).unwrap();
    assert!(result.is_equal());
    assert_eq!(result.tolerated(), 2);
}

#[test]
fn test_descendant_pattern_tolerance() {
    let expected = parse(r#"<doc><a stamp="1"/><b><c stamp="2"/></b></doc>"#);
    let actual = parse(r#"<doc><a stamp="3"/><b><c stamp="4"/></b></doc>"#);

    let settings = ComparisonSettings::builder()
        .tolerate_different_at("//@stamp")
        .build()
        .unwrap();
    assert!(is_equal(&expected, &actual, &settings).unwrap());
}

#[test]
fn test_keyed_alignment_on_catalog() {
    let fixtures = TestFixtures::new();
    let expected = fixtures.load("catalog_expected.xml");
    let actual = fixtures.load("catalog_actual.xml");

    let positional = compare(&expected, &actual, &ComparisonSettings::default()).unwrap();
    assert_eq!(positional.len(), 9);

    let keyed_settings = ComparisonSettings::builder()
        .add_key_expression("item", "@id")
        .build()
        .unwrap();
    let keyed = compare(&expected, &actual, &keyed_settings).unwrap();

    assert_eq!(keyed.len(), 1, "{:?}", rendered(&keyed));
    let detail = &keyed.details()[0];
    assert_eq!(detail.kind, DiffKind::Different);
    assert_eq!(
        detail.locator_of_expected.as_ref().unwrap().to_string(),
        "/catalog/item[2]/price/text()"
    );
    assert_eq!(
        detail.locator_of_actual.as_ref().unwrap().to_string(),
        "/catalog/item[3]/price/text()"
    );
    assert_eq!(detail.expected_value.as_ref().unwrap().to_string(), "20");
    assert_eq!(detail.actual_value.as_ref().unwrap().to_string(), "25");
}

#[test]
fn test_composite_key_expression() {
    let expected = parse(
        r#"<list><e a="1" b="x">one</e><e a="1" b="y">two</e></list>"#,
    );
    let actual = parse(
        r#"<list><e a="1" b="y">two</e><e a="1" b="x">one</e></list>"#,
    );

    let settings = ComparisonSettings::builder()
        .add_key_expression("e", "concat(@a, '/', @b)")
        .build()
        .unwrap();
    assert!(is_equal(&expected, &actual, &settings).unwrap());

    let first_attribute_only = ComparisonSettings::builder()
        .add_key_expression("e", "@a")
        .build()
        .unwrap();
    assert!(!is_equal(&expected, &actual, &first_attribute_only).unwrap());
}

#[test]
fn test_unkeyed_instances_fall_back_to_position() {
    let expected = parse(r#"<list><e id="1">a</e><e>b</e></list>"#);
    let actual = parse(r#"<list><e>b</e><e id="1">a</e></list>"#);

    let settings = ComparisonSettings::builder()
        .add_key_expression("e", "@id")
        .build()
        .unwrap();
    assert!(is_equal(&expected, &actual, &settings).unwrap());
}

#[test]
fn test_root_name_mismatch() {
    let expected = parse("<doc><p/></doc>");
    let actual = parse("<document><p/></document>");

    let result = compare(&expected, &actual, &ComparisonSettings::default()).unwrap();
    let kinds: Vec<DiffKind> = result.iter().map(|detail| detail.kind).collect();
    assert_eq!(kinds, vec![DiffKind::Missing, DiffKind::Unexpected]);
}

#[test]
fn test_is_equal_agrees_with_compare() {
    let fixtures = TestFixtures::new();
    let pairs = [
        ("compare1.xml", "compare2.xml"),
        ("compare1.xml", "compare3.xml"),
        ("catalog_expected.xml", "catalog_actual.xml"),
    ];
    let settings = lenient_settings();
    for (first, second) in pairs {
        let expected = fixtures.load(first);
        let actual = fixtures.load(second);
        assert_eq!(
            is_equal(&expected, &actual, &settings).unwrap(),
            compare(&expected, &actual, &settings).unwrap().is_equal()
        );
    }
}

#[test]
fn test_depth_guard() {
    let depth = 40;
    let text = format!("{}{}", "<n>".repeat(depth), "</n>".repeat(depth));
    let deep = parse(&text);

    let shallow = ComparisonSettings::builder().max_depth(10).build().unwrap();
    match compare(&deep, &deep, &shallow) {
        Err(EvaluationError::DepthLimitExceeded { limit, .. }) => assert_eq!(limit, 10),
        other => panic!("Expected depth limit error, got {:?}", other),
    }

    assert!(compare(&deep, &deep, &ComparisonSettings::default()).unwrap().is_equal());
}

#[test]
fn test_deep_unpaired_subtree_stays_off_the_stack() {
    let mut subtree = Element::new("leaf");
    for _ in 0..20_000 {
        subtree = Element::new("n").with_child(subtree);
    }
    let expected = Element::new("doc").with_child(subtree);
    let actual = parse("<doc/>");

    let result = compare(&expected, &actual, &ComparisonSettings::default()).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.details()[0].kind, DiffKind::Missing);
    assert!(!is_equal(&actual, &expected, &ComparisonSettings::default()).unwrap());

    let depth = 20_000;
    let text = format!("<doc>{}{}</doc>", "<n>".repeat(depth), "</n>".repeat(depth));
    assert!(matches!(
        document::parse_str(&text),
        Err(DocumentError::NestingTooDeep { .. })
    ));
}

#[test]
fn test_settings_shared_across_threads() {
    let fixtures = TestFixtures::new();
    let expected = fixtures.load("compare1.xml");
    let actual = fixtures.load("compare2.xml");
    let settings = lenient_settings();

    let counts: Vec<usize> = (0..16)
        .into_par_iter()
        .map(|_| compare(&expected, &actual, &settings).unwrap().len())
        .collect();
    assert!(counts.iter().all(|&count| count == 5));
}

#[test]
fn test_single_attribute_value_scenario() {
    let expected = parse(r#"<doc a="1"/>"#);
    let actual = parse(r#"<doc a="2"/>"#);

    let result = compare(&expected, &actual, &ComparisonSettings::default()).unwrap();
    assert_eq!(result.len(), 1);
    let detail = &result.details()[0];
    assert_eq!(detail.kind, DiffKind::Different);
    assert_eq!(detail.object_classifier.as_str(), "attribute value");
    assert_eq!(detail.locator_of_expected.as_ref().unwrap().to_string(), "/doc/@a");
    assert_eq!(detail.locator_of_actual.as_ref().unwrap().to_string(), "/doc/@a");
    assert_eq!(detail.expected_value.as_ref().unwrap().to_string(), "1");
    assert_eq!(detail.actual_value.as_ref().unwrap().to_string(), "2");
}

#[test]
fn test_reordered_keyed_list_has_no_diffs() {
    let expected = parse(r#"<list><item id="1">a</item><item id="2">b</item><item id="3">c</item></list>"#);
    let actual = parse(r#"<list><item id="3">c</item><item id="1">a</item><item id="2">b</item></list>"#);

    let keyed = ComparisonSettings::builder()
        .add_key_expression("item", "@id")
        .build()
        .unwrap();
    assert!(compare(&expected, &actual, &keyed).unwrap().is_equal());
    assert!(!compare(&expected, &actual, &ComparisonSettings::default()).unwrap().is_equal());
}

#[test]
fn test_subtree_tolerance_leaves_siblings_alone() {
    let expected = parse("<doc><header>a</header><body><p>1</p></body></doc>");
    let actual = parse("<doc><header>b</header><body><q/></body></doc>");

    let settings = ComparisonSettings::builder()
        .tolerate_any_diff_at("/doc/body")
        .build()
        .unwrap();
    let result = compare(&expected, &actual, &settings).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(
        result.details()[0].locator().unwrap().to_string(),
        "/doc/header/text()"
    );
}
