//! Output formatting tests

use xml_compare::{Output, OutputFormat, VerbosityLevel, compare};

use crate::common::test_helpers::{TestFixtures, lenient_settings};

fn fixture_diff() -> xml_compare::AggregateDiff {
    let fixtures = TestFixtures::new();
    compare(
        &fixtures.load("compare1.xml"),
        &fixtures.load("compare2.xml"),
        &lenient_settings(),
    )
    .unwrap()
}

#[test]
fn test_human_report_lists_every_difference() {
    let output = Output::new(VerbosityLevel::Normal).with_colors(false);
    let report = output.format_diff(&fixture_diff(), OutputFormat::Human).unwrap();

    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[0], "✗ DIFFERENT  5 differences");
    assert_eq!(
        lines[1],
        "  DIFFERENT attribute value at /doc/sect1/header/@style: expected 'bold' but was 'none'"
    );
    assert!(lines[4].starts_with("  MISSING element at /doc/sect1/body/p[2]"));
    // The unexpected subtree is rendered verbatim, including its line breaks
    assert!(lines[5].starts_with("  UNEXPECTED element at /doc/sect2/body: unexpected <body>"));
    assert!(report.contains("<p>A body which does not exist in other document.</p>"));
}

#[test]
fn test_summary_report() {
    let output = Output::new(VerbosityLevel::Normal).with_colors(false);
    let report = output.format_diff(&fixture_diff(), OutputFormat::Summary).unwrap();

    assert!(report.contains("  DIFFERENT: 3\n"));
    assert!(report.contains("  MISSING: 1\n"));
    assert!(report.contains("  UNEXPECTED: 1\n"));
    assert!(report.contains("  Tolerated: 1\n"));
}

#[test]
fn test_json_report() {
    let output = Output::new(VerbosityLevel::Quiet).with_colors(false);
    let report = output.format_diff(&fixture_diff(), OutputFormat::Json).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report).unwrap();

    assert_eq!(json["equal"], false);
    let details = json["details"].as_array().unwrap();
    assert_eq!(details.len(), 5);
    assert_eq!(details[3]["kind"], "missing");
    assert_eq!(details[3]["object_classifier"], "element");
    assert_eq!(details[3]["locator_of_expected"], "/doc/sect1/body/p[2]");
    assert!(details[3]["locator_of_actual"].is_null());
    assert_eq!(details[3]["expected_value"], "<p>This is more text.</p>");
}
