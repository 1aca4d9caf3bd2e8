//! Report rendering
//!
//! Turns an [`AggregateDiff`] into human-readable, summary or JSON text.

use crate::aggregator::AggregateDiff;
use crate::classifier::{DiffDetail, DiffKind};
use crate::cli::{OutputFormat, VerbosityLevel};

/// Formatter for comparison reports
pub struct Output {
    verbosity: VerbosityLevel,
    show_colors: bool,
}

impl Output {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn with_colors(mut self, show_colors: bool) -> Self {
        self.show_colors = show_colors;
        self
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn format_diff(&self, result: &AggregateDiff, format: OutputFormat) -> serde_json::Result<String> {
        match format {
            OutputFormat::Human => Ok(self.format_human(result)),
            OutputFormat::Summary => Ok(self.format_summary(result)),
            OutputFormat::Json => self.format_json(result),
        }
    }

    pub fn format_human(&self, result: &AggregateDiff) -> String {
        let mut output = self.verdict(result);
        output.push('\n');

        if self.verbosity == VerbosityLevel::Quiet {
            return output;
        }

        for detail in result {
            output.push_str(&format!("  {}\n", self.format_detail(detail)));
        }

        if self.verbosity >= VerbosityLevel::Verbose {
            output.push_str(&format!("Tolerated differences: {}\n", result.tolerated()));
        }
        output
    }

    pub fn format_summary(&self, result: &AggregateDiff) -> String {
        let mut output = self.verdict(result);
        output.push('\n');

        if self.verbosity == VerbosityLevel::Quiet {
            return output;
        }

        for (kind, color) in [
            (DiffKind::Different, "33"),
            (DiffKind::Missing, "31"),
            (DiffKind::Unexpected, "36"),
        ] {
            let count = result.of_kind(kind).count();
            if count > 0 {
                output.push_str(&format!(
                    "  {} {}\n",
                    self.colorize(&format!("{}:", kind), color),
                    count
                ));
            }
        }
        output.push_str(&format!("  Tolerated: {}\n", result.tolerated()));
        output
    }

    pub fn format_json(&self, result: &AggregateDiff) -> serde_json::Result<String> {
        serde_json::to_string_pretty(result)
    }

    fn verdict(&self, result: &AggregateDiff) -> String {
        if result.is_equal() {
            self.colorize("✓ EQUAL", "32")
        } else {
            format!(
                "{}  {} difference{}",
                self.colorize("✗ DIFFERENT", "31"),
                result.len(),
                if result.len() == 1 { "" } else { "s" }
            )
        }
    }

    fn format_detail(&self, detail: &DiffDetail) -> String {
        let color = match detail.kind {
            DiffKind::Different => "33",
            DiffKind::Missing => "31",
            DiffKind::Unexpected => "36",
        };
        let rendered = detail.to_string();
        let kind = detail.kind.to_string();
        match rendered.strip_prefix(kind.as_str()) {
            Some(rest) => format!("{}{}", self.colorize(&kind, color), rest),
            None => rendered,
        }
    }
}
