use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only report whether the documents differ
    Quiet,
    /// List every surviving difference
    #[default]
    Normal,
    /// Also show tolerated counts and both locators of every difference
    Verbose,
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Summary,
}

/// Tolerant structural XML comparison
#[derive(Parser, Debug, Clone)]
#[command(name = "xml-compare")]
#[command(about = "Compare an actual XML document against an expected one within declared tolerances")]
#[command(version)]
pub struct Cli {
    /// Expected (reference) document
    #[arg(help = "Expected XML document")]
    pub expected: PathBuf,

    /// Actual document
    #[arg(help = "Actual XML document")]
    pub actual: PathBuf,

    /// Comparison profile (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Trim and collapse whitespace in element text before comparing
    #[arg(short = 'w', long = "ignore-whitespace")]
    pub ignore_whitespace: bool,

    /// Ignore any difference inside the subtree at PATH
    #[arg(long = "tolerate", value_name = "PATH", action = clap::ArgAction::Append)]
    pub tolerate: Vec<String>,

    /// Ignore a DIFFERENT diff exactly at PATH
    #[arg(long = "tolerate-different", value_name = "PATH", action = clap::ArgAction::Append)]
    pub tolerate_different: Vec<String>,

    /// Ignore a MISSING diff exactly at PATH
    #[arg(long = "tolerate-missing", value_name = "PATH", action = clap::ArgAction::Append)]
    pub tolerate_missing: Vec<String>,

    /// Ignore an UNEXPECTED diff exactly at PATH
    #[arg(long = "tolerate-unexpected", value_name = "PATH", action = clap::ArgAction::Append)]
    pub tolerate_unexpected: Vec<String>,

    /// Identity key expression for an element name
    #[arg(
        short = 'k',
        long = "key",
        value_name = "ELEMENT=EXPR",
        value_parser = parse_key_arg,
        action = clap::ArgAction::Append
    )]
    pub keys: Vec<(String, String)>,

    /// Maximum element nesting depth
    #[arg(long = "max-depth")]
    pub max_depth: Option<usize>,

    /// Report format
    #[arg(short = 'f', long = "format", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> Result<(), String> {
        for path in [&self.expected, &self.actual] {
            if !path.is_file() {
                return Err(format!("File does not exist: {}", path.display()));
            }
        }
        if self.max_depth == Some(0) {
            return Err("Maximum depth must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Splits `ELEMENT=EXPR` at the first `=`
pub fn parse_key_arg(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((element, expression)) if !element.trim().is_empty() && !expression.trim().is_empty() => {
            Ok((element.trim().to_string(), expression.trim().to_string()))
        }
        _ => Err(format!("expected ELEMENT=EXPR, got '{}'", arg)),
    }
}
