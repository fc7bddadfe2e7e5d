//! CLI argument parsing
//!
//! ```text
//! junit-insight [options] --report <report.xml>
//!
//! OPTIONS:
//!   --report <path>      JUnit XML report to enrich (required)
//!   --outcomes <path>    JSON-lines phase outcomes ("-" or absent: stdin)
//!   --config <path>      TOML config file (JJI_* env vars override it)
//!   --log-json           Emit logs as JSON
//!   --version            Show version
//!   --help               Show help
//! ```

use crate::cli::{Error, Result};
use std::path::PathBuf;

/// Where phase outcomes are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeSource {
    Stdin,
    File(PathBuf),
}

/// Parsed CLI arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    /// Report to enrich (required unless --help / --version)
    pub report: Option<PathBuf>,

    /// Phase outcome log
    pub outcomes: OutcomeSource,

    /// Optional TOML config file
    pub config: Option<PathBuf>,

    /// JSON log output
    pub log_json: bool,

    /// Show version and exit
    pub show_version: bool,

    /// Show help and exit
    pub show_help: bool,
}

/// Parse CLI arguments from std::env::args()
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut iter = args.into_iter();
    let _program = iter.next(); // Skip program name

    let mut args_out = Args {
        report: None,
        outcomes: OutcomeSource::Stdin,
        config: None,
        log_json: false,
        show_version: false,
        show_help: false,
    };

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--version" | "-v" => {
                args_out.show_version = true;
            }
            "--help" | "-h" => {
                args_out.show_help = true;
            }
            "--log-json" => {
                args_out.log_json = true;
            }
            "--report" => {
                let path = iter.next().ok_or_else(|| {
                    Error::MissingArgument("--report requires a path".to_string())
                })?;
                args_out.report = Some(PathBuf::from(path));
            }
            "--outcomes" => {
                let path = iter.next().ok_or_else(|| {
                    Error::MissingArgument("--outcomes requires a path".to_string())
                })?;
                args_out.outcomes = match path.as_str() {
                    "-" => OutcomeSource::Stdin,
                    _ => OutcomeSource::File(PathBuf::from(path)),
                };
            }
            "--config" => {
                let path = iter.next().ok_or_else(|| {
                    Error::MissingArgument("--config requires a path".to_string())
                })?;
                args_out.config = Some(PathBuf::from(path));
            }
            other => {
                return Err(Error::InvalidArgs(format!("Unknown argument: {}", other)));
            }
        }
    }

    if args_out.report.is_none() && !args_out.show_help && !args_out.show_version {
        return Err(Error::MissingArgument("--report <path>".to_string()));
    }

    Ok(args_out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        std::iter::once("junit-insight")
            .chain(items.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_report_only() {
        let parsed = parse_args(argv(&["--report", "out/report.xml"])).unwrap();
        assert_eq!(parsed.report, Some(PathBuf::from("out/report.xml")));
        assert_eq!(parsed.outcomes, OutcomeSource::Stdin);
        assert!(parsed.config.is_none());
        assert!(!parsed.log_json);
    }

    #[test]
    fn test_parse_all_options() {
        let parsed = parse_args(argv(&[
            "--report",
            "r.xml",
            "--outcomes",
            "o.jsonl",
            "--config",
            "c.toml",
            "--log-json",
        ]))
        .unwrap();
        assert_eq!(parsed.outcomes, OutcomeSource::File(PathBuf::from("o.jsonl")));
        assert_eq!(parsed.config, Some(PathBuf::from("c.toml")));
        assert!(parsed.log_json);
    }

    #[test]
    fn test_parse_dash_is_stdin() {
        let parsed = parse_args(argv(&["--report", "r.xml", "--outcomes", "-"])).unwrap();
        assert_eq!(parsed.outcomes, OutcomeSource::Stdin);
    }

    #[test]
    fn test_missing_report_is_error() {
        assert!(matches!(
            parse_args(argv(&["--log-json"])),
            Err(Error::MissingArgument(_))
        ));
    }

    #[test]
    fn test_help_without_report() {
        let parsed = parse_args(argv(&["--help"])).unwrap();
        assert!(parsed.show_help);
    }

    #[test]
    fn test_version_flag() {
        let parsed = parse_args(argv(&["-v"])).unwrap();
        assert!(parsed.show_version);
    }

    #[test]
    fn test_option_without_value() {
        assert!(parse_args(argv(&["--report"])).is_err());
    }

    #[test]
    fn test_unknown_argument() {
        assert!(matches!(
            parse_args(argv(&["--report", "r.xml", "extra"])),
            Err(Error::InvalidArgs(_))
        ));
    }
}
