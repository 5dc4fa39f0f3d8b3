// expiry-labels: command-line arguments and settings

use chrono::NaiveDate;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

use crate::dates::parse_date;
use crate::error::AppError;
use crate::print::{DEFAULT_PRINT_COMMAND, DEFAULT_RELEASE_DELAY};

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate printable sheets of manufacture/best-before date labels"
)]
pub struct Args {
    /// Number of labels to generate (starts an interactive session when omitted)
    #[arg(short, long)]
    pub count: Option<String>,

    /// Manufacture date (YYYY-MM-DD format, defaults to today)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Directory the generated PDF is saved into
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Send the generated PDF to the printer
    #[arg(short, long)]
    pub print: bool,

    /// Command used to print; the PDF path is appended as the last argument
    #[arg(long, default_value = DEFAULT_PRINT_COMMAND)]
    pub print_command: String,

    /// How long the temporary print copy is kept after printing starts
    #[arg(long, default_value_t = DEFAULT_RELEASE_DELAY.as_millis() as u64)]
    pub release_delay_ms: u64,

    /// Keep a session open and read commands from stdin
    #[arg(short, long)]
    pub interactive: bool,

    /// Print the generation summary as JSON
    #[arg(long)]
    pub json: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Validated run configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub count: Option<String>,
    pub date: Option<NaiveDate>,
    pub output_dir: PathBuf,
    pub print: bool,
    pub print_command: String,
    pub release_delay: Duration,
    pub interactive: bool,
    pub json: bool,
}

impl Settings {
    pub fn from_args(args: Args) -> Result<Self, AppError> {
        let date = parse_date(&args.date)?;
        let interactive = args.interactive || args.count.is_none();

        Ok(Self {
            count: args.count,
            date,
            output_dir: args.output_dir,
            print: args.print,
            print_command: args.print_command,
            release_delay: Duration::from_millis(args.release_delay_ms),
            interactive,
            json: args.json,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(argv: &[&str]) -> Result<Settings, AppError> {
        let args = Args::try_parse_from(std::iter::once("expiry-labels").chain(argv.iter().copied()))
            .unwrap();
        Settings::from_args(args)
    }

    #[test]
    fn count_selects_one_shot_mode() {
        let s = settings(&["--count", "12", "-o", "out"]).unwrap();
        assert_eq!(s.count.as_deref(), Some("12"));
        assert!(!s.interactive);
        assert_eq!(s.output_dir, PathBuf::from("out"));
        assert_eq!(s.release_delay, DEFAULT_RELEASE_DELAY);
        assert_eq!(s.print_command, DEFAULT_PRINT_COMMAND);
    }

    #[test]
    fn release_delay_can_be_overridden() {
        let s = settings(&["-c", "1", "--release-delay-ms", "0"]).unwrap();
        assert_eq!(s.release_delay, Duration::ZERO);
    }

    #[test]
    fn no_count_means_interactive() {
        assert!(settings(&[]).unwrap().interactive);
        assert!(settings(&["-c", "3", "-i"]).unwrap().interactive);
    }

    #[test]
    fn date_override_is_validated() {
        let s = settings(&["-c", "1", "-d", "2024-01-20"]).unwrap();
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2024, 1, 20));
        assert!(matches!(
            settings(&["-c", "1", "-d", "20/01/2024"]),
            Err(AppError::Date(_))
        ));
    }
}
