// expiry-labels: Generate and print sheets of manufacture/best-before date labels

mod cli;
mod dates;
mod document;
mod error;
mod interactive;
mod label;
mod layout;
mod print;
mod session;

use clap::Parser;
use std::io::{self, BufReader};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use cli::{Args, Settings};
use dates::{Clock, FixedClock, SystemClock};
use error::AppError;
use layout::LayoutPlan;
use print::{CommandPrinter, PrintDispatcher};
use session::Session;

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("expiry_labels={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), AppError> {
    let settings = Settings::from_args(args)?;
    tracing::debug!("{:?}", settings);

    let clock: Box<dyn Clock> = match settings.date {
        Some(date) => Box::new(FixedClock(date)),
        None => Box::new(SystemClock),
    };
    let plan = LayoutPlan::a4_square_labels()?;
    tracing::debug!(
        "Layout: {}x{} labels per page, margins {:.1}mm/{:.1}mm",
        plan.labels_per_row,
        plan.labels_per_column,
        plan.margin_left,
        plan.margin_top
    );
    let printer = CommandPrinter::parse(&settings.print_command)?;
    let dispatcher = PrintDispatcher::new(Box::new(printer), settings.release_delay);
    let mut session = Session::new(clock, plan, dispatcher, settings.output_dir.clone())?;

    match (&settings.count, settings.interactive) {
        (Some(count), false) => run_once(&mut session, count, &settings),
        (count, _) => {
            if let Some(count) = count {
                if let Err(e) = session.set_count_input(count) {
                    eprintln!("Error: {}", e);
                }
            }
            let stdin = BufReader::new(io::stdin());
            let mut stdout = io::stdout();
            interactive::run(
                &mut session,
                stdin,
                &mut stdout,
                interactive::DATE_REFRESH_INTERVAL,
            )
        }
    }
}

fn run_once(session: &mut Session, count: &str, settings: &Settings) -> Result<(), AppError> {
    session.set_count_input(count)?;
    let summary = session.generate()?;

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        if let Some(file) = &summary.file {
            println!("✓ Generated: {}", file.display());
        }
        println!(
            "  Labels: {} on {} page(s)",
            summary.label_count, summary.pages
        );
        println!("  MFG: {}", summary.mfg_date);
        println!("  BEST BEFORE: {}", summary.exp_date);
    }

    if settings.print {
        session.print(Instant::now())?;
        if !settings.json {
            println!("✓ Sent to printer");
        }
        session.shutdown();
    }

    Ok(())
}
