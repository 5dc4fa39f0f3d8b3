// expiry-labels: interactive session over stdin

use std::io::{BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::AppError;
use crate::session::Session;

/// How often the displayed dates are recomputed.
pub const DATE_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

const HELP: &str = "\
Commands:
  count <n>   set the number of labels (a bare number works too)
  generate    build and save the label PDF
  print       send the last generated PDF to the printer
  dates       show the current manufacture/expiration dates
  status      show which actions are available
  help        show this message
  quit        leave";

// ============================================================================
// Refresh Schedule
// ============================================================================

/// Periodic task that only runs between `start` and `stop`.
#[derive(Debug)]
pub struct RefreshSchedule {
    interval: Duration,
    next_due: Option<Instant>,
}

impl RefreshSchedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// True when a tick is due; the next one is then scheduled from `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Count(String),
    Generate,
    Print,
    Dates,
    Status,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "count" | "c" => Command::Count(rest.to_string()),
        "generate" | "g" => Command::Generate,
        "print" | "p" => Command::Print,
        "dates" | "d" => Command::Dates,
        "status" | "s" => Command::Status,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ if word.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+') => {
            Command::Count(line.to_string())
        }
        _ => return None,
    };
    Some(command)
}

// ============================================================================
// Event Loop
// ============================================================================

pub fn write_dates<W: Write>(session: &Session, out: &mut W) -> Result<(), AppError> {
    let dates = session.dates();
    writeln!(out, "Manufacture date: {}", dates.mfg)?;
    writeln!(out, "Expiration date:  {}", dates.exp)?;
    Ok(())
}

fn write_status<W: Write>(session: &Session, out: &mut W) -> Result<(), AppError> {
    let on_off = |enabled: bool| if enabled { "enabled" } else { "disabled" };
    match session.count() {
        Some(count) => writeln!(out, "Label count: {}", count)?,
        None => writeln!(out, "Label count: (not set)")?,
    }
    writeln!(out, "State: {}", session.state())?;
    writeln!(
        out,
        "Generate: {}, Print: {}",
        on_off(session.can_generate()),
        on_off(session.can_print())
    )?;
    writeln!(out, "Output directory: {}", session.output_dir().display())?;
    if let Some(document) = session.document() {
        writeln!(
            out,
            "Last PDF: {} ({} labels, MFG {})",
            document.file_name(),
            document.label_count(),
            document.dates().mfg
        )?;
    }
    Ok(())
}

fn handle<W: Write>(session: &mut Session, command: Command, out: &mut W) -> Result<(), AppError> {
    match command {
        Command::Count(input) => match session.set_count_input(&input) {
            Ok(count) => writeln!(out, "Label count set to {}.", count)?,
            Err(e) => writeln!(out, "Error: {}", e)?,
        },
        Command::Generate => match session.generate() {
            Ok(summary) => {
                writeln!(out, "{}", summary)?;
                write_dates(session, out)?;
            }
            Err(e @ AppError::MissingCount) => {
                tracing::debug!("Generate ignored: {}", e);
                writeln!(out, "Error: {}", e)?;
            }
            Err(e) => writeln!(out, "Error generating PDF. Please try again. ({})", e)?,
        },
        Command::Print => match session.print(Instant::now()) {
            Ok(_) => writeln!(out, "Print job sent.")?,
            Err(e) => writeln!(out, "Error: {}", e)?,
        },
        Command::Dates => write_dates(session, out)?,
        Command::Status => write_status(session, out)?,
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Quit => {}
    }
    Ok(())
}

/// Runs commands from `input` until `quit` or end of input. Dates refresh on
/// `refresh_interval` while the loop is alive.
pub fn run<R, W>(
    session: &mut Session,
    input: R,
    out: &mut W,
    refresh_interval: Duration,
) -> Result<(), AppError>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut schedule = RefreshSchedule::new(refresh_interval);
    schedule.start(Instant::now());
    tracing::debug!("Date refresh every {:?}", refresh_interval);

    write_dates(session, out)?;
    writeln!(out, "Type 'help' for commands.")?;
    out.flush()?;

    loop {
        let now = Instant::now();
        session.poll(now);
        if schedule.poll(now) {
            match session.refresh_dates() {
                Ok(true) => write_dates(session, out)?,
                Ok(false) => {}
                Err(e) => writeln!(out, "Error: {}", e)?,
            }
        }

        let deadline = [schedule.next_due(), session.next_deadline()]
            .into_iter()
            .flatten()
            .min();
        let timeout = deadline
            .map(|d| d.saturating_duration_since(now))
            .unwrap_or(refresh_interval);

        match rx.recv_timeout(timeout) {
            Ok(line) => {
                match parse_command(&line) {
                    Some(Command::Quit) => break,
                    Some(command) => handle(session, command, out)?,
                    None if line.trim().is_empty() => {}
                    None => writeln!(out, "Unknown command: {}", line.trim())?,
                }
                out.flush()?;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    schedule.stop();
    session.shutdown();
    Ok(())
}
