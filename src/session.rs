// expiry-labels: session state and the generate/print state machine

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::dates::{compute_dates, Clock, LabelDates};
use crate::document::{generate_document, GeneratedDocument, LabelCount};
use crate::error::AppError;
use crate::layout::LayoutPlan;
use crate::print::{PrintDispatcher, PrintJob};

/// Which actions the user can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    /// No valid label count; generate and print are disabled.
    Empty,
    /// Valid count, nothing generated yet (or print disabled again).
    Ready,
    Generating,
    /// A document is held and can be printed.
    Generated,
}

impl fmt::Display for UiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UiState::Empty => "waiting for a label count",
            UiState::Ready => "ready to generate",
            UiState::Generating => "generating",
            UiState::Generated => "ready to print",
        };
        f.write_str(text)
    }
}

/// Result of a successful generation, shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub label_count: usize,
    pub pages: usize,
    pub labels_per_page: usize,
    pub mfg_date: String,
    pub exp_date: String,
    pub file: Option<PathBuf>,
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PDF generated successfully!")?;
        write!(
            f,
            "{} labels created using {} page(s).",
            self.label_count, self.pages
        )?;
        if let Some(file) = &self.file {
            write!(f, "\nSaved: {}", file.display())?;
        }
        Ok(())
    }
}

/// Everything the user's actions read and mutate: current dates, the label
/// count, the held document and any print still in flight.
pub struct Session {
    clock: Box<dyn Clock>,
    plan: LayoutPlan,
    dispatcher: PrintDispatcher,
    output_dir: PathBuf,
    state: UiState,
    count: Option<LabelCount>,
    dates: LabelDates,
    document: Option<GeneratedDocument>,
    pending_print: Option<PrintJob>,
}

impl Session {
    pub fn new(
        clock: Box<dyn Clock>,
        plan: LayoutPlan,
        dispatcher: PrintDispatcher,
        output_dir: PathBuf,
    ) -> Result<Self, AppError> {
        let dates = compute_dates(&clock.today())?;
        Ok(Self {
            clock,
            plan,
            dispatcher,
            output_dir,
            state: UiState::Empty,
            count: None,
            dates,
            document: None,
            pending_print: None,
        })
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn dates(&self) -> &LabelDates {
        &self.dates
    }

    pub fn count(&self) -> Option<LabelCount> {
        self.count
    }

    pub fn document(&self) -> Option<&GeneratedDocument> {
        self.document.as_ref()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn can_generate(&self) -> bool {
        matches!(self.state, UiState::Ready | UiState::Generated)
    }

    pub fn can_print(&self) -> bool {
        self.state == UiState::Generated
    }

    /// Applies new label-count input. Invalid input disables both actions.
    pub fn set_count_input(&mut self, input: &str) -> Result<LabelCount, AppError> {
        match LabelCount::parse(input) {
            Ok(count) => {
                self.count = Some(count);
                if self.state == UiState::Empty {
                    self.state = UiState::Ready;
                }
                Ok(count)
            }
            Err(e) => {
                self.count = None;
                self.state = UiState::Empty;
                Err(e)
            }
        }
    }

    /// Recomputes the displayed dates. Returns whether they changed.
    pub fn refresh_dates(&mut self) -> Result<bool, AppError> {
        let dates = compute_dates(&self.clock.today())?;
        let changed = dates != self.dates;
        if changed {
            tracing::info!("Dates rolled over to MFG {} / EXP {}", dates.mfg, dates.exp);
        }
        self.dates = dates;
        Ok(changed)
    }

    /// Builds and saves a new document, replacing the held one on success.
    /// A failed attempt keeps whatever document was held before.
    pub fn generate(&mut self) -> Result<GenerationSummary, AppError> {
        let count = match (self.state, self.count) {
            (UiState::Generating, _) => {
                return Err(AppError::Busy("a generation is already in progress"))
            }
            (UiState::Empty, _) | (_, None) => return Err(AppError::MissingCount),
            (_, Some(count)) => count,
        };

        self.refresh_dates()?;
        self.state = UiState::Generating;
        tracing::info!("Generating {} labels", count);

        match self.build(count) {
            Ok(document) => {
                let summary = GenerationSummary {
                    label_count: count.get(),
                    pages: document.page_count(),
                    labels_per_page: self.plan.labels_per_page,
                    mfg_date: self.dates.mfg.clone(),
                    exp_date: self.dates.exp.clone(),
                    file: document.saved_path().map(Path::to_path_buf),
                };
                self.document = Some(document);
                self.state = UiState::Generated;
                Ok(summary)
            }
            Err(e) => {
                tracing::error!("Error generating PDF: {}", e);
                self.state = if self.document.is_some() {
                    UiState::Generated
                } else {
                    UiState::Ready
                };
                Err(e)
            }
        }
    }

    fn build(&self, count: LabelCount) -> Result<GeneratedDocument, AppError> {
        let mut document = generate_document(count, &self.dates, &self.plan)?;
        document.save_to(&self.output_dir)?;
        Ok(document)
    }

    /// Sends the held document to the printer. Returns the staged path.
    pub fn print(&mut self, now: Instant) -> Result<PathBuf, AppError> {
        let document = match (self.state, &self.document) {
            (UiState::Generating, _) => {
                return Err(AppError::Busy("a generation is in progress"))
            }
            (UiState::Empty, _) => return Err(AppError::MissingCount),
            (UiState::Generated, Some(document)) => document,
            _ => return Err(AppError::NoDocument),
        };

        if let Some(job) = self.pending_print.take() {
            if !job.is_due(now) {
                self.pending_print = Some(job);
                return Err(AppError::Busy("a print job is still in progress"));
            }
            job.release();
        }

        let job = self.dispatcher.dispatch(document, now)?;
        let path = job.path().to_path_buf();
        self.pending_print = Some(job);
        Ok(path)
    }

    /// When the pending print job should be released, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending_print.as_ref().map(PrintJob::release_at)
    }

    /// Releases the pending print job once its delay has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending_print.take() {
            Some(job) if job.is_due(now) => {
                job.release();
                true
            }
            other => {
                self.pending_print = other;
                false
            }
        }
    }

    /// Waits out any pending print delay, then releases it.
    pub fn shutdown(&mut self) {
        if let Some(job) = self.pending_print.take() {
            let wait = job.release_at().saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                std::thread::sleep(wait);
            }
            job.release();
        }
    }
}
