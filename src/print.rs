// expiry-labels: handing generated sheets to the platform print flow

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

use crate::document::GeneratedDocument;
use crate::error::AppError;

/// How long a staged file outlives the print trigger.
pub const DEFAULT_RELEASE_DELAY: Duration = Duration::from_millis(1000);

#[cfg(windows)]
pub const DEFAULT_PRINT_COMMAND: &str =
    "powershell -NoProfile -Command Start-Process -Verb Print -FilePath";
#[cfg(not(windows))]
pub const DEFAULT_PRINT_COMMAND: &str = "lp";

// ============================================================================
// Backends
// ============================================================================

/// Triggers printing of a file that is already fully written.
pub trait PrintBackend {
    fn submit(&self, path: &Path) -> Result<(), AppError>;
}

/// Runs an external command with the file path as its last argument.
#[derive(Debug, Clone)]
pub struct CommandPrinter {
    program: String,
    args: Vec<String>,
}

impl CommandPrinter {
    pub fn parse(command: &str) -> Result<Self, AppError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| AppError::Print {
            message: "empty print command".to_string(),
            saved_file: None,
        })?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl PrintBackend for CommandPrinter {
    fn submit(&self, path: &Path) -> Result<(), AppError> {
        tracing::debug!("Running {} {:?} {}", self.program, self.args, path.display());
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .map_err(|e| AppError::Print {
                message: format!("failed to run {}: {}", self.program, e),
                saved_file: None,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = match stderr.trim() {
                "" => output.status.to_string(),
                text => text.to_string(),
            };
            return Err(AppError::Print {
                message: format!("{}: {}", self.program, detail),
                saved_file: None,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// A print that has been triggered. Owns the staged copy until released.
#[derive(Debug)]
pub struct PrintJob {
    staged: NamedTempFile,
    release_at: Instant,
}

impl PrintJob {
    pub fn path(&self) -> &Path {
        self.staged.path()
    }

    pub fn release_at(&self) -> Instant {
        self.release_at
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.release_at
    }

    /// Removes the staged file.
    pub fn release(self) {
        let path = self.staged.path().to_path_buf();
        match self.staged.close() {
            Ok(()) => tracing::debug!("Released {}", path.display()),
            Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
        }
    }
}

pub struct PrintDispatcher {
    backend: Box<dyn PrintBackend>,
    release_delay: Duration,
}

impl PrintDispatcher {
    pub fn new(backend: Box<dyn PrintBackend>, release_delay: Duration) -> Self {
        Self {
            backend,
            release_delay,
        }
    }

    /// Stages the document in a temporary file and triggers the backend on it.
    /// On failure nothing is left behind.
    pub fn dispatch(
        &self,
        document: &GeneratedDocument,
        now: Instant,
    ) -> Result<PrintJob, AppError> {
        let saved_file = || document.saved_path().map(Path::to_path_buf);

        let staged = stage(document).map_err(|e| {
            tracing::error!("Print error: {}", e);
            AppError::Print {
                message: e.to_string(),
                saved_file: saved_file(),
            }
        })?;
        tracing::debug!(
            "Staged {} bytes at {}",
            document.bytes().len(),
            staged.path().display()
        );

        if let Err(e) = self.backend.submit(staged.path()) {
            tracing::error!("Print error: {}", e);
            discard(staged);
            let message = match e {
                AppError::Print { message, .. } => message,
                other => other.to_string(),
            };
            return Err(AppError::Print {
                message,
                saved_file: saved_file(),
            });
        }

        tracing::info!("Sent {} to the printer", document.file_name());
        Ok(PrintJob {
            staged,
            release_at: now + self.release_delay,
        })
    }
}

fn stage(document: &GeneratedDocument) -> std::io::Result<NamedTempFile> {
    let mut staged = tempfile::Builder::new()
        .prefix("labels-")
        .suffix(".pdf")
        .tempfile()?;
    staged.write_all(document.bytes())?;
    staged.flush()?;
    staged.as_file().sync_all()?;
    Ok(staged)
}

fn discard(staged: NamedTempFile) {
    let path: PathBuf = staged.path().to_path_buf();
    if let Err(e) = staged.close() {
        tracing::warn!("Failed to remove {}: {}", path.display(), e);
    }
}
