// expiry-labels: error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Please enter a valid number of labels (got {0:?})")]
    InvalidCount(String),
    #[error("Please enter a valid number of labels.")]
    MissingCount,
    #[error(
        "Label {label_width}x{label_height}mm does not fit on a {page_width}x{page_height}mm page"
    )]
    DegenerateLayout {
        page_width: f32,
        page_height: f32,
        label_width: f32,
        label_height: f32,
    },
    #[error("Failed to create PDF: {0}")]
    Pdf(String),
    #[error("{}", print_message(.message, .saved_file))]
    Print {
        message: String,
        saved_file: Option<PathBuf>,
    },
    #[error("Please generate the PDF first.")]
    NoDocument,
    #[error("Busy: {0}")]
    Busy(&'static str),
    #[error("Invalid date: {0}")]
    Date(String),
    #[error("Failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn print_message(message: &str, saved_file: &Option<PathBuf>) -> String {
    match saved_file {
        Some(path) => format!(
            "Unable to print automatically ({}). Please use the downloaded PDF to print: {}",
            message,
            path.display()
        ),
        None => format!(
            "Unable to print automatically ({}). Please use the downloaded PDF to print.",
            message
        ),
    }
}
