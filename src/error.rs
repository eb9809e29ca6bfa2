use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("{0}")]
    Input(#[from] InputError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures while turning a template into a finished report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot open template {path}: {source}")]
    TemplateOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template line {line}: {message}")]
    TemplateParse { line: usize, message: String },

    #[error("JSON template error: {0}")]
    TemplateJson(#[from] serde_json::Error),

    #[error("embedded image for {market} could not be decoded: {message}")]
    Image { market: String, message: String },

    #[error("failed to render document: {0}")]
    Render(String),

    #[error("cannot write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// User-input omissions. The operation is aborted and no state changes.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Please select a market first.")]
    NoMarketSelected,

    #[error("Unsupported image type {0:?} (expected png, jpg, jpeg, gif or bmp)")]
    UnsupportedImage(String),

    #[error("Cannot read image {path}: {message}")]
    UnreadableImage { path: PathBuf, message: String },
}
