use miette::Diagnostic;
use thiserror::Error;

/// Main error type for mapsnap operations
#[derive(Error, Diagnostic, Debug)]
pub enum SnapError {
    #[error("IO error: {0}")]
    #[diagnostic(code(mapsnap::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(mapsnap::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(mapsnap::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Unknown map: {name}")]
    #[diagnostic(code(mapsnap::unknown_map))]
    UnknownMap {
        name: String,
        #[help]
        help: Option<String>,
    },

    #[error("Tilesheet '{sheet}' unavailable: {message}")]
    #[diagnostic(code(mapsnap::tilesheet))]
    Tilesheet { sheet: String, message: String },

    #[error("Render error: {message}")]
    #[diagnostic(code(mapsnap::render))]
    Render { message: String },

    #[error("Encode error: {message}")]
    #[diagnostic(code(mapsnap::encode))]
    Encode { message: String },
}

pub type Result<T> = std::result::Result<T, SnapError>;
