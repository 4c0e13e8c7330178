use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommissionError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid edit (expected key=value): {0}")]
    InvalidEdit(String),

    #[error("No record with id {0}")]
    RecordNotFound(i64),

    #[error("No ledger at {0}. Run `commission init` first.")]
    LedgerNotFound(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, CommissionError>;
