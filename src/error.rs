use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("No player rows found in {0}")]
    EmptySession(String),

    #[error("Invalid group operation: {0}")]
    InvalidGroupOperation(String),

    #[error("Net positions do not balance (off by {imbalance})")]
    Unbalanced { imbalance: String },

    #[error("Unknown ledger: {0}")]
    UnknownLedger(String),

    #[error("Session already imported as ledger {0}")]
    DuplicateSession(String),

    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    #[error("Amount out of range for {0}")]
    AmountOutOfRange(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
