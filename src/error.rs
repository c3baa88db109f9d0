use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON input: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to write CSV report: {0}")]
    CsvError(#[from] csv::Error),

    /// The engine registered an event the catalog does not define.
    #[error("Event '{0}' is undefined in the event catalog")]
    UndefinedEvent(String),

    #[error("Cluster inventory could not be opened: {0}")]
    InventoryUnavailable(String),

    #[error("No credit rate configured for node type or partition '{0}'")]
    UnknownNodeRate(String),

    #[error("Invalid directive pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Balance sheet could not be parsed: {0}")]
    BalanceSheetFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;
