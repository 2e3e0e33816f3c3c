use thiserror::Error;

#[derive(Error, Debug)]
pub enum PurseError {
    #[error("Unsupported file format: {0}. Please use a CSV or Excel file.")]
    Format(String),

    #[error("Missing required column '{0}': the file must have 'date', 'description', and 'amount' columns")]
    Schema(String),

    #[error("Incorrect username or password.")]
    Auth,

    #[error("Advisor error: {0}")]
    Gateway(String),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("No bank statement loaded")]
    NoDataset,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PurseError>;
