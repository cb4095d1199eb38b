use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("Unknown {field} option: {value}")]
    UnknownCategory { field: &'static str, value: String },
}

impl From<std::io::Error> for LoanError {
    fn from(error: std::io::Error) -> Self {
        LoanError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for LoanError {
    fn from(error: reqwest::Error) -> Self {
        LoanError::Reqwest(Box::new(error))
    }
}
