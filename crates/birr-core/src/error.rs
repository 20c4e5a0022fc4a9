//! Error types for Birr Lens

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The uploaded document could not be read or is not a valid SMS export.
    /// The display text is shown to users verbatim.
    #[error("Invalid file format")]
    InvalidFormat(String),

    #[error("No valid transactions found")]
    NoTransactions,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chart rendering error: {0}")]
    Render(String),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl<E> From<plotters::drawing::DrawingAreaErrorKind<E>> for Error
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        Error::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
