use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("document error: {0}")]
    Document(#[from] pdfcmp_doc::DocError),

    #[error("comparison error: {0}")]
    Diff(#[from] pdfcmp_diff::DiffError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CompareResult<T> = Result<T, CompareError>;
