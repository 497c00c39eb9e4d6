use pdfcmp_types::ObjectKind;

/// Errors raised while loading or decoding a document.
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    /// The file could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] lopdf::Error),

    /// I/O error while reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The trailer has no usable `/Root` entry.
    #[error("document has no catalog")]
    MissingCatalog,

    /// A stream uses a filter this crate cannot decode.
    #[error("unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// A supported filter failed on the stream's bytes.
    #[error("{filter} failed: {reason}")]
    Decode { filter: String, reason: String },

    /// Content-stream syntax error.
    #[error("malformed content at byte {offset}: {reason}")]
    Content { offset: usize, reason: String },

    /// A `/Contents` entry that is neither a stream nor an array of streams.
    #[error("expected a content stream, found {0}")]
    NotAContentStream(ObjectKind),
}

/// Result alias for document operations.
pub type DocResult<T> = Result<T, DocError>;
