use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported file type (use PDF or TXT): {0}")]
    UnsupportedFormat(String),

    #[error("pdf parse error: {0}")]
    PdfParse(String),
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("inference request failed: {0}")]
    Request(String),
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("vector dimension {actual} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

pub type Result<T, E = AssistantError> = std::result::Result<T, E>;
