use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Input is empty, nothing to send")]
    EmptyInput,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported file type: {0} (expected .pdf or .docx)")]
    UnsupportedFileType(String),

    #[error("Could not read document: {0}")]
    CorruptDocument(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Request rejected by provider: {0}")]
    RequestRejected(String),

    #[error("{0} API key not configured. Set it in the config file or environment.")]
    MissingApiKey(String),

    #[error("Could not generate flashcards. Try rephrasing your input.")]
    NoFlashcardsParsed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssistantError {
    /// Failures of the completion client that may succeed if submitted again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ModelUnavailable(_) | Self::RateLimited(_) | Self::Timeout(_)
        )
    }

    /// Outcomes reported as a notice rather than a failed submission.
    pub fn is_notice(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::NoFlashcardsParsed)
    }
}
