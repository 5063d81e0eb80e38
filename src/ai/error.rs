use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("OPENAI_API_KEY must be configured to score profiles")]
    Configuration,

    #[error("completion endpoint returned HTTP {status}")]
    Upstream { status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
