use async_openai::error::OpenAIError;
use thiserror::Error;

// Closed taxonomy crossing component boundaries. The index client and the
// classifier convert transport failures into one of these before returning;
// raw reqwest errors never leave the boundary they occurred at.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Search service unavailable: {0}")]
    Connectivity(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("OpenAI error: {0}")]
    OpenAI(#[from] OpenAIError),
    #[error("LLM parsing error: {0}")]
    LLMParsing(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}
