use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Annotation error: {0}")]
    Annotation(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Input control error: {0}")]
    InputControl(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
