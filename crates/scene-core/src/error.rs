use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// No graphics context, or the user asked for reduced motion. Nothing is
    /// allocated when this is returned.
    #[error("unsupported environment: {0}")]
    Unsupported(&'static str),

    #[error("unknown page scene tag {0:?}")]
    UnknownScene(String),

    #[error("unknown transition phase tag {0:?}")]
    UnknownPhase(String),

    /// The backend factory or the initial upload failed.
    #[error("backend error: {0}")]
    Backend(String),
}

pub type SceneResult<T> = Result<T, SceneError>;
