pub type KeepsakeResult<T> = Result<T, KeepsakeError>;

/// Fatal errors for a journal generation request.
///
/// Per-photo fetch/decode failures are not represented here: they are recovered inside the
/// resolver (see [`crate::assets::resolve::ResolveError`]) and never abort a run.
#[derive(thiserror::Error, Debug)]
pub enum KeepsakeError {
    #[error("validation error: {0}")]
    Validation(String),

    /// The rendering surface (canvas, worker pool, fonts, brand mark) could not be set up.
    #[error("rendering environment error: {0}")]
    Environment(String),

    /// A page could not be encoded or the document could not be written.
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("journal generation cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KeepsakeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn environment(msg: impl Into<String>) -> Self {
        Self::Environment(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// `true` for failures the caller may reasonably retry (everything except bad input).
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }
}

impl From<lopdf::Error> for KeepsakeError {
    fn from(e: lopdf::Error) -> Self {
        Self::Encoding(format!("pdf: {e}"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
