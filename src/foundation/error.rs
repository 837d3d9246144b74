pub type StrataResult<T> = Result<T, StrataError>;

/// Errors produced while loading, validating or rendering a level.
#[derive(thiserror::Error, Debug)]
pub enum StrataError {
    /// Input data or configuration is unusable (construction-fatal).
    #[error("validation error: {0}")]
    Validation(String),

    /// A sub-renderer failed while performing a unit of work.
    #[error("render error: {0}")]
    Render(String),

    /// The script host reported a failure for a tile, effect or prop procedure.
    #[error("script error: {0}")]
    Script(String),

    /// A project or definition file could not be decoded.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other failure, usually I/O with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StrataError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
