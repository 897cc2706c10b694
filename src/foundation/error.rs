/// Convenience result type used across camgrid.
pub type MosaicResult<T> = Result<T, MosaicError>;

/// Top-level error taxonomy for indexing, compositing, and encoding.
#[derive(thiserror::Error, Debug)]
pub enum MosaicError {
    /// Invalid run inputs (flags, directories, camera selection).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unusable input data or encoder setup failure before any frame is produced.
    #[error("data error: {0}")]
    Data(String),

    /// A single tile could not be loaded. Recovered by the loader.
    #[error("frame load error: {0}")]
    Load(String),

    /// Decorating a tile failed.
    #[error("render error: {0}")]
    Render(String),

    /// A whole frame number could not be composited and was dropped.
    #[error("composite error: {0}")]
    Composite(String),

    /// Writing to or finalizing the output sink failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MosaicError {
    /// Build a [`MosaicError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`MosaicError::Data`] value.
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Build a [`MosaicError::Load`] value.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build a [`MosaicError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`MosaicError::Composite`] value.
    pub fn composite(msg: impl Into<String>) -> Self {
        Self::Composite(msg.into())
    }

    /// Build a [`MosaicError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Whether this error ends the run when it reaches the orchestrator.
    ///
    /// `Load` is absorbed by the loader and `Composite` only drops one frame number.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Load(_) | Self::Composite(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
