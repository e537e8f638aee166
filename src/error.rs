/// Convenience result type used across the crate.
pub type ReframeResult<T> = Result<T, ReframeError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// Every stage surfaces its failures at the point of detection; nothing is
/// retried and no stage swallows an error from a stage below it.
#[derive(thiserror::Error, Debug)]
pub enum ReframeError {
    /// Invalid caller-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// The external downloader or the trim step failed to produce a segment.
    #[error("acquisition error: {0}")]
    Acquisition(String),

    /// Unable to read dimensions or duration of a media file.
    #[error("probe error: {0}")]
    Probe(String),

    /// The requested target aspect cannot be satisfied by the source.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// The external crop/scale/encode chain failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Display or decoder failure during a playback session.
    #[error("playback error: {0}")]
    Playback(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReframeError {
    /// Build a [`ReframeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReframeError::Acquisition`] value.
    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition(msg.into())
    }

    /// Build a [`ReframeError::Probe`] value.
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Build a [`ReframeError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`ReframeError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ReframeError::Playback`] value.
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }
}
