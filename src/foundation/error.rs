/// Result alias used across the crate.
pub type PostcardResult<T> = Result<T, PostcardError>;

/// Whole-operation failures.
///
/// A `PostcardError` returned from compositing aborts the composite; callers decide whether to
/// fall back to per-layer delivery. Failures confined to a single layer use [`LayerError`]
/// instead and never escape the compositor.
#[derive(thiserror::Error, Debug)]
pub enum PostcardError {
    /// Post JSON could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Canvas allocation or paint pass failed.
    #[error("compose error: {0}")]
    Compose(String),

    /// Final surface could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// The delivery channel rejected a send.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// Anything else, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PostcardError {
    /// Build a [`PostcardError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PostcardError::Compose`].
    pub fn compose(msg: impl Into<String>) -> Self {
        Self::Compose(msg.into())
    }

    /// Build a [`PostcardError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`PostcardError::Delivery`].
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }
}

/// Failure confined to one layer. The layer is skipped and compositing continues.
#[derive(thiserror::Error, Debug)]
pub enum LayerError {
    /// `image_base64` is absent, not a string, or empty.
    #[error("layer error: no image_base64 in layer data")]
    MissingPayload,

    /// `image_base64` is not valid standard base64.
    #[error("layer error: failed to decode base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes are not a supported still image.
    #[error("layer error: failed to decode image: {0}")]
    Raster(#[from] image::ImageError),

    /// The decoded image cannot be painted (e.g. exceeds the rasterizer's size limit).
    #[error("layer error: {0}")]
    Unpaintable(String),
}
