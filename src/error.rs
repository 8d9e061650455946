//! Error kinds for scene assets and the debug panel.
//!
//! Engine setup (surface, adapter, device) keeps using `anyhow`; everything a
//! running scene can recover from is a [`SceneError`].

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("asset not found at {path}: {source}")]
    AssetNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode asset {path}: {reason}")]
    AssetDecodeFailure { path: String, reason: String },
    #[error("failed to build the debug panel: {reason}")]
    PanelInitFailure { reason: String },
}

impl SceneError {
    pub(crate) fn decode(path: &str, reason: impl ToString) -> Self {
        Self::AssetDecodeFailure {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}
