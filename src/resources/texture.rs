use std::path::PathBuf;

use instant::Duration;

use crate::{data_structures::texture, error::SceneError};

/// Registry key that maps to "no texture".
pub const NONE: &str = "none";

const MAX_RETRIES: u32 = 3;

/// Index into the scene's list of loaded GPU textures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub usize);

/// Named textures the light can project, in load order, with the `"none"` sentinel first.
///
/// Stays empty until [`populate`](Self::populate) is called with the textures that
/// actually loaded. Each population bumps the revision so that views built from
/// the old key set know they are stale.
#[derive(Clone, Debug, Default)]
pub struct TextureRegistry {
    entries: Vec<(String, Option<TextureHandle>)>,
    revision: u64,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_loaded<I, S>(loaded: I) -> Self
    where
        I: IntoIterator<Item = (S, TextureHandle)>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        registry.populate(loaded);
        registry
    }

    pub fn populate<I, S>(&mut self, loaded: I)
    where
        I: IntoIterator<Item = (S, TextureHandle)>,
        S: Into<String>,
    {
        self.entries = std::iter::once((NONE.to_string(), None))
            .chain(
                loaded
                    .into_iter()
                    .map(|(name, handle)| (name.into(), Some(handle))),
            )
            .collect();
        self.revision += 1;
    }

    /// `None` for the sentinel and for names that never loaded.
    pub fn get(&self, name: &str) -> Option<TextureHandle> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, handle)| *handle)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

pub fn asset_path(file_name: &str) -> PathBuf {
    std::path::Path::new("./").join("assets").join(file_name)
}

fn is_transient(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::Interrupted
            | std::io::ErrorKind::TimedOut
            | std::io::ErrorKind::WouldBlock
    )
}

pub async fn load_binary(file_name: &str) -> Result<Vec<u8>, SceneError> {
    let path = asset_path(file_name);
    let mut attempt = 0;
    loop {
        match tokio::fs::read(&path).await {
            Ok(data) => return Ok(data),
            Err(err) if is_transient(&err) && attempt < MAX_RETRIES => {
                let backoff = Duration::from_millis(25 << attempt);
                log::warn!("reading {} failed ({}), retrying in {:?}", file_name, err, backoff);
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(source) => {
                return Err(SceneError::AssetNotFound {
                    path: path.display().to_string(),
                    source,
                });
            }
        }
    }
}

pub async fn load_texture(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Result<texture::Texture, SceneError> {
    let data = load_binary(file_name).await?;
    texture::Texture::from_bytes(device, queue, &data, file_name, None)
        .map_err(|e| SceneError::decode(file_name, e))
}
