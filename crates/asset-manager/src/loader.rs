//! Asset source resolution and decoding

use std::fmt;
use std::path::PathBuf;

use image::RgbaImage;
use tracing::debug;

use crate::AssetError;

/// Identifier of a selectable overlay image: a path or a `file://` URI
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetSource(String);

impl AssetSource {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Local filesystem path this source refers to
    pub fn path(&self) -> Result<PathBuf, AssetError> {
        if let Some(rest) = self.0.strip_prefix("file://") {
            return Ok(PathBuf::from(rest));
        }
        if self.0.is_empty() || self.0.contains("://") || self.0.starts_with("data:") {
            return Err(AssetError::UnsupportedSource(self.0.clone()));
        }
        Ok(PathBuf::from(&self.0))
    }
}

impl From<&str> for AssetSource {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AssetSource {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read and decode the image behind `source` into RGBA
pub async fn load_asset(source: &AssetSource) -> Result<RgbaImage, AssetError> {
    let path = source.path()?;
    let shown = path.display().to_string();

    let bytes = tokio::fs::read(&path).await.map_err(|e| AssetError::Read {
        path: shown.clone(),
        source: e,
    })?;
    debug!("Read {} bytes from {}", bytes.len(), shown);

    let decode_path = shown.clone();
    let image = tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes)
            .map(|img| img.to_rgba8())
            .map_err(|e| AssetError::Decode {
                path: decode_path,
                source: e,
            })
    })
    .await
    .map_err(|e| AssetError::Task(e.to_string()))??;

    if image.width() == 0 || image.height() == 0 {
        return Err(AssetError::Empty(shown));
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_paths() {
        assert_eq!(
            AssetSource::from("static/pics/glasses.png").path().unwrap(),
            PathBuf::from("static/pics/glasses.png")
        );
        assert_eq!(
            AssetSource::from("file:///tmp/frame.png").path().unwrap(),
            PathBuf::from("/tmp/frame.png")
        );
    }

    #[test]
    fn test_unsupported_sources() {
        for s in ["https://cdn.example.com/frame.png", "data:image/png;base64,AAAA", ""] {
            assert!(matches!(
                AssetSource::from(s).path(),
                Err(AssetError::UnsupportedSource(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_load_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glasses.png");
        RgbaImage::from_pixel(200, 80, image::Rgba([0, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let source = AssetSource::new(path.to_string_lossy().to_string());
        let img = load_asset(&source).await.unwrap();
        assert_eq!(img.dimensions(), (200, 80));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let source = AssetSource::from("/nonexistent/glasses.png");
        assert!(matches!(load_asset(&source).await, Err(AssetError::Read { .. })));
    }

    #[tokio::test]
    async fn test_load_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let source = AssetSource::new(path.to_string_lossy().to_string());
        assert!(matches!(load_asset(&source).await, Err(AssetError::Decode { .. })));
    }
}
