//! Image Source
//!
//! Turns a file or a byte buffer into a selected image: the untouched
//! encoded bytes (what the OCR engine receives) plus the natural pixel size
//! read from the image header.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::geometry::Size;

/// Tag identifying one image selection
///
/// OCR requests carry the id of the image they were issued for so that a
/// response arriving after the user moved on can be recognized and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(Uuid);

impl ImageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Image acquisition failures
#[derive(Debug, Error)]
pub enum ImageSourceError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unrecognized image data: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image format could not be detected: {0}")]
    Format(std::io::Error),

    #[error("Image has zero size ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

/// An image chosen by the user
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub id: ImageId,
    /// Encoded bytes exactly as read
    pub bytes: Arc<[u8]>,
    /// Natural pixel width
    pub width: u32,
    /// Natural pixel height
    pub height: u32,
    /// Display name (file name or caller-supplied name)
    pub label: String,
}

impl SourceImage {
    /// Read header dimensions from an encoded buffer
    pub fn from_bytes(bytes: Vec<u8>, label: impl Into<String>) -> Result<Self, ImageSourceError> {
        let (width, height) = image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(ImageSourceError::Format)?
            .into_dimensions()?;

        if width == 0 || height == 0 {
            return Err(ImageSourceError::Empty { width, height });
        }

        let label = label.into();
        debug!("Image '{}' is {}x{} ({} bytes)", label, width, height, bytes.len());

        Ok(Self {
            id: ImageId::new(),
            bytes: bytes.into(),
            width,
            height,
            label,
        })
    }

    /// Load an image file from disk
    pub fn from_path(path: &Path) -> Result<Self, ImageSourceError> {
        let bytes = std::fs::read(path).map_err(|source| ImageSourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self::from_bytes(bytes, label)
    }

    pub fn size(&self) -> Size {
        Size::from((self.width, self.height))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Encode a blank PNG of the given size
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_from_bytes_reads_dimensions() {
        let image = SourceImage::from_bytes(png_bytes(40, 80), "test.png").unwrap();
        assert_eq!((image.width, image.height), (40, 80));
        assert_eq!(image.size(), Size::new(40.0, 80.0));
        assert_eq!(image.label, "test.png");
    }

    #[test]
    fn test_each_selection_gets_fresh_id() {
        let a = SourceImage::from_bytes(png_bytes(4, 4), "a").unwrap();
        let b = SourceImage::from_bytes(png_bytes(4, 4), "a").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let result = SourceImage::from_bytes(b"definitely not an image".to_vec(), "junk");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&png_bytes(12, 7)).unwrap();

        let image = SourceImage::from_path(file.path()).unwrap();
        assert_eq!((image.width, image.height), (12, 7));
    }

    #[test]
    fn test_from_missing_path() {
        let result = SourceImage::from_path(Path::new("/nonexistent/photo.jpg"));
        assert!(matches!(result, Err(ImageSourceError::Read { .. })));
    }
}
