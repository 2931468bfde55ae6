//! Image decoding with format detection, validation, and timeout support.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::AnalysisError;

/// Image decoder with configurable limits and timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an image file with existence/size validation and timeout.
    pub async fn decode(&self, path: &Path) -> Result<DecodedImage, AnalysisError> {
        if !path.exists() {
            return Err(AnalysisError::FileNotFound(path.to_path_buf()));
        }

        let file_size = std::fs::metadata(path)
            .map_err(|e| AnalysisError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot stat file: {e}"),
            })?
            .len();
        let size_mb = file_size / (1024 * 1024);
        if size_mb > self.limits.max_file_size_mb {
            return Err(AnalysisError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb,
                max_mb: self.limits.max_file_size_mb,
            });
        }

        let bytes = std::fs::read(path).map_err(|e| AnalysisError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read file: {e}"),
        })?;

        let path_owned = path.to_path_buf();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_bytes_sync(bytes, &path_owned)).await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(decoded))) => {
                if decoded.width > self.limits.max_image_dimension
                    || decoded.height > self.limits.max_image_dimension
                {
                    return Err(AnalysisError::ImageTooLarge {
                        path: path.to_path_buf(),
                        width: decoded.width,
                        height: decoded.height,
                        max_dim: self.limits.max_image_dimension,
                    });
                }
                Ok(decoded)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(AnalysisError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(AnalysisError::Timeout {
                path: path.to_path_buf(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode from bytes (runs in spawn_blocking).
    ///
    /// Format is sniffed from content, with the file extension as fallback.
    fn decode_bytes_sync(bytes: Vec<u8>, path: &Path) -> Result<DecodedImage, AnalysisError> {
        use std::io::Cursor;

        let cursor = Cursor::new(bytes);
        let reader = image::ImageReader::new(cursor)
            .with_guessed_format()
            .map_err(|e| AnalysisError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = match reader.format() {
            Some(f) => f,
            None => {
                ImageFormat::from_path(path).map_err(|_| AnalysisError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    format: path
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("unknown")
                        .to_string(),
                })?
            }
        };
        let image = reader.decode().map_err(|e| AnalysisError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        let img = DynamicImage::ImageRgb8(RgbImage::new(w, h));
        img.save_with_format(&path, ImageFormat::Png).unwrap();
        path
    }

    #[tokio::test]
    async fn test_decode_missing_file_is_file_not_found() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let err = decoder
            .decode(Path::new("/nonexistent/cargo.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::FileNotFound(_)));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_decode_valid_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "truck.png", 64, 48);

        let decoder = ImageDecoder::new(LimitsConfig::default());
        let decoded = decoder.decode(&path).await.unwrap();
        assert_eq!(decoded.width, 64);
        assert_eq!(decoded.height, 48);
        assert_eq!(decoded.format, ImageFormat::Png);
    }

    #[tokio::test]
    async fn test_decode_format_sniffed_from_content() {
        // A PNG behind a .jpg extension decodes as PNG
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "misnamed.jpg", 8, 8);

        let decoder = ImageDecoder::new(LimitsConfig::default());
        let decoded = decoder.decode(&path).await.unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
    }

    #[tokio::test]
    async fn test_decode_rejects_oversized_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "wide.png", 128, 16);

        let limits = LimitsConfig {
            max_image_dimension: 64,
            ..LimitsConfig::default()
        };
        let decoder = ImageDecoder::new(limits);
        let err = decoder.decode(&path).await.unwrap_err();
        assert!(matches!(err, AnalysisError::ImageTooLarge { .. }));
    }

    #[tokio::test]
    async fn test_decode_garbage_bytes_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.jpg");
        std::fs::write(&path, b"not an image at all").unwrap();

        let decoder = ImageDecoder::new(LimitsConfig::default());
        let err = decoder.decode(&path).await.unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Decode { .. } | AnalysisError::UnsupportedFormat { .. }
        ));
    }
}
