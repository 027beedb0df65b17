//! Image Storage Service
//!
//! 商品图片按内容寻址存储：validate → JPEG compress → SHA256 → {images_dir}/{hash}.jpg
//! 同一内容重复上传是幂等的（相同 hash 落在相同路径）。

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use sha2::{Digest, Sha256};
use shared::{AppError, ErrorCode};
use std::io::Cursor;
use std::path::PathBuf;
use tokio::fs;

/// Maximum file size (20MB) unless overridden via config
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// JPEG quality for stored images
const JPEG_QUALITY: u8 = 85;

/// Storage backend for product images.
///
/// The deletion cascade depends only on this seam; a storage failure must
/// never abort a catalog mutation.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store image bytes, returning the public URL of the stored file
    async fn store(&self, data: &[u8]) -> Result<String, AppError>;

    /// Delete a stored image. Returns `false` when there was nothing to delete.
    async fn delete(&self, url: &str) -> Result<bool, AppError>;
}

/// Local filesystem store: {images_dir}/{sha256}.jpg
#[derive(Clone, Debug)]
pub struct LocalImageStore {
    images_dir: PathBuf,
    max_bytes: usize,
}

impl LocalImageStore {
    pub fn new(images_dir: PathBuf, max_bytes: usize) -> Self {
        Self {
            images_dir,
            max_bytes,
        }
    }

    /// 上传前的内容校验，失败映射到 65xx 错误码
    fn validate(&self, data: &[u8]) -> Result<image::DynamicImage, AppError> {
        if data.is_empty() {
            return Err(AppError::new(ErrorCode::EmptyFile));
        }
        if data.len() > self.max_bytes {
            return Err(AppError::with_message(
                ErrorCode::FileTooLarge,
                format!(
                    "File too large: {} bytes (max {})",
                    data.len(),
                    self.max_bytes
                ),
            ));
        }

        let format = image::guess_format(data)
            .map_err(|_| AppError::new(ErrorCode::UnsupportedFileFormat))?;
        match format {
            image::ImageFormat::Png | image::ImageFormat::Jpeg | image::ImageFormat::WebP => {}
            other => {
                return Err(AppError::with_message(
                    ErrorCode::UnsupportedFileFormat,
                    format!("Unsupported format: {other:?}. Supported: png, jpg, webp"),
                ));
            }
        }

        image::load_from_memory(data).map_err(|e| {
            AppError::with_message(ErrorCode::InvalidImageFile, format!("Invalid image: {e}"))
        })
    }

    fn image_path(&self, hash: &str) -> PathBuf {
        self.images_dir.join(format!("{hash}.jpg"))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, data: &[u8]) -> Result<String, AppError> {
        let img = self.validate(data)?;

        // Compress to JPEG
        let mut buffer = Vec::new();
        {
            let mut cursor = Cursor::new(&mut buffer);
            let rgb_img = img.to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
            rgb_img.write_with_encoder(encoder).map_err(|e| {
                AppError::with_message(
                    ErrorCode::FileStorageFailed,
                    format!("Image compression failed: {e}"),
                )
            })?;
        }

        // SHA256 — same content lands on the same path
        let mut hasher = Sha256::new();
        hasher.update(&buffer);
        let hash = hex::encode(hasher.finalize());

        fs::create_dir_all(&self.images_dir).await.map_err(|e| {
            AppError::with_message(
                ErrorCode::FileStorageFailed,
                format!("Failed to create images dir: {e}"),
            )
        })?;

        let path = self.image_path(&hash);
        fs::write(&path, &buffer).await.map_err(|e| {
            tracing::error!(hash = %hash, error = %e, "Image write failed");
            AppError::with_message(ErrorCode::FileStorageFailed, "Image write failed")
        })?;

        tracing::info!(hash = %hash, size = buffer.len(), "Product image stored");
        Ok(format!("/images/{hash}.jpg"))
    }

    async fn delete(&self, url: &str) -> Result<bool, AppError> {
        let Some(hash) = hash_from_url(url) else {
            return Ok(false);
        };
        let path = self.image_path(hash);
        if !path.exists() {
            return Ok(false);
        }
        match fs::remove_file(&path).await {
            Ok(_) => Ok(true),
            Err(e) => Err(AppError::with_message(
                ErrorCode::FileStorageFailed,
                format!("Failed to delete image: {e}"),
            )),
        }
    }
}

/// Extract the content hash from a stored image URL.
/// Only exact 64-char hex names are accepted, anything else (including
/// path traversal attempts) is rejected.
fn hash_from_url(url: &str) -> Option<&str> {
    let name = url.rsplit('/').next()?;
    let hash = name.strip_suffix(".jpg")?;
    (hash.len() == 64 && hash.chars().all(|c| c.is_ascii_hexdigit())).then_some(hash)
}
