//! Product-photo uploads shared by the content studio and `/api/design`.

use std::io::Cursor;

use axum::extract::Multipart;
use base64::Engine;
use image::{ImageFormat, ImageReader, Limits};
use thiserror::Error;

/// Maximum file size (5MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Largest width or height accepted when decoding.
const MAX_DIMENSION: u32 = 8_192;

/// Upload rejected before it reached any external API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("missing form field: {0}")]
    MissingField(&'static str),

    #[error("file too large, maximum size is {}MB", MAX_FILE_SIZE / 1024 / 1024)]
    TooLarge,

    #[error("unsupported file format '{0}', supported: png, jpg, jpeg, webp")]
    UnsupportedFormat(String),

    #[error("file is not a valid image")]
    NotAnImage,

    #[error("invalid multipart body: {0}")]
    Multipart(String),
}

/// An uploaded photo plus the text fields sent with it.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Check size and extension, then decode the file to prove it is a
    /// PNG, JPEG, or WebP image.
    ///
    /// Decoding is CPU-bound; async callers go through [`DesignForm`], which
    /// runs it on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns an [`UploadError`] describing the first failed check.
    pub fn new(file_name: String, bytes: Vec<u8>) -> Result<Self, UploadError> {
        if bytes.len() > MAX_FILE_SIZE {
            return Err(UploadError::TooLarge);
        }

        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
            return Err(UploadError::UnsupportedFormat(ext));
        }

        let format = decode_image(&bytes)?;

        Ok(Self {
            file_name,
            content_type: format.to_mime_type().to_owned(),
            bytes,
        })
    }

    /// Base64 payload for an inline image part.
    #[must_use]
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// Decode the whole image, returning its format.
fn decode_image(bytes: &[u8]) -> Result<ImageFormat, UploadError> {
    let format = image::guess_format(bytes).map_err(|_| UploadError::NotAnImage)?;
    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP) {
        return Err(UploadError::NotAnImage);
    }

    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_DIMENSION);
    limits.max_image_height = Some(MAX_DIMENSION);

    let mut reader = ImageReader::with_format(Cursor::new(bytes), format);
    reader.limits(limits);
    reader.decode().map_err(|e| {
        tracing::debug!(error = %e, ?format, "Upload failed to decode");
        UploadError::NotAnImage
    })?;

    Ok(format)
}

/// Parsed studio/design form: field `image` plus optional `prompt`, `style`,
/// and `product_name`.
#[derive(Debug, Clone)]
pub struct DesignForm {
    pub image: ImageUpload,
    pub prompt: Option<String>,
    pub style: Option<String>,
    pub product_name: Option<String>,
}

impl DesignForm {
    /// Read the multipart body, validating the image.
    ///
    /// # Errors
    ///
    /// Returns an [`UploadError`] if the body is malformed, the image is
    /// missing, or the image fails validation.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, UploadError> {
        let mut image = None;
        let mut prompt = None;
        let mut style = None;
        let mut product_name = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| UploadError::Multipart(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().unwrap_or("upload").to_owned();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| UploadError::Multipart(e.to_string()))?
                        .to_vec();
                    let checked =
                        tokio::task::spawn_blocking(move || ImageUpload::new(file_name, bytes))
                            .await
                            .map_err(|e| UploadError::Multipart(format!("image check: {e}")))??;
                    image = Some(checked);
                }
                "prompt" | "style" | "product_name" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| UploadError::Multipart(e.to_string()))?;
                    let value = Some(text.trim().to_owned()).filter(|t| !t.is_empty());
                    match name.as_str() {
                        "prompt" => prompt = value,
                        "style" => style = value,
                        _ => product_name = value,
                    }
                }
                _ => {}
            }
        }

        Ok(Self {
            image: image.ok_or(UploadError::MissingField("image"))?,
            prompt,
            style,
            product_name,
        })
    }
}

/// A small valid image for tests.
#[cfg(test)]
pub(crate) fn sample_image(format: ImageFormat) -> Vec<u8> {
    let pixels = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 120, 40]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(pixels)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode sample image");
    bytes
}
