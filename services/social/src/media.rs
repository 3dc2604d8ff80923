//! Uploaded image storage
//!
//! Posts and profiles only keep a relative reference to their image; the bytes
//! live under the media root and are served back under `/media`.

use axum::{
    body::Bytes,
    extract::{Multipart, multipart::MultipartError},
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::{
    collections::HashMap,
    io::Cursor,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::DEFAULT_PROFILE_PICTURE;

/// URL prefix the media root is served under
pub const MEDIA_URL: &str = "/media";

/// Errors raised while accepting or storing an upload
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("The uploaded file is empty")]
    Empty,

    #[error("Upload a valid image. The file you uploaded was either not an image or a corrupted image")]
    NotAnImage,

    #[error("The uploaded file is too large ({size} bytes, the limit is {limit} bytes)")]
    TooLarge { size: usize, limit: usize },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write upload: {0}")]
    Io(#[from] std::io::Error),
}

/// A file received in a multipart form
///
/// `file_name` and `content_type` are whatever the client sent; neither is
/// trusted when the file is stored.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Where an upload belongs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    PostImage,
    ProfilePicture,
}

impl MediaKind {
    fn directory(self) -> &'static str {
        match self {
            MediaKind::PostImage => "posts/images",
            MediaKind::ProfilePicture => "profile_pics",
        }
    }
}

/// File storage rooted at the media directory
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    max_upload_bytes: usize,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, max_upload_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_upload_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload directories and the default profile picture
    pub async fn init(&self) -> Result<(), StorageError> {
        for kind in [MediaKind::PostImage, MediaKind::ProfilePicture] {
            tokio::fs::create_dir_all(self.root.join(kind.directory())).await?;
        }

        let default_picture = self.root.join(DEFAULT_PROFILE_PICTURE);
        if !tokio::fs::try_exists(&default_picture).await? {
            tokio::fs::write(&default_picture, placeholder_avatar()?).await?;
            info!("Wrote default profile picture to {}", default_picture.display());
        }

        info!("Media storage ready at {}", self.root.display());
        Ok(())
    }

    /// Check an upload without storing it and return its image format
    ///
    /// The bytes have to decode as PNG, JPEG, GIF or WebP. The client's file
    /// name and content type play no part in the decision.
    pub fn check(&self, upload: &Upload) -> Result<ImageFormat, StorageError> {
        if upload.bytes.is_empty() {
            return Err(StorageError::Empty);
        }

        if upload.bytes.len() > self.max_upload_bytes {
            return Err(StorageError::TooLarge {
                size: upload.bytes.len(),
                limit: self.max_upload_bytes,
            });
        }

        let format = image::guess_format(&upload.bytes)
            .ok()
            .filter(|format| extension_for(*format).is_some())
            .ok_or_else(|| {
                debug!(
                    "Rejected upload {} ({}): unknown image signature",
                    upload.file_name, upload.content_type
                );
                StorageError::NotAnImage
            })?;

        if let Err(e) = image::load_from_memory_with_format(&upload.bytes, format) {
            debug!("Rejected upload {}: {}", upload.file_name, e);
            return Err(StorageError::NotAnImage);
        }

        Ok(format)
    }

    /// Store an upload under a fresh name and return its reference
    pub async fn save(&self, kind: MediaKind, upload: &Upload) -> Result<String, StorageError> {
        let format = self.check(upload)?;
        let extension = extension_for(format).ok_or(StorageError::NotAnImage)?;

        let reference = format!(
            "{}/{}.{}",
            kind.directory(),
            Uuid::new_v4().simple(),
            extension
        );

        let path = self.root.join(&reference);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &upload.bytes).await?;

        info!(
            "Stored upload {} as {} ({} bytes)",
            upload.file_name,
            reference,
            upload.bytes.len()
        );
        Ok(reference)
    }
}

/// Public URL of a stored reference
pub fn media_url(reference: &str) -> String {
    format!("{}/{}", MEDIA_URL, reference.trim_start_matches('/'))
}

/// File extension for the accepted raster formats
fn extension_for(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("png"),
        ImageFormat::Jpeg => Some("jpg"),
        ImageFormat::Gif => Some("gif"),
        ImageFormat::WebP => Some("webp"),
        _ => None,
    }
}

/// Plain grey square served for profiles without a picture
fn placeholder_avatar() -> Result<Vec<u8>, StorageError> {
    let avatar = RgbImage::from_pixel(128, 128, Rgb([0xcf, 0xd8, 0xdc]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(avatar).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)?;
    Ok(bytes)
}

/// Text fields and files of a multipart form
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl MultipartForm {
    /// Drain a multipart body
    ///
    /// File parts without a name and without content are what browsers send
    /// for an untouched file input; they are skipped.
    pub async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match field.file_name().map(str::to_owned) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_owned();
                    let bytes = field.bytes().await?;
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        Upload {
                            file_name,
                            content_type,
                            bytes,
                        },
                    );
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }

    #[cfg(test)]
    pub(crate) fn from_parts(fields: &[(&str, &str)], files: Vec<(&str, Upload)>) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files: files
                .into_iter()
                .map(|(k, upload)| (k.to_string(), upload))
                .collect(),
        }
    }
}

#[cfg(test)]
pub(crate) fn png_bytes() -> Vec<u8> {
    let pixels = RgbImage::from_pixel(2, 2, Rgb([0x33, 0x66, 0x99]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(pixels)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("Failed to encode test image");
    bytes
}

#[cfg(test)]
pub(crate) fn png(name: &str) -> Upload {
    Upload {
        file_name: name.to_string(),
        content_type: "image/png".to_string(),
        bytes: Bytes::from(png_bytes()),
    }
}
