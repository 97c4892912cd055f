use serde::{Deserialize, Serialize};

/// Image MIME types accepted by the extraction model.
///
/// One lookup table for the MIME-to-extension mapping; an unknown MIME type
/// is a validation failure, not a silently omitted extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageMime {
    Jpeg,
    Png,
    Webp,
    Heic,
    Heif,
}

impl ImageMime {
    /// Look up a MIME type string. Returns `None` for anything outside the
    /// supported set.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            "image/heic" => Some(Self::Heic),
            "image/heif" => Some(Self::Heif),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Heic => "image/heic",
            Self::Heif => "image/heif",
        }
    }

    /// File extension used when materializing the image on disk.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => ".jpg",
            Self::Png => ".png",
            Self::Webp => ".webp",
            Self::Heic => ".heic",
            Self::Heif => ".heif",
        }
    }
}
