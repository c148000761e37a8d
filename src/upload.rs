//! Uploaded files and content sniffing.
//!
//! An [`UploadedFile`] is the unit a caller hands to the validator: the raw
//! bytes, the original filename and the media type the client declared.
//! Sniffing looks only at leading magic bytes; it never decodes.

use crate::error::ConversionError;
use std::fmt;
use std::path::Path;
use tracing::debug;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

/// One uploaded file. Owned by a single request and never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    media_type: String,
    bytes: Vec<u8>,
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a local file, declaring the media type implied by its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConversionError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => ConversionError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => ConversionError::FileNotFound {
                path: path.to_path_buf(),
            },
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = media_type_for_path(path);
        debug!("Read upload {} ({} bytes, {})", path.display(), bytes.len(), media_type);

        Ok(Self::new(name, media_type, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The content kind detected from the leading bytes.
    pub fn sniff(&self) -> Option<SniffedKind> {
        sniff(&self.bytes)
    }
}

/// Content kinds the crate knows how to consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SniffedKind {
    Pdf,
    Jpeg,
    Png,
    /// A ZIP container; DOCX files are ZIP archives.
    Zip,
}

impl SniffedKind {
    /// The media type a client would declare for this content.
    pub fn media_type(self) -> &'static str {
        match self {
            SniffedKind::Pdf => MIME_PDF,
            SniffedKind::Jpeg => MIME_JPEG,
            SniffedKind::Png => MIME_PNG,
            SniffedKind::Zip => MIME_DOCX,
        }
    }
}

/// Detect content by magic bytes.
pub fn sniff(bytes: &[u8]) -> Option<SniffedKind> {
    if bytes.starts_with(b"%PDF") {
        Some(SniffedKind::Pdf)
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(SniffedKind::Jpeg)
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some(SniffedKind::Png)
    } else if bytes.starts_with(b"PK\x03\x04") {
        Some(SniffedKind::Zip)
    } else {
        None
    }
}

/// Media type implied by a filename extension.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => MIME_PDF,
        "jpg" | "jpeg" => MIME_JPEG,
        "png" => MIME_PNG,
        "docx" => MIME_DOCX,
        _ => MIME_OCTET_STREAM,
    }
}

/// Whether a declared media type is specific enough to be checked against content.
pub(crate) fn is_generic_media_type(media_type: &str) -> bool {
    let m = media_type.trim();
    m.is_empty() || m.eq_ignore_ascii_case(MIME_OCTET_STREAM)
}

/// First four bytes, for error messages.
pub(crate) fn magic_of(bytes: &[u8]) -> String {
    let n = bytes.len().min(4);
    format!("{:?}", &bytes[..n])
}
