//! Binding to the native pdfium library.
//!
//! Rendering and text extraction go through `pdfium-render`, which loads
//! libpdfium at runtime. Resolution order:
//!
//! 1. `config.pdfium_library_path` (a file, or a directory containing the
//!    platform library)
//! 2. `PDFIUM_LIB_PATH`
//! 3. the system library loader
//! 4. the current working directory
//!
//! Binding happens per request; nothing is cached across requests.

use crate::config::ConversionConfig;
use crate::error::ConversionError;
use crate::upload::UploadedFile;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an existing pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to pdfium following the resolution order above.
pub fn bind_pdfium(config: &ConversionConfig) -> Result<Pdfium, ConversionError> {
    let mut attempts: Vec<String> = Vec::new();

    for candidate in explicit_candidates(config) {
        match bind_from_path(&candidate) {
            Ok(pdfium) => return Ok(pdfium),
            Err(reason) => attempts.push(format!("{}: {}", candidate.display(), reason)),
        }
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            debug!("Bound pdfium from the system library");
            return Ok(Pdfium::new(bindings));
        }
        Err(e) => attempts.push(format!("system library: {e}")),
    }

    let local = Pdfium::pdfium_platform_library_name_at_path("./");
    match bind_from_path(&local) {
        Ok(pdfium) => Ok(pdfium),
        Err(reason) => {
            attempts.push(format!("{}: {}", local.display(), reason));
            Err(ConversionError::PdfiumBindingFailed(attempts.join("; ")))
        }
    }
}

/// Configured and environment paths, resolved to library files.
fn explicit_candidates(config: &ConversionConfig) -> Vec<PathBuf> {
    let from_env = std::env::var(PDFIUM_LIB_PATH_ENV)
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);

    config
        .pdfium_library_path
        .iter()
        .cloned()
        .chain(from_env)
        .map(|p| resolve_library_file(&p))
        .collect()
}

/// A directory is taken to contain the platform-named library.
fn resolve_library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

/// Open an uploaded PDF with pdfium.
///
/// Encrypted documents are reported as such instead of as corrupt input.
pub(crate) fn open_pdf<'a>(
    pdfium: &'a Pdfium,
    file: &'a UploadedFile,
) -> Result<PdfDocument<'a>, ConversionError> {
    pdfium
        .load_pdf_from_byte_slice(file.bytes(), None)
        .map_err(|e| {
            let detail = format!("{:?}", e);
            if detail.contains("Password") || detail.contains("password") {
                ConversionError::ExternalTool {
                    tool: "pdfium",
                    detail: format!("'{}' is password protected", file.name()),
                }
            } else {
                ConversionError::ExternalTool {
                    tool: "pdfium",
                    detail: format!("could not open '{}': {}", file.name(), detail),
                }
            }
        })
}

fn bind_from_path(path: &Path) -> Result<Pdfium, String> {
    Pdfium::bind_to_library(path)
        .map(|bindings| {
            debug!("Bound pdfium from {}", path.display());
            Pdfium::new(bindings)
        })
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_resolves_to_platform_library() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_library_file(dir.path());
        assert!(resolved.starts_with(dir.path()));
        assert_ne!(resolved, dir.path());
    }

    #[test]
    fn file_path_is_kept() {
        let p = Path::new("/opt/pdfium/lib/libpdfium.so");
        assert_eq!(resolve_library_file(p), p.to_path_buf());
    }

    #[test]
    fn configured_path_comes_first() {
        let config = ConversionConfig::builder()
            .pdfium_library_path("/opt/custom/libpdfium.so")
            .build()
            .unwrap();
        let candidates = explicit_candidates(&config);
        assert_eq!(candidates[0], PathBuf::from("/opt/custom/libpdfium.so"));
    }

    #[test]
    fn bogus_path_fails_without_panicking() {
        assert!(bind_from_path(Path::new("/definitely/not/libpdfium.so")).is_err());
    }
}
