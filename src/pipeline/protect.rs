//! Protect PDF: copy every page into a new document and encrypt it.
//!
//! Uses the standard security handler, RC4 128-bit (V2/R3). The same
//! password opens the document and owns it; all permissions are granted.

use super::pdf::{ensure_file_id, load, save, PdfBuilder};
use super::FormatAdapter;
use crate::config::ConversionConfig;
use crate::error::ConversionError;
use crate::output::AdapterOutput;
use crate::validate::ValidatedRequest;
use lopdf::{EncryptionState, EncryptionVersion, Permissions};
use tracing::info;

const KEY_LENGTH_BITS: usize = 128;

pub struct ProtectPdf;

impl FormatAdapter for ProtectPdf {
    fn backend(&self) -> &'static str {
        "lopdf"
    }

    fn convert(
        &self,
        request: &ValidatedRequest,
        config: &ConversionConfig,
    ) -> Result<AdapterOutput, ConversionError> {
        let file = request.single_file()?;
        let password = request.password()?;

        let source = load(file)?;
        let all: Vec<u32> = (1..=source.get_pages().len() as u32).collect();
        let mut builder = PdfBuilder::new();
        let pages = builder.import_pages(source, &all)?;
        let mut doc = builder.finish()?;
        ensure_file_id(&mut doc, file.bytes());

        let state = EncryptionState::try_from(EncryptionVersion::V2 {
            document: &doc,
            owner_password: password,
            user_password: password,
            key_length: KEY_LENGTH_BITS,
            permissions: Permissions::all(),
        })
        .map_err(|e| ConversionError::tool("lopdf", format!("encryption setup failed: {e}")))?;
        doc.encrypt(&state)
            .map_err(|e| ConversionError::tool("lopdf", format!("encryption failed: {e}")))?;
        config.progress().on_item_complete(1, 1);

        let bytes = save(&mut doc)?;
        info!("Protected '{}': {} pages, {} bytes", file.name(), pages, bytes.len());
        Ok(AdapterOutput::Single(bytes))
    }
}
