//! Images → PDF: one page per image, in upload order.
//!
//! Each page is sized to the image's pixel dimensions (1 px = 1 pt) and the
//! image fills it. Images are re-encoded as RGB JPEG and embedded as
//! `DCTDecode` XObjects, which also strips PNG alpha.

use super::encode::encode_jpeg;
use super::pdf::{save, PdfBuilder};
use super::FormatAdapter;
use crate::config::ConversionConfig;
use crate::error::ConversionError;
use crate::output::AdapterOutput;
use crate::validate::ValidatedRequest;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, Stream};
use tracing::{debug, info};

pub struct ImagesToPdf;

impl FormatAdapter for ImagesToPdf {
    fn backend(&self) -> &'static str {
        "image"
    }

    fn convert(
        &self,
        request: &ValidatedRequest,
        config: &ConversionConfig,
    ) -> Result<AdapterOutput, ConversionError> {
        let files = request.files();
        let total = files.len();
        let progress = config.progress();
        let mut builder = PdfBuilder::new();

        for (idx, file) in files.iter().enumerate() {
            let img = image::load_from_memory(file.bytes()).map_err(|e| ConversionError::UnsupportedFormat {
                file: file.name().to_string(),
                expected: "JPEG or PNG image",
                detail: e.to_string(),
            })?;
            let (width, height) = (img.width(), img.height());
            let jpeg = encode_jpeg(&img, config.jpeg_quality).map_err(|e| ConversionError::tool("image", e))?;
            debug!("Image {} '{}': {}x{} px", idx + 1, file.name(), width, height);

            let xobject = Stream::new(
                Dictionary::from_iter(vec![
                    ("Type", Object::Name(b"XObject".to_vec())),
                    ("Subtype", Object::Name(b"Image".to_vec())),
                    ("Width", Object::Integer(width as i64)),
                    ("Height", Object::Integer(height as i64)),
                    ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
                    ("BitsPerComponent", Object::Integer(8)),
                    ("Filter", Object::Name(b"DCTDecode".to_vec())),
                ]),
                jpeg,
            )
            .with_compression(false);
            let image_id = builder.add_object(xobject);

            let resources = Dictionary::from_iter(vec![(
                "XObject",
                Object::Dictionary(Dictionary::from_iter(vec![("Im0", Object::Reference(image_id))])),
            )]);
            builder.add_page(
                width as f32,
                height as f32,
                resources,
                draw_full_page(width, height)?,
            );
            progress.on_item_complete(idx + 1, total);
        }

        let mut doc = builder.finish()?;
        let bytes = save(&mut doc)?;
        info!("{} image(s) → PDF ({} bytes)", total, bytes.len());
        Ok(AdapterOutput::Single(bytes))
    }
}

/// `q w 0 0 h 0 0 cm /Im0 Do Q`
fn draw_full_page(width: u32, height: u32) -> Result<Vec<u8>, ConversionError> {
    Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(width as i64),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(height as i64),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    }
    .encode()
    .map_err(|e| ConversionError::tool("lopdf", e))
}
