//! End-to-end integration tests for pdfdesk.
//!
//! Everything that goes through lopdf, image and zip runs unconditionally on
//! PDFs built in memory. Tests that need the native pdfium library (PDF to
//! JPG, PDF to DOCX, opening a protected PDF) are gated behind the
//! `E2E_ENABLED` environment variable.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture
//!
//! Including the pdfium tests:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/libpdfium cargo test --test e2e -- --nocapture

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use pdfdesk::pipeline::docx::{read_paragraphs, write_paragraphs};
use pdfdesk::{
    convert, convert_async, convert_named, package, page_count, ConversionConfig, ConversionParams,
    ConversionResult, ConversionTask, DownloadableArtifact, ErrorKind, UploadedFile,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ── Test helpers ─────────────────────────────────────────────────────────────

const MIME_PDF: &str = "application/pdf";
const MIME_PNG: &str = "image/png";
const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Skip this test unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 (and PDFIUM_LIB_PATH) to run pdfium tests");
            return;
        }
    }};
}

/// A PDF whose page `i` (0-based) is `width_base + i` points wide and shows
/// `"{label} page {i+1}"`.
fn make_pdf(num_pages: u32, width_base: i64, label: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));

    let mut kids = Vec::new();
    for i in 0..num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(18)]),
                Operation::new("Td", vec![Object::Integer(20), Object::Integer(700)]),
                Operation::new("Tj", vec![Object::string_literal(format!("{label} page {}", i + 1))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(width_base + i as i64),
                    Object::Integer(792),
                ]),
            ),
            (
                "Resources",
                Object::Dictionary(Dictionary::from_iter(vec![(
                    "Font",
                    Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
                )])),
            ),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(num_pages as i64)),
            ("Kids", Object::Array(kids)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn page_widths(bytes: &[u8]) -> Vec<i64> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| {
            let media_box = doc
                .get_dictionary(id)
                .unwrap()
                .get(b"MediaBox")
                .unwrap()
                .as_array()
                .unwrap();
            media_box[2].as_float().unwrap().round() as i64
        })
        .collect()
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn pdf_file(name: &str, bytes: Vec<u8>) -> UploadedFile {
    UploadedFile::new(name, MIME_PDF, bytes)
}

/// Run a task and return its single artifact.
fn run_single(task: ConversionTask, files: Vec<UploadedFile>, params: ConversionParams) -> DownloadableArtifact {
    let result = convert(task, files, &params, &ConversionConfig::default());
    let mut artifacts = package(result, task).unwrap_or_else(|f| panic!("{task} failed: {f}"));
    assert_eq!(artifacts.len(), 1);
    artifacts.remove(0)
}

// ── Merge ────────────────────────────────────────────────────────────────────

#[test]
fn test_merge_keeps_upload_order() {
    let a = make_pdf(2, 100, "A");
    let b = make_pdf(3, 200, "B");
    let artifact = run_single(
        ConversionTask::MergePdfs,
        vec![pdf_file("a.pdf", a), pdf_file("b.pdf", b)],
        ConversionParams::new(),
    );

    assert_eq!(artifact.filename, "merged.pdf");
    assert_eq!(artifact.content_type, "application/pdf");
    assert_eq!(page_widths(&artifact.bytes), vec![100, 101, 200, 201, 202]);
}

#[test]
fn test_merge_rejects_non_pdf() {
    let result = convert(
        ConversionTask::MergePdfs,
        vec![pdf_file("a.pdf", make_pdf(1, 100, "A")), UploadedFile::new("b.png", MIME_PNG, png(4, 4))],
        &ConversionParams::new(),
        &ConversionConfig::default(),
    );
    let failure = result.failure().unwrap();
    assert_eq!(failure.kind, ErrorKind::UnsupportedFormat);
    assert!(failure.message.contains("b.png"));
}

// ── Split ────────────────────────────────────────────────────────────────────

#[test]
fn test_split_range_and_clamp() {
    let source = make_pdf(5, 100, "S");

    let middle = run_single(
        ConversionTask::SplitPdf,
        vec![pdf_file("s.pdf", source.clone())],
        ConversionParams::new().page_range(2, 4),
    );
    assert_eq!(middle.filename, "split.pdf");
    assert_eq!(page_widths(&middle.bytes), vec![101, 102, 103]);

    let clamped = run_single(
        ConversionTask::SplitPdf,
        vec![pdf_file("s.pdf", source)],
        ConversionParams::new().page_range(2, 100),
    );
    assert_eq!(page_widths(&clamped.bytes), vec![101, 102, 103, 104]);
}

#[test]
fn test_split_reversed_range_is_validation_error() {
    let result = convert(
        ConversionTask::SplitPdf,
        vec![pdf_file("s.pdf", make_pdf(3, 100, "S"))],
        &ConversionParams::new().page_range(3, 2),
        &ConversionConfig::default(),
    );
    assert_eq!(result.failure().unwrap().kind, ErrorKind::Validation);
}

#[test]
fn test_split_two_files_is_validation_error() {
    let result = convert(
        ConversionTask::SplitPdf,
        vec![pdf_file("a.pdf", make_pdf(1, 100, "A")), pdf_file("b.pdf", make_pdf(1, 100, "B"))],
        &ConversionParams::new(),
        &ConversionConfig::default(),
    );
    assert_eq!(result.failure().unwrap().kind, ErrorKind::Validation);
}

// ── Images → PDF ─────────────────────────────────────────────────────────────

#[test]
fn test_images_to_pdf_one_page_per_image() {
    let files = vec![
        UploadedFile::new("1.png", MIME_PNG, png(120, 80)),
        UploadedFile::new("2.png", MIME_PNG, png(60, 90)),
    ];
    let artifact = run_single(ConversionTask::ImagesToPdf, files, ConversionParams::new());
    assert_eq!(artifact.filename, "images_to_pdf.pdf");
    assert_eq!(page_widths(&artifact.bytes), vec![120, 60]);
}

// ── DOCX → PDF ───────────────────────────────────────────────────────────────

#[test]
fn test_docx_to_pdf_produces_pdf() {
    let docx = write_paragraphs(&["Quarterly report".to_string(), "All numbers are up.".to_string()]).unwrap();
    let artifact = run_single(
        ConversionTask::DocxToPdf,
        vec![UploadedFile::new("report.docx", MIME_DOCX, docx)],
        ConversionParams::new(),
    );
    assert_eq!(artifact.filename, "docx_to_pdf.pdf");
    assert_eq!(page_count(&artifact.bytes).unwrap(), 1);
}

#[test]
fn test_docx_declared_but_pdf_content_is_unsupported() {
    let result = convert(
        ConversionTask::DocxToPdf,
        vec![UploadedFile::new("fake.docx", MIME_DOCX, make_pdf(1, 100, "X"))],
        &ConversionParams::new(),
        &ConversionConfig::default(),
    );
    assert_eq!(result.failure().unwrap().kind, ErrorKind::UnsupportedFormat);
}

// ── Protect ──────────────────────────────────────────────────────────────────

#[test]
fn test_protect_encrypts_output() {
    let artifact = run_single(
        ConversionTask::ProtectPdf,
        vec![pdf_file("p.pdf", make_pdf(2, 100, "CONFIDENTIAL"))],
        ConversionParams::new().password("s3cret"),
    );
    assert_eq!(artifact.filename, "protected.pdf");
    let text = String::from_utf8_lossy(&artifact.bytes);
    assert!(text.contains("/Encrypt"));
    assert!(!text.contains("CONFIDENTIAL"));
}

#[test]
fn test_protect_without_password_is_validation_error() {
    let result = convert(
        ConversionTask::ProtectPdf,
        vec![pdf_file("p.pdf", make_pdf(1, 100, "P"))],
        &ConversionParams::new().password(""),
        &ConversionConfig::default(),
    );
    assert_eq!(result.failure().unwrap().kind, ErrorKind::Validation);
}

// ── Dispatch by name ─────────────────────────────────────────────────────────

#[test]
fn test_unknown_task_name() {
    let result = convert_named(
        "compress-pdf",
        vec![pdf_file("a.pdf", make_pdf(1, 100, "A"))],
        &ConversionParams::new(),
        &ConversionConfig::default(),
    );
    assert_eq!(result.failure().unwrap().kind, ErrorKind::UnknownTask);
}

#[test]
fn test_failure_result_is_json_serialisable() {
    let result = convert(ConversionTask::MergePdfs, vec![], &ConversionParams::new(), &ConversionConfig::default());
    let ConversionResult::Failure(failure) = result else {
        panic!("expected failure");
    };
    let json = serde_json::to_value(&failure).unwrap();
    assert_eq!(json["kind"], "validation");
    assert!(json["message"].as_str().unwrap().contains("Merge PDFs"));
}

#[tokio::test]
async fn test_async_split() {
    let result = convert_async(
        ConversionTask::SplitPdf,
        vec![pdf_file("s.pdf", make_pdf(4, 100, "S"))],
        ConversionParams::new().page_range(3, 3),
        ConversionConfig::default(),
    )
    .await;
    let artifacts = package(result, ConversionTask::SplitPdf).unwrap();
    assert_eq!(page_widths(&artifacts[0].bytes), vec![102]);
}

// ── Properties ───────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_merge_page_count_is_sum(a in 1u32..5, b in 1u32..5) {
        let artifact = run_single(
            ConversionTask::MergePdfs,
            vec![pdf_file("a.pdf", make_pdf(a, 100, "A")), pdf_file("b.pdf", make_pdf(b, 300, "B"))],
            ConversionParams::new(),
        );
        let widths = page_widths(&artifact.bytes);
        prop_assert_eq!(widths.len() as u32, a + b);
        prop_assert!(widths[..a as usize].iter().all(|w| *w < 300));
    }

    #[test]
    fn prop_split_keeps_clamped_range(pages in 1u32..7, start in 1u32..8, extra in 0u32..5) {
        let end = start + extra;
        let artifact = run_single(
            ConversionTask::SplitPdf,
            vec![pdf_file("s.pdf", make_pdf(pages, 100, "S"))],
            ConversionParams::new().page_range(start, end),
        );
        let expected: Vec<i64> = (start..=end.min(pages)).map(|p| 100 + p as i64 - 1).collect();
        prop_assert_eq!(page_widths(&artifact.bytes), expected);
    }

    #[test]
    fn prop_full_split_reproduces_pages(pages in 1u32..7) {
        let source = make_pdf(pages, 100, "F");
        let artifact = run_single(
            ConversionTask::SplitPdf,
            vec![pdf_file("f.pdf", source.clone())],
            ConversionParams::new().page_range(1, pages),
        );
        prop_assert_eq!(page_widths(&artifact.bytes), page_widths(&source));
    }
}

// ── pdfium-backed (gated) ────────────────────────────────────────────────────

#[test]
fn test_pdf_to_jpg_one_image_per_page() {
    e2e_skip_unless_ready!();
    let result = convert(
        ConversionTask::PdfToJpg,
        vec![pdf_file("three.pdf", make_pdf(3, 300, "Render"))],
        &ConversionParams::new(),
        &ConversionConfig::builder().dpi(72).build().unwrap(),
    );
    let artifacts = package(result, ConversionTask::PdfToJpg).unwrap();
    let names: Vec<&str> = artifacts.iter().map(|a| a.filename.as_str()).collect();
    assert_eq!(names, vec!["page_1.jpg", "page_2.jpg", "page_3.jpg"]);

    let first = image::load_from_memory(&artifacts[0].bytes).unwrap();
    assert_eq!(first.width(), 300);
}

#[test]
fn test_pdf_to_docx_extracts_text() {
    e2e_skip_unless_ready!();
    let artifact = run_single(
        ConversionTask::PdfToDocx,
        vec![pdf_file("hello.pdf", make_pdf(1, 300, "Hello"))],
        ConversionParams::new(),
    );
    assert_eq!(artifact.filename, "converted.docx");

    let paragraphs = read_paragraphs(&artifact.bytes, "converted.docx").unwrap();
    assert_eq!(paragraphs[0], "--- Page 1 ---");
    assert!(paragraphs[1].contains("Hello"), "got: {:?}", paragraphs[1]);
}

#[test]
fn test_protected_pdf_needs_password() {
    e2e_skip_unless_ready!();
    let artifact = run_single(
        ConversionTask::ProtectPdf,
        vec![pdf_file("p.pdf", make_pdf(2, 100, "P"))],
        ConversionParams::new().password("open-sesame"),
    );

    let pdfium = pdfdesk::engine::bind_pdfium(&ConversionConfig::default()).unwrap();
    assert!(pdfium.load_pdf_from_byte_slice(&artifact.bytes, Some("wrong")).is_err());
    let doc = pdfium
        .load_pdf_from_byte_slice(&artifact.bytes, Some("open-sesame"))
        .unwrap();
    assert_eq!(doc.pages().len(), 2);
}

#[test]
fn test_missing_pdfium_is_external_tool_failure() {
    if std::env::var("E2E_ENABLED").is_ok() {
        println!("SKIP — only meaningful without pdfium configured");
        return;
    }
    let config = ConversionConfig::builder()
        .pdfium_library_path("/definitely/not/libpdfium.so")
        .build()
        .unwrap();
    let result = convert(
        ConversionTask::PdfToJpg,
        vec![pdf_file("a.pdf", make_pdf(1, 100, "A"))],
        &ConversionParams::new(),
        &config,
    );
    // A system-wide pdfium may still bind; either way nothing panics.
    if let Some(failure) = result.failure() {
        assert_eq!(failure.kind, ErrorKind::ExternalToolFailure);
    }
}
