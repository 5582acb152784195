//! End-to-end pricing tests with in-process converter and rasterizer.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use image::{DynamicImage, GrayImage, Luma};
use lopdf::{Document as PdfDocument, Object, dictionary};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use printdesk_core::error::{ConvertError, RenderError};
use printdesk_core::models::config::PricingConfig;
use printdesk_core::{
    CostCalculator, Document, DocumentConverter, ErrorKind, InkClassifier, PageRasterizer,
};

/// Build a PDF with `pages` empty pages.
fn pdf_with_pages(pages: u32) -> Vec<u8> {
    let mut doc = PdfDocument::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }))
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Renders pages listed in `inked` as half-black, all others as white.
struct ScriptedRasterizer {
    inked: HashSet<u32>,
    failing: Option<u32>,
    rendered: Mutex<Vec<u32>>,
}

impl ScriptedRasterizer {
    fn new(inked: &[u32]) -> Self {
        Self {
            inked: inked.iter().copied().collect(),
            failing: None,
            rendered: Mutex::new(Vec::new()),
        }
    }

    fn failing_on(mut self, page: u32) -> Self {
        self.failing = Some(page);
        self
    }

    fn rendered(&self) -> Vec<u32> {
        self.rendered.lock().unwrap().clone()
    }
}

impl PageRasterizer for ScriptedRasterizer {
    fn name(&self) -> &str {
        "scripted"
    }

    fn render_page(&self, pdf_path: &Path, page: u32, _dpi: u32) -> Result<DynamicImage, RenderError> {
        assert!(pdf_path.exists(), "rendered PDF must exist while classifying");
        self.rendered.lock().unwrap().push(page);

        if self.failing == Some(page) {
            return Err(RenderError::page(page, "corrupt content stream"));
        }

        let mut img = GrayImage::from_pixel(20, 20, Luma([255]));
        if self.inked.contains(&page) {
            for y in 0..10 {
                for x in 0..20 {
                    img.put_pixel(x, y, Luma([0]));
                }
            }
        }
        Ok(DynamicImage::ImageLuma8(img))
    }
}

/// Converts any input into a fixed PDF and remembers the sources it saw.
struct StubConverter {
    output: Vec<u8>,
    sources: Mutex<Vec<String>>,
}

impl StubConverter {
    fn new(output: Vec<u8>) -> Self {
        Self {
            output,
            sources: Mutex::new(Vec::new()),
        }
    }

    fn sources(&self) -> Vec<String> {
        self.sources.lock().unwrap().clone()
    }
}

impl DocumentConverter for StubConverter {
    fn name(&self) -> &str {
        "stub"
    }

    fn convert_to_pdf(&self, source: &Path, _out_dir: &Path) -> Result<Vec<u8>, ConvertError> {
        assert!(source.exists(), "source must be persisted before conversion");
        let name = source.file_name().unwrap().to_string_lossy().into_owned();
        self.sources.lock().unwrap().push(name);
        Ok(self.output.clone())
    }
}

fn calculator(
    root: &Path,
    rasterizer: ScriptedRasterizer,
) -> CostCalculator<StubConverter, ScriptedRasterizer> {
    CostCalculator::new(
        StubConverter::new(pdf_with_pages(3)),
        rasterizer,
    )
    .with_temp_root(root)
}

fn assert_scope_empty(root: &Path) {
    let leftovers: Vec<_> = fs::read_dir(root).unwrap().collect();
    assert!(leftovers.is_empty(), "temporary artifacts left behind: {:?}", leftovers);
}

fn sample_pdf(name: &str) -> Document {
    Document::new(pdf_with_pages(4), name, "1-3", "4")
}

#[test]
fn test_single_document_pricing() {
    let root = tempfile::tempdir().unwrap();
    let calc = calculator(root.path(), ScriptedRasterizer::new(&[1]));

    let quote = calc.compute_cost(&[sample_pdf("notes.pdf")]).unwrap();

    // 5 * 1 content + 2 * 2 low output + 10 * 1 colored
    assert_eq!(quote.total, Decimal::from(19));
    assert_eq!(quote.cost(), 19.0);
    let item = &quote.items[0];
    assert_eq!(
        (item.black_pages, item.non_black_pages, item.colored_pages),
        (1, 2, 1)
    );
    assert_scope_empty(root.path());
}

#[test]
fn test_batch_accumulates() {
    let root = tempfile::tempdir().unwrap();
    let calc = calculator(root.path(), ScriptedRasterizer::new(&[1]));

    let quote = calc
        .compute_cost(&[sample_pdf("a.pdf"), sample_pdf("b.PDF")])
        .unwrap();

    assert_eq!(quote.total, Decimal::from(38));
    assert_eq!(quote.items.len(), 2);
    assert_scope_empty(root.path());
}

#[test]
fn test_repeated_calls_are_idempotent() {
    let root = tempfile::tempdir().unwrap();
    let calc = calculator(root.path(), ScriptedRasterizer::new(&[1, 3]));
    let docs = vec![sample_pdf("a.pdf"), Document::new(vec![0x50, 0x4b], "b.docx", "1-2", "")];

    let first = calc.compute_cost(&docs).unwrap();
    let second = calc.compute_cost(&docs).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_docx_is_converted_before_classification() {
    let root = tempfile::tempdir().unwrap();
    let calc = calculator(root.path(), ScriptedRasterizer::new(&[2]));

    let quote = calc
        .compute_cost(&[Document::new(b"PK\x03\x04".to_vec(), "essay.DOCX", "1-3", "")])
        .unwrap();

    assert_eq!(quote.total, Decimal::from(2 + 5 + 2));
    assert_eq!(quote.items[0].format, printdesk_core::DocumentFormat::Docx);
    assert_scope_empty(root.path());
}

#[test]
fn test_out_of_range_pages_are_ignored() {
    let root = tempfile::tempdir().unwrap();
    let rasterizer = ScriptedRasterizer::new(&[1, 2, 3]);
    let calc = calculator(root.path(), rasterizer);

    let quote = calc
        .compute_cost(&[Document::new(pdf_with_pages(3), "short.pdf", "99", "")])
        .unwrap();

    assert_eq!(quote.total, Decimal::ZERO);
    assert_eq!(quote.items[0].black_pages + quote.items[0].non_black_pages, 0);
}

#[test]
fn test_pages_are_clamped_and_measured_once() {
    let rasterizer = ScriptedRasterizer::new(&[]);
    let classifier = InkClassifier::new(rasterizer);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("three.pdf");
    fs::write(&path, pdf_with_pages(3)).unwrap();

    let result = classifier.classify_expr(&path, "2-5,2,1").unwrap();

    assert_eq!(result.page_count, 3);
    assert_eq!(classifier.rasterizer().rendered(), vec![1, 2, 3]);
    assert_eq!(result.non_black.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(result.black_content.is_empty());
}

#[test]
fn test_overlapping_colored_ranges_bill_each_occurrence() {
    let root = tempfile::tempdir().unwrap();
    let calc = calculator(root.path(), ScriptedRasterizer::new(&[]));

    let quote = calc
        .compute_cost(&[Document::new(pdf_with_pages(4), "c.pdf", "", "1-3,2-4")])
        .unwrap();

    assert_eq!(quote.items[0].colored_pages, 6);
    assert_eq!(quote.total, Decimal::from(60));
}

#[test]
fn test_empty_declarations_cost_nothing() {
    let root = tempfile::tempdir().unwrap();
    let calc = calculator(root.path(), ScriptedRasterizer::new(&[1]));

    let quote = calc
        .compute_cost(&[Document::new(pdf_with_pages(2), "a.pdf", "", "")])
        .unwrap();
    assert_eq!(quote.total, Decimal::ZERO);

    let quote = calc.compute_cost(&[]).unwrap();
    assert_eq!(quote.total, Decimal::ZERO);
    assert!(quote.items.is_empty());
}

#[test]
fn test_unsupported_format_fails_whole_batch() {
    let root = tempfile::tempdir().unwrap();
    let calc = calculator(root.path(), ScriptedRasterizer::new(&[1]));

    let err = calc
        .compute_cost(&[
            sample_pdf("a.pdf"),
            Document::new(b"hello".to_vec(), "readme.txt", "1", ""),
            sample_pdf("c.pdf"),
        ])
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    assert!(err.is_client_error());
    assert_scope_empty(root.path());
}

#[test]
fn test_malformed_range_fails_before_rendering() {
    let root = tempfile::tempdir().unwrap();
    let calc = calculator(root.path(), ScriptedRasterizer::new(&[1]));

    for (content, colored) in [("3-1", ""), ("1", "abc")] {
        let err = calc
            .compute_cost(&[
                sample_pdf("a.pdf"),
                Document::new(pdf_with_pages(2), "b.pdf", content, colored),
            ])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRange);
        assert_eq!(err.status_code(), 400);
    }

    assert_scope_empty(root.path());
}

#[test]
fn test_conversion_without_output_fails() {
    let root = tempfile::tempdir().unwrap();
    let calc = CostCalculator::new(
        StubConverter::new(Vec::new()),
        ScriptedRasterizer::new(&[1]),
    )
    .with_temp_root(root.path());

    let err = calc
        .compute_cost(&[sample_pdf("a.pdf"), Document::new(b"PK".to_vec(), "b.docx", "1", "")])
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConversionFailed);
    assert_eq!(err.status_code(), 500);
    assert_scope_empty(root.path());
}

#[test]
fn test_render_failure_fails_batch_and_cleans_up() {
    let root = tempfile::tempdir().unwrap();
    let calc = calculator(root.path(), ScriptedRasterizer::new(&[1]).failing_on(2));

    let err = calc.compute_cost(&[sample_pdf("a.pdf")]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ClassificationFailed);
    assert!(!err.is_client_error());
    assert_scope_empty(root.path());
}

#[test]
fn test_mismatched_parallel_lists() {
    let root = tempfile::tempdir().unwrap();
    let calc = calculator(root.path(), ScriptedRasterizer::new(&[1]));

    let err = calc
        .compute_cost_from_parts(
            vec![
                ("a.pdf".to_string(), pdf_with_pages(1)),
                ("b.pdf".to_string(), pdf_with_pages(1)),
            ],
            vec!["1".to_string(), "1".to_string()],
            vec!["".to_string()],
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_custom_pricing() {
    let root = tempfile::tempdir().unwrap();
    let pricing = PricingConfig {
        low_output_page: Decimal::new(150, 2),
        content_page: Decimal::from(3),
        colored_page: Decimal::from(8),
    };
    let calc = calculator(root.path(), ScriptedRasterizer::new(&[1])).with_pricing(pricing);

    let quote = calc.compute_cost(&[sample_pdf("a.pdf")]).unwrap();
    assert_eq!(quote.total, Decimal::new(1400, 2));
}

#[test]
fn test_classify_document() {
    let root = tempfile::tempdir().unwrap();
    let calc = calculator(root.path(), ScriptedRasterizer::new(&[2, 4]));

    let result = calc
        .classify_document(&Document::new(pdf_with_pages(4), "scan.pdf", "1-4", ""))
        .unwrap();

    assert_eq!(result.black_content.into_iter().collect::<Vec<_>>(), vec![2, 4]);
    assert_eq!(result.reports.len(), 4);
    assert_eq!(result.reports[1].coverage, 0.5);
    assert_scope_empty(root.path());
}

#[test]
fn test_docx_goes_through_normalizer() {
    let root = tempfile::tempdir().unwrap();
    let calc = calculator(root.path(), ScriptedRasterizer::new(&[]));

    calc.compute_cost(&[
        sample_pdf("a.pdf"),
        Document::new(b"PK".to_vec(), "my.report.docx", "1", ""),
    ])
    .unwrap();

    // PDFs are never handed to the converter
    assert_eq!(calc.converter().sources(), vec!["source.docx".to_string()]);
}

#[test]
fn test_price_overflow_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    let pricing = PricingConfig {
        colored_page: Decimal::MAX,
        ..PricingConfig::default()
    };
    let calc = calculator(root.path(), ScriptedRasterizer::new(&[])).with_pricing(pricing);

    let err = calc
        .compute_cost(&[Document::new(pdf_with_pages(2), "a.pdf", "", "1-2")])
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert_scope_empty(root.path());
}

#[test]
fn test_hostile_colored_expression_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let calc = calculator(root.path(), ScriptedRasterizer::new(&[]));
    let colored = vec!["1-100000"; 200].join(",");

    let err = calc
        .compute_cost(&[Document::new(pdf_with_pages(1), "a.pdf", "", colored)])
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedRange);
    assert_scope_empty(root.path());
}
