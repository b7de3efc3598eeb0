// End-to-end pipeline tests through the library API

use super::fixtures::{
    build_pdf, contains, form_contents, letter_pdf, page_sizes, write_file, A4, LETTER,
    LETTER_LANDSCAPE,
};
use lopdf::Document;
use pdfstamp::logging::{LogLevel, MemoryReporter};
use pdfstamp::watermark::output::temp_path_for;
use pdfstamp::watermark::{
    PipelineState, Placement, WatermarkError, WatermarkProcessor, WatermarkSpec,
};
use std::fs;

fn draft() -> WatermarkSpec {
    WatermarkSpec::builder().text("DRAFT").build().unwrap()
}

#[test]
fn test_three_letter_pages_stamped_with_draft() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "report.pdf", &letter_pdf(3));
    let output = dir.path().join("report-draft.pdf");
    let reporter = MemoryReporter::new();

    let report = WatermarkProcessor::new(draft(), &reporter)
        .apply_to_file(&input, &output)
        .unwrap();
    assert_eq!(report.pages, 3);

    let doc = Document::load(&output).unwrap();
    assert_eq!(page_sizes(&doc), vec![LETTER; 3]);

    for (index, page_id) in doc.get_pages().into_values().enumerate() {
        let content = doc.get_page_content(page_id).unwrap();
        let original = format!("(Original page {})", index + 1);
        assert!(contains(&content, original.as_bytes()), "page {}", index + 1);

        let forms = form_contents(&doc, page_id);
        assert_eq!(forms.len(), 1);
        assert!(contains(&forms[0], b"(DRAFT)"));
    }
}

#[test]
fn test_mixed_page_sizes_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let sizes = vec![LETTER, A4, LETTER_LANDSCAPE, A4];
    let input = write_file(dir.path(), "mixed.pdf", &build_pdf(&sizes));
    let output = dir.path().join("out.pdf");
    let reporter = MemoryReporter::new();

    WatermarkProcessor::new(WatermarkSpec::default(), &reporter)
        .apply_to_file(&input, &output)
        .unwrap();

    let doc = Document::load(&output).unwrap();
    assert_eq!(page_sizes(&doc), sizes);
}

#[test]
fn test_missing_input_produces_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.pdf");
    let reporter = MemoryReporter::new();

    let mut processor = WatermarkProcessor::new(draft(), &reporter);
    let err = processor
        .apply_to_file(&dir.path().join("nope.pdf"), &output)
        .unwrap_err();

    assert!(matches!(err, WatermarkError::SourceOpen { .. }));
    assert_eq!(processor.state(), PipelineState::Failed);
    assert!(!output.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_stream_output_is_valid_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "in.pdf", &letter_pdf(5));
    let reporter = MemoryReporter::new();
    let mut sink = Vec::new();

    WatermarkProcessor::new(draft(), &reporter)
        .apply_to_writer(&input, &mut sink)
        .unwrap();

    assert!(sink.starts_with(b"%PDF-"));
    let doc = Document::load_mem(&sink).unwrap();
    assert_eq!(doc.get_pages().len(), 5);
}

#[test]
fn test_progress_reported_for_long_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "long.pdf", &letter_pdf(25));
    let output = dir.path().join("out.pdf");
    let reporter = MemoryReporter::new();

    WatermarkProcessor::new(draft(), &reporter)
        .apply_to_file(&input, &output)
        .unwrap();

    let info = reporter.messages(LogLevel::Info);
    for expected in [
        "Processed 10/25 page(s)",
        "Processed 20/25 page(s)",
        "Processed 25/25 page(s)",
    ] {
        assert!(info.iter().any(|m| m == expected), "missing {}", expected);
    }
    assert_eq!(
        info.iter().filter(|m| m.starts_with("Processed")).count(),
        3
    );
    assert_eq!(Document::load(&output).unwrap().get_pages().len(), 25);
    assert!(reporter.events().iter().all(|e| e.source == "watermark"));
}

#[test]
fn test_failed_run_leaves_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    // second page has no area, so stamping fails part way through
    let input = write_file(
        dir.path(),
        "broken.pdf",
        &build_pdf(&[LETTER, (0.0, 792.0), LETTER]),
    );
    let output = write_file(dir.path(), "out.pdf", b"previous release");
    let reporter = MemoryReporter::new();

    let err = WatermarkProcessor::new(draft(), &reporter)
        .apply_to_file(&input, &output)
        .unwrap_err();

    assert!(matches!(
        err,
        WatermarkError::OverlayRender { page: Some(2), .. }
    ));
    assert_eq!(fs::read(&output).unwrap(), b"previous release");
    assert!(!temp_path_for(&output).exists());
}

#[test]
fn test_above_placement_draws_last() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "in.pdf", &letter_pdf(1));
    let output = dir.path().join("out.pdf");
    let reporter = MemoryReporter::new();

    WatermarkProcessor::new(draft(), &reporter)
        .with_placement(Placement::Above)
        .apply_to_file(&input, &output)
        .unwrap();

    let doc = Document::load(&output).unwrap();
    let page_id = doc.get_pages()[&1];
    let content = doc.get_page_content(page_id).unwrap();
    let original = content
        .windows(b"(Original page 1)".len())
        .position(|w| w == b"(Original page 1)")
        .unwrap();
    let invoke = content
        .windows(b"Do".len())
        .rposition(|w| w == b"Do")
        .unwrap();
    assert!(invoke > original);
}

#[test]
fn test_rotation_equivalent_modulo_360() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "in.pdf", &letter_pdf(1));
    let reporter = MemoryReporter::new();

    let forms: Vec<Vec<u8>> = [30.0, 390.0, -330.0]
        .iter()
        .map(|&degrees| {
            let spec = WatermarkSpec::builder().rotation(degrees).build().unwrap();
            let mut sink = Vec::new();
            WatermarkProcessor::new(spec, &reporter)
                .apply_to_writer(&input, &mut sink)
                .unwrap();
            let doc = Document::load_mem(&sink).unwrap();
            form_contents(&doc, doc.get_pages()[&1]).remove(0)
        })
        .collect();

    assert_eq!(forms[0], forms[1]);
    assert_eq!(forms[0], forms[2]);
}
