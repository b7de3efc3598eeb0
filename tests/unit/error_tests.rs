// Error classification unit tests

use pdfstamp::watermark::WatermarkError;
use std::path::PathBuf;

#[test]
fn test_page_number_attached_to_per_page_errors() {
    let err = WatermarkError::OverlayRender {
        page: None,
        message: "page has no MediaBox".to_string(),
    }
    .at_page(4);
    assert_eq!(
        err.to_string(),
        "Failed to render watermark overlay on page 4: page has no MediaBox"
    );

    let err = WatermarkError::Composite {
        page: None,
        message: "size mismatch".to_string(),
    }
    .at_page(2);
    assert!(matches!(err, WatermarkError::Composite { page: Some(2), .. }));
}

#[test]
fn test_at_page_leaves_other_errors_alone() {
    let err = WatermarkError::InvalidSpec("text must not be empty".to_string()).at_page(3);
    assert_eq!(
        err.to_string(),
        "Invalid watermark settings: text must not be empty"
    );
}

#[test]
fn test_only_verification_failures_are_post_publish() {
    let path = PathBuf::from("out.pdf");
    assert!(WatermarkError::VerificationMismatch {
        path: path.clone(),
        expected: 3,
        actual: 1,
    }
    .is_post_publish());
    assert!(WatermarkError::VerificationError {
        path: path.clone(),
        message: "truncated".to_string(),
    }
    .is_post_publish());
    assert!(!WatermarkError::OutputWrite {
        path,
        message: "disk full".to_string(),
    }
    .is_post_publish());
    assert!(!WatermarkError::Config("bad".to_string()).is_post_publish());
}
