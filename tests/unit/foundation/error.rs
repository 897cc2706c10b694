use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MosaicError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(MosaicError::data("x").to_string().contains("data error:"));
    assert!(
        MosaicError::load("x")
            .to_string()
            .contains("frame load error:")
    );
    assert!(MosaicError::render("x").to_string().contains("render error:"));
    assert!(
        MosaicError::composite("x")
            .to_string()
            .contains("composite error:")
    );
    assert!(MosaicError::encode("x").to_string().contains("encode error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MosaicError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn per_frame_errors_are_not_fatal() {
    assert!(!MosaicError::load("x").is_fatal());
    assert!(!MosaicError::composite("x").is_fatal());
    assert!(MosaicError::configuration("x").is_fatal());
    assert!(MosaicError::data("x").is_fatal());
    assert!(MosaicError::encode("x").is_fatal());
}
