use super::*;

#[test]
fn camera_id_rejects_empty_and_underscore() {
    assert!(CameraId::new("").is_err());
    assert!(CameraId::new("Dev_0").is_err());
    assert_eq!(CameraId::new("Dev0").unwrap().as_str(), "Dev0");
}

#[test]
fn camera_id_parses_from_str() {
    let id: CameraId = "Cam12".parse().unwrap();
    assert_eq!(id.to_string(), "Cam12");
}

#[test]
fn frame_numbers_order_numerically() {
    let mut v = vec![FrameNumber(10), FrameNumber(2), FrameNumber(7)];
    v.sort();
    assert_eq!(v, vec![FrameNumber(2), FrameNumber(7), FrameNumber(10)]);
}

#[test]
fn image_size_empty_and_display() {
    assert!(ImageSize::new(0, 4).is_empty());
    assert!(!ImageSize::new(3, 4).is_empty());
    assert_eq!(ImageSize::new(640, 480).to_string(), "640x480");
}
