use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        size: ImageSize::new(4, 2),
        fps: 30,
    }
}

#[test]
fn in_memory_sink_collects_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameNumber(3), &image::RgbImage::new(4, 2))
        .unwrap();
    sink.push_frame(FrameNumber(8), &image::RgbImage::new(4, 2))
        .unwrap();
    sink.end().unwrap();

    assert!(sink.is_finished());
    assert_eq!(sink.config(), Some(cfg()));
    let order: Vec<_> = sink.frames().iter().map(|(f, _)| *f).collect();
    assert_eq!(order, vec![FrameNumber(3), FrameNumber(8)]);
}

#[test]
fn rejects_push_before_begin() {
    let mut sink = InMemorySink::new();
    assert!(
        sink.push_frame(FrameNumber(1), &image::RgbImage::new(4, 2))
            .is_err()
    );
}

#[test]
fn rejects_out_of_order_and_repeated_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameNumber(5), &image::RgbImage::new(4, 2))
        .unwrap();
    assert!(
        sink.push_frame(FrameNumber(5), &image::RgbImage::new(4, 2))
            .is_err()
    );
    assert!(
        sink.push_frame(FrameNumber(4), &image::RgbImage::new(4, 2))
            .is_err()
    );
}

#[test]
fn rejects_wrong_canvas_size() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    let err = sink
        .push_frame(FrameNumber(1), &image::RgbImage::new(2, 4))
        .unwrap_err();
    assert!(err.to_string().contains("frame size mismatch"));
}
