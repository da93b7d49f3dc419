use zonecount::segment::{BoundingBox, Detection, SegmentResult, postprocess, suppress_full_image_box};

fn det(x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
    Detection::new(BoundingBox::new(x1, y1, x2, y2), 0, "object".to_string(), 0.7)
}

#[test]
fn only_near_full_boxes_are_replaced() {
    let mut result = SegmentResult::new(
        1280,
        720,
        vec![det(3.0, 4.0, 1277.0, 716.0), det(100.0, 100.0, 400.0, 300.0), det(0.0, 0.0, 700.0, 720.0)],
    );
    let replaced = suppress_full_image_box(&mut result, 0.9);

    assert_eq!(replaced, vec![0]);
    assert_eq!(result.detections[0].bbox, BoundingBox::full_image(1280, 720));
    assert_eq!(result.detections[1].bbox, BoundingBox::new(100.0, 100.0, 400.0, 300.0));
    assert_eq!(result.detections[2].bbox, BoundingBox::new(0.0, 0.0, 700.0, 720.0));
}

#[test]
fn threshold_is_strict() {
    // IoU恰好为0.9时不替换
    let mut result = SegmentResult::new(1000, 1000, vec![det(0.0, 0.0, 900.0, 1000.0)]);
    let before = result.clone();
    assert!(suppress_full_image_box(&mut result, 0.9).is_empty());
    assert_eq!(result, before);
}

#[test]
fn empty_batch_stays_empty() {
    let results = postprocess(vec![SegmentResult::new(640, 640, Vec::new())]);
    assert_eq!(results, vec![SegmentResult::new(640, 640, Vec::new())]);
    assert!(postprocess(Vec::new()).is_empty());
}

#[test]
fn track_ids_and_scores_survive_replacement() {
    let mut result = SegmentResult::new(640, 480, vec![det(0.0, 0.0, 640.0, 470.0).with_track_id(9)]);
    suppress_full_image_box(&mut result, 0.9);
    assert_eq!(result.detections[0].track_id, Some(9));
    assert_eq!(result.detections[0].confidence, 0.7);
    assert_eq!(result.detections[0].bbox, BoundingBox::full_image(640, 480));
}
