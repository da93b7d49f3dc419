//! 后处理模块
//!
//! 负责处理模型输出，进行坐标转换、置信度过滤、非极大值抑制(NMS)，
//! 以及把接近整幅图像的检测框归一化为全图框。

use ndarray::{Array2, Axis};

use crate::config::{BORDER_SNAP_THRESHOLD, DEFAULT_CLASS_LABEL, FULL_BOX_IOU_THRESHOLD};
use crate::segment::bounds::{BoundingBox, Detection, SegmentResult};
use crate::segment::prevs::ScaleMessage;

/// 处理模型输出，应用置信度和NMS阈值
///
/// 每一行的格式为`[x1, y1, x2, y2, conf, (class)]`，坐标相对于模型输入尺寸。
/// 缺少第6列时类别ID视为0。置信度或坐标不是有限值的行会被跳过。
///
/// # 参数
/// * `output` - 模型输出，形状为(num_boxes, num_params)，num_params >= 5
/// * `message` - 原始图像与模型输入的缩放信息
/// * `class_names` - 类别名称表，越界的类别ID使用默认名称
/// * `confidence_threshold` - 置信度阈值
/// * `nms_threshold` - NMS阈值
///
/// # 示例
///
/// ```
/// use ndarray::Array2;
/// use zonecount::segment::{ScaleMessage, process_detections};
///
/// let output = Array2::<f32>::zeros((10, 5));
/// let message = ScaleMessage::new(1920, 1080, 640, 640);
/// let detections = process_detections(&output, &message, &[], 0.5, 0.7);
/// assert!(detections.is_empty());
/// ```
pub fn process_detections(
    output: &Array2<f32>,
    message: &ScaleMessage,
    class_names: &[String],
    confidence_threshold: f32,
    nms_threshold: f32,
) -> Vec<Detection> {
    let mut detections = Vec::with_capacity(output.len_of(Axis(0)));
    let (scale_x, scale_y) = message.scale();

    for row in output.axis_iter(Axis(0)) {
        if row.len() < 5 {
            continue;
        }
        // NaN置信度或坐标的行直接丢弃，避免在排序中排到最前
        let confidence = row[4];
        if !confidence.is_finite() || confidence < confidence_threshold {
            continue;
        }
        if row.iter().take(4).any(|v| !v.is_finite()) {
            continue;
        }

        let class_id = if row.len() > 5 { row[5].max(0.0) as usize } else { 0 };
        let class_name = class_names
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| DEFAULT_CLASS_LABEL.to_string());

        let bbox = BoundingBox::new(row[0] * scale_x, row[1] * scale_y, row[2] * scale_x, row[3] * scale_y);
        detections.push(Detection::new(bbox, class_id, class_name, confidence));
    }

    // 不关心相等元素的顺序
    detections.sort_unstable_by(|a, b| b.confidence.total_cmp(&a.confidence));

    apply_nms(detections, nms_threshold)
}

/// 应用非极大值抑制
///
/// 输入需已按置信度降序排列。去除与更高置信度框IoU达到阈值的框，
/// 面积为0的框直接丢弃。
pub fn apply_nms(detections: Vec<Detection>, nms_threshold: f32) -> Vec<Detection> {
    let mut suppressed = vec![false; detections.len()];
    let mut result = Vec::new();

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        if !detections[i].bbox.is_valid() {
            suppressed[i] = true;
            continue;
        }

        for j in (i + 1)..detections.len() {
            if suppressed[j] {
                continue;
            }
            if detections[i].bbox.iou(&detections[j].bbox) >= nms_threshold {
                suppressed[j] = true;
            }
        }
    }

    for (detection, suppressed) in detections.into_iter().zip(suppressed) {
        if !suppressed {
            result.push(detection);
        }
    }
    result
}

/// 把距离图像边缘小于`threshold`像素的边吸附到边缘上
pub fn snap_to_border(bbox: &BoundingBox, width: u32, height: u32, threshold: f32) -> BoundingBox {
    let (w, h) = (width as f32, height as f32);
    let mut snapped = *bbox;
    if snapped.x1 < threshold {
        snapped.x1 = 0.0;
    }
    if snapped.y1 < threshold {
        snapped.y1 = 0.0;
    }
    if snapped.x2 > w - threshold {
        snapped.x2 = w;
    }
    if snapped.y2 > h - threshold {
        snapped.y2 = h;
    }
    snapped
}

/// 全图框抑制
///
/// 以`[0, 0, orig_width, orig_height]`作为参考框，计算它与每个预测框的IoU，
/// IoU严格大于`iou_threshold`的预测框坐标被替换为全图框。
/// 计算IoU前预测框会先吸附到图像边缘，但吸附只作用于副本，
/// 未被替换的框保持原坐标。
///
/// 返回被替换的检测索引。
pub fn suppress_full_image_box(result: &mut SegmentResult, iou_threshold: f32) -> Vec<usize> {
    let full_box = BoundingBox::full_image(result.orig_width, result.orig_height);

    let replaced: Vec<usize> = result
        .detections
        .iter()
        .enumerate()
        .filter(|(_, det)| {
            let snapped = snap_to_border(&det.bbox, result.orig_width, result.orig_height, BORDER_SNAP_THRESHOLD);
            full_box.iou(&snapped) > iou_threshold
        })
        .map(|(idx, _)| idx)
        .collect();

    for &idx in &replaced {
        result.detections[idx].bbox = full_box;
    }

    if !replaced.is_empty() {
        log::debug!(
            "{}x{} 图像中 {} 个检测框被替换为全图框",
            result.orig_width,
            result.orig_height,
            replaced.len()
        );
    }
    replaced
}

/// 对一批结果应用默认阈值的全图框抑制
pub fn postprocess(mut results: Vec<SegmentResult>) -> Vec<SegmentResult> {
    for result in &mut results {
        suppress_full_image_box(result, FULL_BOX_IOU_THRESHOLD);
    }
    results
}
