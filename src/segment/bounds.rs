/// 边界框结构
///
/// 表示一个矩形边界框（xyxy像素坐标），用于包围检测到的目标。
#[derive(Debug, Clone, Default, Copy, PartialEq)]
pub struct BoundingBox {
    /// 左上角x坐标
    pub x1: f32,
    /// 左上角y坐标
    pub y1: f32,
    /// 右下角x坐标
    pub x2: f32,
    /// 右下角y坐标
    pub y2: f32,
}

impl BoundingBox {
    /// 创建一个新的边界框
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// 覆盖整幅图像的边界框 `[0, 0, width, height]`
    pub fn full_image(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    /// 计算边界框的宽度
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).abs()
    }

    /// 计算边界框的高度
    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).abs()
    }

    /// 计算边界框的面积
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// 检查边界框是否有效（宽度和高度都大于0）
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// 边界框的几何中心
    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// 计算与另一个边界框的交集面积
    pub fn intersection(&self, other: &BoundingBox) -> f32 {
        let x_left = self.x1.max(other.x1);
        let y_top = self.y1.max(other.y1);
        let x_right = self.x2.min(other.x2);
        let y_bottom = self.y2.min(other.y2);

        if x_right <= x_left || y_bottom <= y_top {
            0.0
        } else {
            (x_right - x_left) * (y_bottom - y_top)
        }
    }

    /// 计算与另一个边界框的IoU（交并比）
    ///
    /// 并集面积为0时返回0。
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let inter = self.intersection(other);
        let union_area = self.area() + other.area() - inter;
        if union_area <= 0.0 {
            0.0
        } else {
            inter / union_area
        }
    }
}

/// 检测结果结构
///
/// 包含检测到的目标的完整信息。跟踪器为其分配`track_id`后即为“已跟踪检测”。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    /// 目标的边界框
    pub bbox: BoundingBox,
    /// 类别ID
    pub class_id: usize,
    /// 类别名称
    pub class_name: String,
    /// 置信度
    pub confidence: f32,
    /// 跟踪ID，由外部跟踪器提供
    pub track_id: Option<u64>,
}

impl Detection {
    /// 创建一个新的检测结果（尚未跟踪）
    pub fn new(bbox: BoundingBox, class_id: usize, class_name: String, confidence: f32) -> Self {
        Self { bbox, class_id, class_name, confidence, track_id: None }
    }

    /// 附加跟踪ID
    pub fn with_track_id(mut self, track_id: u64) -> Self {
        self.track_id = Some(track_id);
        self
    }
}

/// 一幅图像的检测结果及其原始尺寸
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentResult {
    /// 原始图像宽度
    pub orig_width: u32,
    /// 原始图像高度
    pub orig_height: u32,
    /// 检测结果列表
    pub detections: Vec<Detection>,
}

impl SegmentResult {
    pub fn new(orig_width: u32, orig_height: u32, detections: Vec<Detection>) -> Self {
        Self { orig_width, orig_height, detections }
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let b = BoundingBox::new(10.0, 10.0, 50.0, 30.0);
        assert!((b.iou(&b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(a.intersection(&b), 0.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_of_half_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 0.0, 15.0, 10.0);
        // 交集50，并集150
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_boxes_have_zero_iou() {
        let a = BoundingBox::new(5.0, 5.0, 5.0, 5.0);
        assert!(!a.is_valid());
        assert_eq!(a.iou(&a), 0.0);
    }

    #[test]
    fn center_uses_both_axes() {
        let b = BoundingBox::new(0.0, 10.0, 20.0, 30.0);
        assert_eq!(b.center(), (10.0, 20.0));
    }
}
