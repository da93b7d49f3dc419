//! Segment模块 - 快速分割模型的预测与后处理
//!
//! 该模块提供：
//! - 模型加载
//! - 图像预处理
//! - 模型推理
//! - 结果后处理（置信度过滤、NMS、全图框抑制）
//!
//! # 全图框抑制
//!
//! 快速分割模型有时会把整幅图像当作一个区域输出。后处理会把与全图框IoU
//! 超过阈值（默认0.9）的预测框坐标直接替换为`[0, 0, 宽, 高]`。
//!
//! # 示例
//!
//! ```
//! use zonecount::segment::{BoundingBox, Detection, SegmentResult, suppress_full_image_box};
//!
//! let det = Detection::new(BoundingBox::new(2.0, 1.0, 639.0, 478.0), 0, "object".into(), 0.9);
//! let mut result = SegmentResult::new(640, 480, vec![det]);
//! suppress_full_image_box(&mut result, 0.9);
//! assert_eq!(result.detections[0].bbox, BoundingBox::full_image(640, 480));
//! ```

pub mod bounds;
pub mod prevs;
pub mod infer;
pub mod model;
pub mod posts;
pub mod predict;

pub use bounds::{BoundingBox, Detection, SegmentResult};
pub use prevs::{ScaleMessage, image_to_tensor, load_image, resize_image};
pub use model::load_model;
pub use posts::{apply_nms, postprocess, process_detections, snap_to_border, suppress_full_image_box};
pub use predict::{Detector, SegmentPredictor};
