use anyhow::{Result, anyhow};
use image::DynamicImage;
use ort::session::Session;
use std::time::Instant;

use crate::config::{
    DEFAULT_CLASS_LABEL, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_INPUT_HEIGHT, DEFAULT_INPUT_WIDTH,
    DEFAULT_NMS_THRESHOLD, FULL_BOX_IOU_THRESHOLD,
};
use crate::segment::bounds::{Detection, SegmentResult};
use crate::segment::prevs::{ScaleMessage, image_to_tensor, resize_image};
use crate::segment::infer::run_inference;
use crate::segment::model::load_model;
use crate::segment::posts::{process_detections, suppress_full_image_box};

/// 单帧检测接口
///
/// 由分割预测器实现，也可以由测试或其它模型后端实现。
pub trait Detector {
    fn detect(&mut self, img: &DynamicImage) -> Result<Vec<Detection>>;
}

/// 快速分割模型预测器
///
/// 封装了完整的预测流程：图像预处理、模型推理、结果后处理，
/// 最后把接近整幅图像的框归一化为全图框。
///
/// # 示例
///
/// ```no_run
/// use zonecount::segment::SegmentPredictor;
///
/// # fn main() -> anyhow::Result<()> {
/// let mut predictor = SegmentPredictor::from_path("models/fastsam-s.onnx")?
///     .with_confidence_threshold(0.5)
///     .with_full_box_iou_threshold(0.9);
/// let image = zonecount::segment::load_image("frame.jpg")?;
/// let result = predictor.predict(&image)?;
/// println!("{} 个目标", result.detections.len());
/// # Ok(())
/// # }
/// ```
pub struct SegmentPredictor {
    /// ONNX模型会话
    model: Session,
    /// 模型输入宽度
    input_width: usize,
    /// 模型输入高度
    input_height: usize,
    /// 置信度阈值，低于此值的检测结果将被过滤
    confidence_threshold: f32,
    /// NMS（非极大值抑制）阈值，用于去除重复检测
    nms_threshold: f32,
    /// 与全图框的IoU超过此值的框会被替换为全图框
    full_box_iou_threshold: f32,
    class_names: Vec<String>,
}

impl SegmentPredictor {
    pub fn new(model: Session, input_width: usize, input_height: usize) -> Self {
        Self {
            model,
            input_width,
            input_height,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            nms_threshold: DEFAULT_NMS_THRESHOLD,
            full_box_iou_threshold: FULL_BOX_IOU_THRESHOLD,
            class_names: vec![DEFAULT_CLASS_LABEL.to_string()],
        }
    }

    /// 从模型文件创建预测器，使用默认输入尺寸
    pub fn from_path(model_path: &str) -> Result<Self> {
        let model = load_model(model_path, 4).map_err(|e| anyhow!("无法加载模型 {}: {}", model_path, e))?;
        log::info!("已加载模型: {}", model_path);
        Ok(Self::new(model, DEFAULT_INPUT_WIDTH, DEFAULT_INPUT_HEIGHT))
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_nms_threshold(mut self, threshold: f32) -> Self {
        self.nms_threshold = threshold;
        self
    }

    pub fn with_full_box_iou_threshold(mut self, threshold: f32) -> Self {
        self.full_box_iou_threshold = threshold;
        self
    }

    pub fn with_class_names(mut self, class_names: Vec<String>) -> Self {
        self.class_names = class_names;
        self
    }

    pub fn input_size(&self) -> (usize, usize) {
        (self.input_width, self.input_height)
    }

    /// 完整的预测流程：从图像到后处理完成的结果
    pub fn predict(&mut self, img: &DynamicImage) -> Result<SegmentResult> {
        let message = ScaleMessage::new(img.width(), img.height(), self.input_width, self.input_height);
        let resized_img = resize_image(img, self.input_width as u32, self.input_height as u32);
        let input_tensor = image_to_tensor(&resized_img, self.input_height, self.input_width);

        let start_time = Instant::now();
        let output = run_inference(&mut self.model, &input_tensor)?;
        log::debug!("模型推理耗时: {:?}", start_time.elapsed());

        let detections = process_detections(
            &output,
            &message,
            &self.class_names,
            self.confidence_threshold,
            self.nms_threshold,
        );

        let mut result = SegmentResult::new(message.o_width, message.o_height, detections);
        suppress_full_image_box(&mut result, self.full_box_iou_threshold);
        Ok(result)
    }
}

impl Detector for SegmentPredictor {
    fn detect(&mut self, img: &DynamicImage) -> Result<Vec<Detection>> {
        Ok(self.predict(img)?.detections)
    }
}
