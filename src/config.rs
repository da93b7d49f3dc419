// 目标检测超参数配置
pub const DEFAULT_INPUT_WIDTH: usize = 640;
pub const DEFAULT_INPUT_HEIGHT: usize = 640;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.4;
pub const DEFAULT_NMS_THRESHOLD: f32 = 0.7;
pub const DEFAULT_CLASS_LABEL: &str = "object";

// 全图框抑制
pub const FULL_BOX_IOU_THRESHOLD: f32 = 0.9;
pub const BORDER_SNAP_THRESHOLD: f32 = 20.0;

// 绘制参数
pub const DEFAULT_LINE_WIDTH: u32 = 2;
pub const REGION_COLOR: [u8; 3] = [104, 0, 123];
pub const LABEL_FONT_SIZE: f32 = 14.0;

// 轨迹与跟踪
pub const TRACK_HISTORY_LEN: usize = 30;
pub const STALE_TRACK_FRAMES: u64 = 30;
pub const TRACKER_IOU_THRESHOLD: f32 = 0.3;
pub const TRACKER_MAX_AGE: u64 = 30;

/// 未配置区域时使用的默认矩形区域
pub const DEFAULT_REGION: [(f64, f64); 4] = [(20.0, 400.0), (1080.0, 400.0), (1080.0, 360.0), (20.0, 360.0)];
