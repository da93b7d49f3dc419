pub mod config;
pub mod draw;
pub mod segment;
pub mod utils;
pub mod zone;

// 重新导出常用类型和函数
pub use segment::{BoundingBox, Detection, Detector, SegmentPredictor, SegmentResult, suppress_full_image_box};
pub use segment::{load_image, load_model};
pub use zone::{AnchorPolicy, CountPolicy, Zone, ZoneConfig, ZoneCounter, count_objects_in_zones};
