//! 帧标注：检测框、标签、区域轮廓、轨迹与计数徽标

pub mod annotator;

pub use annotator::{Annotator, load_label_font, measure_text};
