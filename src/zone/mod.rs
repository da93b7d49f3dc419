//! Zone模块 - 多边形区域内的目标计数
//!
//! 每一帧的流程：
//! 1. 获取当前帧已跟踪的检测（外部传入，或从`TrackSource`获取）
//! 2. 按`CountPolicy`决定是否清零计数
//! 3. 绘制所有区域轮廓
//! 4. 对每个已跟踪检测计算代表点，按区域顺序做包含判断，第一个命中的区域计数加一
//! 5. 绘制检测框、标签和轨迹
//! 6. 在每个区域中心绘制计数
//!
//! # 示例
//!
//! ```
//! use image::{DynamicImage, RgbaImage};
//! use zonecount::segment::{BoundingBox, Detection};
//! use zonecount::zone::{Zone, ZoneConfig, ZoneCounter};
//!
//! # fn main() -> anyhow::Result<()> {
//! let zone = Zone::new("door", [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])?;
//! let mut counter = ZoneCounter::new(ZoneConfig::new(vec![zone])?.with_labels(false));
//!
//! let frame = DynamicImage::ImageRgba8(RgbaImage::new(64, 64));
//! let det = Detection::new(BoundingBox::new(3.0, 3.0, 7.0, 7.0), 0, "object".into(), 0.9).with_track_id(1);
//! let _annotated = counter.process(&frame, &[det]);
//! assert_eq!(counter.zone_count(0), 1);
//! # Ok(())
//! # }
//! ```

pub mod counter;
pub mod geometry;
pub mod track;
pub mod zones;

pub use counter::{CounterState, TrackHistory, ZoneCounter, ZoneCounts, assign_zone, count_objects_in_zones, tally};
pub use geometry::{Point, Polygon};
pub use track::{IouTracker, TrackSource, Tracker, TrackingPipeline};
pub use zones::{AnchorPolicy, CountPolicy, Zone, ZoneConfig};
