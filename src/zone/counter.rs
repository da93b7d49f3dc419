use anyhow::Result;
use font_kit::font::Font;
use image::DynamicImage;
use std::collections::{HashMap, VecDeque};

use crate::draw::{Annotator, load_label_font};
use crate::segment::{BoundingBox, Detection};
use crate::utils::colors::color_for;
use crate::zone::geometry::Point;
use crate::zone::track::TrackSource;
use crate::zone::zones::{AnchorPolicy, CountPolicy, Zone, ZoneConfig};

/// 每个区域的计数，按区域编号索引
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneCounts {
    counts: Vec<u64>,
}

impl ZoneCounts {
    /// 创建`zones`个全为0的计数
    pub fn new(zones: usize) -> Self {
        Self { counts: vec![0; zones] }
    }

    /// 没有记录的区域计数为0
    pub fn get(&self, zone: usize) -> u64 {
        self.counts.get(zone).copied().unwrap_or(0)
    }

    /// 区域计数加1，编号超出当前长度时自动扩展
    pub fn increment(&mut self, zone: usize) {
        if zone >= self.counts.len() {
            self.counts.resize(zone + 1, 0);
        }
        self.counts[zone] += 1;
    }

    /// 所有计数清零，长度不变
    pub fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
    }

    /// 所有区域的计数之和
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.counts
    }
}

#[derive(Debug, Clone, Default)]
struct Trail {
    points: VecDeque<(f32, f32)>,
    last_frame: u64,
}

/// 每条轨迹最近的框中心点，用于绘制轨迹线
#[derive(Debug, Clone, Default)]
pub struct TrackHistory {
    trails: HashMap<u64, Trail>,
}

impl TrackHistory {
    /// 追加一个点，最多保留`max_len`个，返回该轨迹当前的点序列
    pub fn record(&mut self, track_id: u64, bbox: &BoundingBox, frame: u64, max_len: usize) -> &[(f32, f32)] {
        let trail = self.trails.entry(track_id).or_default();
        trail.points.push_back(bbox.center());
        while trail.points.len() > max_len.max(1) {
            trail.points.pop_front();
        }
        trail.last_frame = frame;
        trail.points.make_contiguous()
    }

    /// 复制一条轨迹的点序列，轨迹不存在时返回`None`
    pub fn trail(&self, track_id: u64) -> Option<Vec<(f32, f32)>> {
        self.trails.get(&track_id).map(|t| t.points.iter().copied().collect())
    }

    /// 清理超过`stale_after`帧未更新的轨迹
    pub fn prune(&mut self, frame: u64, stale_after: u64) {
        self.trails.retain(|_, trail| frame.saturating_sub(trail.last_frame) <= stale_after);
    }

    /// 当前保留的轨迹数
    pub fn len(&self) -> usize {
        self.trails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }

    pub fn clear(&mut self) {
        self.trails.clear();
    }
}

/// 计数器在帧之间保留的状态
#[derive(Debug, Clone, Default)]
pub struct CounterState {
    pub counts: ZoneCounts,
    pub history: TrackHistory,
    /// 已处理的帧数
    pub frame_index: u64,
}

impl CounterState {
    /// 按配置的区域数初始化计数
    pub fn for_config(config: &ZoneConfig) -> Self {
        Self {
            counts: ZoneCounts::new(config.zones.len()),
            ..Self::default()
        }
    }
}

/// 按列表顺序查找第一个包含该点的区域
pub fn assign_zone(point: Point, zones: &[Zone]) -> Option<usize> {
    zones.iter().position(|zone| zone.contains(point))
}

/// 计算每个检测落入的区域，不绘制也不计数
pub fn tally(detections: &[Detection], zones: &[Zone], anchor: AnchorPolicy) -> Vec<Option<usize>> {
    detections
        .iter()
        .map(|det| assign_zone(anchor.anchor(&det.bbox), zones))
        .collect()
}

/// 处理一帧：绘制区域与检测，并把已跟踪的检测计入区域
///
/// 没有跟踪ID的检测会被忽略。重叠区域中的点只计入编号最小的区域。
///
/// # 参数
/// * `frame` - 当前帧，不会被修改
/// * `detections` - 当前帧的已跟踪检测
/// * `config` - 区域配置
/// * `state` - 跨帧状态，计数写入`state.counts`
/// * `font` - 标签字体，为`None`时不绘制文字
///
/// # 返回值
/// 返回标注后的帧
pub fn count_objects_in_zones(
    frame: &DynamicImage,
    detections: &[Detection],
    config: &ZoneConfig,
    state: &mut CounterState,
    font: Option<&Font>,
) -> DynamicImage {
    state.frame_index += 1;
    if config.count_policy == CountPolicy::ResetPerFrame {
        state.counts.reset();
    }

    let mut annotator = Annotator::new(frame, config.line_width).with_font(font);
    let line_width = annotator.line_width();

    for zone in &config.zones {
        annotator.draw_region(zone.polygon.vertices(), zone.color, line_width * 2.0);
    }

    for det in detections {
        let Some(track_id) = det.track_id else {
            continue;
        };

        if let Some(zone) = assign_zone(config.anchor.anchor(&det.bbox), &config.zones) {
            state.counts.increment(zone);
        }

        let color = color_for(track_id);
        let label = if config.show_labels { format!("{} #{}", det.class_name, track_id) } else { String::new() };
        annotator.box_label(&det.bbox, &label, color);

        let trail = state.history.record(track_id, &det.bbox, state.frame_index, config.trail_length);
        annotator.draw_centroid_and_tracks(trail, color, line_width);
    }

    for (idx, zone) in config.zones.iter().enumerate() {
        let text = format!("{}: {}", zone.name, state.counts.get(idx));
        annotator.count_badge(zone.polygon.centroid(), &text, zone.color);
    }

    state.history.prune(state.frame_index, config.stale_after);
    log::debug!("第{}帧区域计数: {:?}", state.frame_index, state.counts.as_slice());

    annotator.into_image()
}

/// 区域计数器
///
/// 持有配置、跨帧状态和（可选的）标签字体。
pub struct ZoneCounter {
    config: ZoneConfig,
    state: CounterState,
    font: Option<Font>,
}

impl ZoneCounter {
    /// 创建计数器
    ///
    /// `config.show_labels`为真时加载系统字体，加载失败只记录警告。
    ///
    /// # 示例
    ///
    /// ```
    /// use zonecount::zone::{ZoneConfig, ZoneCounter};
    ///
    /// let counter = ZoneCounter::new(ZoneConfig::default().with_labels(false));
    /// assert_eq!(counter.frame_index(), 0);
    /// assert_eq!(counter.counts().total(), 0);
    /// ```
    pub fn new(config: ZoneConfig) -> Self {
        if config.anchor == AnchorPolicy::Legacy {
            log::warn!("使用Legacy代表点 (x1 + x2/2, x1 + x2/2)，该点通常不在检测框中心");
        }

        let font = if config.show_labels {
            match load_label_font() {
                Ok(font) => Some(font),
                Err(e) => {
                    log::warn!("标签文字将被跳过: {:#}", e);
                    None
                }
            }
        } else {
            None
        };

        let state = CounterState::for_config(&config);
        Self { config, state, font }
    }

    /// 使用外部提供的已跟踪检测处理一帧
    pub fn process(&mut self, frame: &DynamicImage, detections: &[Detection]) -> DynamicImage {
        count_objects_in_zones(frame, detections, &self.config, &mut self.state, self.font.as_ref())
    }

    /// 从数据源获取当前帧的跟踪结果并处理
    pub fn count_objects_in_zones<S: TrackSource>(&mut self, frame: &DynamicImage, source: &mut S) -> Result<DynamicImage> {
        let detections = source.extract_tracks(frame)?;
        Ok(self.process(frame, &detections))
    }

    /// 最近一帧之后的计数
    pub fn counts(&self) -> &ZoneCounts {
        &self.state.counts
    }

    /// 编号为`zone`的区域计数
    pub fn zone_count(&self, zone: usize) -> u64 {
        self.state.counts.get(zone)
    }

    pub fn history(&self) -> &TrackHistory {
        &self.state.history
    }

    /// 已处理的帧数
    pub fn frame_index(&self) -> u64 {
        self.state.frame_index
    }

    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    /// 清空计数和轨迹
    pub fn reset(&mut self) {
        self.state = CounterState::for_config(&self.config);
    }
}
