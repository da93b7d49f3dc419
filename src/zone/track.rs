use anyhow::Result;
use image::DynamicImage;

use crate::config::{TRACKER_IOU_THRESHOLD, TRACKER_MAX_AGE};
use crate::segment::{BoundingBox, Detection, Detector};

/// 为检测结果分配跨帧的跟踪ID
pub trait Tracker {
    /// 处理一帧的检测结果
    ///
    /// # 参数
    /// * `detections` - 当前帧的检测，`track_id`可以为空
    ///
    /// # 返回值
    /// 返回同样顺序的检测，每个检测都带有跟踪ID
    fn update(&mut self, detections: Vec<Detection>) -> Vec<Detection>;
}

/// 提供当前帧已跟踪检测的数据源
pub trait TrackSource {
    /// 取得`frame`上的已跟踪检测
    fn extract_tracks(&mut self, frame: &DynamicImage) -> Result<Vec<Detection>>;
}

#[derive(Debug, Clone)]
struct ActiveTrack {
    id: u64,
    class_id: usize,
    bbox: BoundingBox,
    last_seen: u64,
}

/// 简单的IoU贪心跟踪器
///
/// 按IoU从高到低把检测与同类别的已有轨迹匹配，未匹配的检测开启新轨迹。
/// 超过`max_age`帧未匹配的轨迹被移除。ID从1开始单调递增。
#[derive(Debug, Clone)]
pub struct IouTracker {
    tracks: Vec<ActiveTrack>,
    next_id: u64,
    frame: u64,
    iou_threshold: f32,
    max_age: u64,
}

impl IouTracker {
    /// # 参数
    /// * `iou_threshold` - 检测与轨迹匹配所需的最小IoU
    /// * `max_age` - 轨迹允许连续未匹配的最大帧数
    pub fn new(iou_threshold: f32, max_age: u64) -> Self {
        Self { tracks: Vec::new(), next_id: 1, frame: 0, iou_threshold, max_age }
    }

    /// 仍在保留的轨迹数
    pub fn active_tracks(&self) -> usize {
        self.tracks.len()
    }
}

impl Default for IouTracker {
    fn default() -> Self {
        Self::new(TRACKER_IOU_THRESHOLD, TRACKER_MAX_AGE)
    }
}

impl Tracker for IouTracker {
    fn update(&mut self, mut detections: Vec<Detection>) -> Vec<Detection> {
        self.frame += 1;

        let mut candidates = Vec::new();
        for (t, track) in self.tracks.iter().enumerate() {
            for (d, det) in detections.iter().enumerate() {
                if det.class_id != track.class_id {
                    continue;
                }
                let iou = track.bbox.iou(&det.bbox);
                if iou >= self.iou_threshold {
                    candidates.push((iou, t, d));
                }
            }
        }
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut track_used = vec![false; self.tracks.len()];
        let mut det_used = vec![false; detections.len()];
        for (_, t, d) in candidates {
            if track_used[t] || det_used[d] {
                continue;
            }
            track_used[t] = true;
            det_used[d] = true;

            let track = &mut self.tracks[t];
            track.bbox = detections[d].bbox;
            track.last_seen = self.frame;
            detections[d].track_id = Some(track.id);
        }

        for (d, det) in detections.iter_mut().enumerate() {
            if det_used[d] {
                continue;
            }
            let id = self.next_id;
            self.next_id += 1;
            self.tracks.push(ActiveTrack {
                id,
                class_id: det.class_id,
                bbox: det.bbox,
                last_seen: self.frame,
            });
            det.track_id = Some(id);
        }

        let (frame, max_age) = (self.frame, self.max_age);
        self.tracks.retain(|track| frame - track.last_seen <= max_age);

        detections
    }
}

/// 检测器加跟踪器组成的数据源
pub struct TrackingPipeline<D, T> {
    pub detector: D,
    pub tracker: T,
}

impl<D: Detector, T: Tracker> TrackingPipeline<D, T> {
    pub fn new(detector: D, tracker: T) -> Self {
        Self { detector, tracker }
    }
}

impl<D: Detector, T: Tracker> TrackSource for TrackingPipeline<D, T> {
    fn extract_tracks(&mut self, frame: &DynamicImage) -> Result<Vec<Detection>> {
        let detections = self.detector.detect(frame)?;
        Ok(self.tracker.update(detections))
    }
}
