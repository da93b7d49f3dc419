use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

use crate::config::{DEFAULT_LINE_WIDTH, DEFAULT_REGION, REGION_COLOR, STALE_TRACK_FRAMES, TRACK_HISTORY_LEN};
use crate::segment::BoundingBox;
use crate::zone::geometry::{Point, Polygon};

/// 检测框的代表点计算方式
///
/// 早期实现使用`(x1 + x2 / 2, x1 + x2 / 2)`，只用到了x坐标，
/// 得到的点通常不在框中心，很可能是缺陷。这里保留它作为`Legacy`，
/// 默认使用真正的框中心。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPolicy {
    #[default]
    Center,
    Legacy,
}

impl AnchorPolicy {
    /// 计算检测框用于区域判断的代表点
    pub fn anchor(&self, bbox: &BoundingBox) -> Point {
        match self {
            AnchorPolicy::Center => {
                let (cx, cy) = bbox.center();
                Point::new(cx as f64, cy as f64)
            }
            AnchorPolicy::Legacy => {
                let v = (bbox.x1 + bbox.x2 / 2.0) as f64;
                Point::new(v, v)
            }
        }
    }
}

/// 区域计数的累计方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountPolicy {
    /// 每帧开始时清零
    #[default]
    ResetPerFrame,
    /// 跨帧一直累加
    Accumulate,
}

/// 计数区域
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub name: String,
    pub polygon: Polygon,
    pub color: [u8; 3],
}

impl Zone {
    /// 创建使用默认颜色的区域
    ///
    /// # 参数
    /// * `name` - 区域名称，显示在计数徽标上
    /// * `points` - 多边形顶点，要求同`Polygon::new`
    ///
    /// # 返回值
    /// 顶点无效时返回错误，错误信息中包含区域名称
    pub fn new<P: Into<Point>>(name: impl Into<String>, points: impl IntoIterator<Item = P>) -> Result<Self> {
        let name = name.into();
        let polygon = Polygon::new(points).with_context(|| format!("区域 {} 的顶点无效", name))?;
        Ok(Self { name, polygon, color: REGION_COLOR })
    }

    /// 设置轮廓和徽标颜色(RGB)
    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }

    /// 点是否严格位于区域内
    pub fn contains(&self, point: Point) -> bool {
        self.polygon.contains(point)
    }
}

#[derive(Debug, Deserialize, Default)]
struct ZoneConfigFile {
    line_width: Option<u32>,
    anchor: Option<AnchorPolicy>,
    count_policy: Option<CountPolicy>,
    show_labels: Option<bool>,
    trail_length: Option<usize>,
    stale_after: Option<u64>,
    zones: Option<Vec<ZoneFile>>,
}

#[derive(Debug, Deserialize)]
struct ZoneFile {
    name: Option<String>,
    points: Vec<[f64; 2]>,
    color: Option<[u8; 3]>,
}

/// 区域计数配置
///
/// 初始化时配置一次，此后只读。区域按列表顺序编号，编号即区域ID。
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneConfig {
    pub zones: Vec<Zone>,
    pub anchor: AnchorPolicy,
    pub count_policy: CountPolicy,
    pub line_width: u32,
    pub show_labels: bool,
    /// 每条轨迹保留的最大点数
    pub trail_length: usize,
    /// 超过多少帧未出现的轨迹会被清理
    pub stale_after: u64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            zones: vec![default_zone()],
            anchor: AnchorPolicy::default(),
            count_policy: CountPolicy::default(),
            line_width: DEFAULT_LINE_WIDTH,
            show_labels: true,
            trail_length: TRACK_HISTORY_LEN,
            stale_after: STALE_TRACK_FRAMES,
        }
    }
}

fn default_zone() -> Zone {
    Zone {
        name: "region".to_string(),
        polygon: Polygon::from_known_vertices(&DEFAULT_REGION),
        color: REGION_COLOR,
    }
}

impl ZoneConfig {
    /// 使用给定区域和默认选项创建配置
    ///
    /// # 参数
    /// * `zones` - 区域列表，顺序决定区域编号和重叠时的优先级
    ///
    /// # 返回值
    /// 区域列表为空时返回错误
    ///
    /// # 示例
    ///
    /// ```
    /// use zonecount::zone::{CountPolicy, Zone, ZoneConfig};
    ///
    /// let zone = Zone::new("door", [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]).unwrap();
    /// let config = ZoneConfig::new(vec![zone]).unwrap().with_count_policy(CountPolicy::Accumulate);
    /// assert_eq!(config.zones.len(), 1);
    /// assert!(ZoneConfig::new(Vec::new()).is_err());
    /// ```
    pub fn new(zones: Vec<Zone>) -> Result<Self> {
        let cfg = Self { zones, ..Self::default() };
        cfg.validate()?;
        Ok(cfg)
    }

    /// 设置代表点计算方式
    pub fn with_anchor(mut self, anchor: AnchorPolicy) -> Self {
        self.anchor = anchor;
        self
    }

    /// 设置计数累计方式
    pub fn with_count_policy(mut self, count_policy: CountPolicy) -> Self {
        self.count_policy = count_policy;
        self
    }

    /// 是否绘制检测框标签
    pub fn with_labels(mut self, show_labels: bool) -> Self {
        self.show_labels = show_labels;
        self
    }

    /// 从TOML文件加载配置
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    /// 文件无法读取或内容无效时返回错误，错误信息中包含文件路径
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("无法读取区域配置 {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("区域配置 {} 无效", path.display()))
    }

    /// 从TOML字符串解析配置，未给出的字段使用默认值
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ZoneConfigFile = toml::from_str(contents)?;
        let cfg = Self::from_file(file)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ZoneConfigFile) -> Result<Self> {
        let defaults = Self::default();
        let zones = match file.zones {
            None => defaults.zones,
            Some(zones) => zones
                .into_iter()
                .enumerate()
                .map(|(idx, zone)| {
                    let name = zone.name.unwrap_or_else(|| format!("zone-{}", idx));
                    let built = Zone::new(name, zone.points)?;
                    Ok(match zone.color {
                        Some(color) => built.with_color(color),
                        None => built,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        };

        Ok(Self {
            zones,
            anchor: file.anchor.unwrap_or(defaults.anchor),
            count_policy: file.count_policy.unwrap_or(defaults.count_policy),
            line_width: file.line_width.unwrap_or(defaults.line_width),
            show_labels: file.show_labels.unwrap_or(defaults.show_labels),
            trail_length: file.trail_length.unwrap_or(defaults.trail_length),
            stale_after: file.stale_after.unwrap_or(defaults.stale_after),
        })
    }

    fn validate(&self) -> Result<()> {
        if self.zones.is_empty() {
            bail!("至少需要配置一个区域");
        }
        if self.line_width == 0 {
            bail!("line_width 必须大于0");
        }
        if self.trail_length == 0 {
            bail!("trail_length 必须大于0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_anchor_reproduces_x_only_expression() {
        let bbox = BoundingBox::new(10.0, 100.0, 30.0, 200.0);
        assert_eq!(AnchorPolicy::Legacy.anchor(&bbox), Point::new(25.0, 25.0));
        assert_eq!(AnchorPolicy::Center.anchor(&bbox), Point::new(20.0, 150.0));
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg = ZoneConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, ZoneConfig::default());
        assert_eq!(cfg.zones.len(), 1);
        assert!(cfg.zones[0].contains(Point::new(500.0, 380.0)));
    }

    #[test]
    fn parses_zones_and_policies() {
        let cfg = ZoneConfig::from_toml_str(
            r#"
            anchor = "legacy"
            count_policy = "accumulate"
            line_width = 3
            show_labels = false

            [[zones]]
            name = "entrance"
            points = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]
            color = [255, 0, 0]

            [[zones]]
            points = [[20.0, 20.0], [30.0, 20.0], [30.0, 30.0]]
            "#,
        )
        .unwrap();

        assert_eq!(cfg.anchor, AnchorPolicy::Legacy);
        assert_eq!(cfg.count_policy, CountPolicy::Accumulate);
        assert_eq!(cfg.line_width, 3);
        assert!(!cfg.show_labels);
        assert_eq!(cfg.zones[0].name, "entrance");
        assert_eq!(cfg.zones[0].color, [255, 0, 0]);
        assert_eq!(cfg.zones[1].name, "zone-1");
        assert_eq!(cfg.zones[1].color, REGION_COLOR);
    }

    #[test]
    fn rejects_malformed_zone() {
        let err = ZoneConfig::from_toml_str(
            r#"
            [[zones]]
            name = "line"
            points = [[0.0, 0.0], [10.0, 0.0]]
            "#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("line"));
    }

    #[test]
    fn rejects_degenerate_zone() {
        let err = ZoneConfig::from_toml_str(
            r#"
            [[zones]]
            name = "dot"
            points = [[1.0, 1.0], [1.0, 1.0], [1.0, 1.0], [1.0, 1.0]]
            "#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("dot"));

        let collinear = ZoneConfig::from_toml_str(
            r#"
            [[zones]]
            points = [[0.0, 0.0], [0.0, 0.0], [5.0, 5.0]]
            "#,
        );
        assert!(collinear.is_err());
    }

    #[test]
    fn default_zone_matches_default_region() {
        let zone = default_zone();
        assert_eq!(zone.polygon, Polygon::new(DEFAULT_REGION).unwrap());
        assert_eq!(zone.polygon.vertices()[0], Point::new(20.0, 400.0));
    }

    #[test]
    fn rejects_explicitly_empty_zone_list() {
        assert!(ZoneConfig::from_toml_str("zones = []").is_err());
        assert!(ZoneConfig::new(Vec::new()).is_err());
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(ZoneConfig::from_toml_str(r#"count_policy = "sometimes""#).is_err());
    }
}
