use anyhow::{Result, bail};

const EPSILON: f64 = 1e-9;

/// 二维点
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// 创建点
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

/// 闭合多边形
///
/// 顶点按顺序连接，最后一个顶点自动连回第一个。相邻的重复顶点（包括闭合点）
/// 会被合并，合并后至少需要3个不同的顶点，且面积不能为0。
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// 从顶点序列构造多边形
    ///
    /// # 参数
    /// * `points` - 按顺序排列的顶点，顺时针或逆时针均可
    ///
    /// # 返回值
    /// 顶点坐标非有限值、不同顶点少于3个或面积为0（例如所有点共线）时返回错误
    ///
    /// # 示例
    ///
    /// ```
    /// use zonecount::zone::Polygon;
    ///
    /// let tri = Polygon::new([(0.0, 0.0), (4.0, 0.0), (0.0, 3.0)]).unwrap();
    /// assert_eq!(tri.area(), 6.0);
    /// assert!(Polygon::new([(1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]).is_err());
    /// ```
    pub fn new<P: Into<Point>>(points: impl IntoIterator<Item = P>) -> Result<Self> {
        let mut vertices: Vec<Point> = Vec::new();
        for point in points.into_iter().map(Into::into) {
            if !point.x.is_finite() || !point.y.is_finite() {
                bail!("多边形顶点坐标必须是有限值");
            }
            if vertices.last() != Some(&point) {
                vertices.push(point);
            }
        }
        while vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }

        if vertices.len() < 3 {
            bail!("多边形至少需要3个不同的顶点，实际为{}", vertices.len());
        }
        let polygon = Self { vertices };
        if polygon.area() < EPSILON {
            bail!("多边形面积为0，顶点可能共线");
        }
        Ok(polygon)
    }

    /// 直接使用给定顶点，不做校验，只用于已知有效的常量
    pub(crate) fn from_known_vertices(points: &[(f64, f64)]) -> Self {
        Self {
            vertices: points.iter().copied().map(Point::from).collect(),
        }
    }

    /// 轴对齐矩形
    pub fn rect(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            vertices: vec![
                Point::new(x1, y1),
                Point::new(x2, y1),
                Point::new(x2, y2),
                Point::new(x1, y2),
            ],
        }
    }

    /// 去重后的顶点，不含闭合点
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// 有向面积（鞋带公式），逆时针为正
    pub fn signed_area(&self) -> f64 {
        self.edges().map(|(a, b)| a.x * b.y - b.x * a.y).sum::<f64>() / 2.0
    }

    /// 面积，与顶点方向无关
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// 多边形质心，面积为0时退化为顶点平均
    pub fn centroid(&self) -> Point {
        let area = self.signed_area();
        if area.abs() < EPSILON {
            let n = self.vertices.len() as f64;
            let (sx, sy) = self.vertices.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
            return Point::new(sx / n, sy / n);
        }

        let (cx, cy) = self.edges().fold((0.0, 0.0), |(cx, cy), (a, b)| {
            let cross = a.x * b.y - b.x * a.y;
            (cx + (a.x + b.x) * cross, cy + (a.y + b.y) * cross)
        });
        Point::new(cx / (6.0 * area), cy / (6.0 * area))
    }

    /// 点是否落在多边形的某条边上
    pub fn on_boundary(&self, point: Point) -> bool {
        self.edges().any(|(a, b)| on_segment(point, a, b))
    }

    /// 严格包含判断：边界上的点不算在内
    ///
    /// # 参数
    /// * `point` - 待判断的点
    ///
    /// # 返回值
    /// 点在多边形内部时返回`true`，在边上或外部时返回`false`
    pub fn contains(&self, point: Point) -> bool {
        if self.on_boundary(point) {
            return false;
        }

        // 射线法
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > point.y) != (b.y > point.y) {
                let x_cross = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if point.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

fn on_segment(p: Point, a: Point, b: Point) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if cross.abs() > EPSILON {
        return false;
    }
    p.x >= a.x.min(b.x) - EPSILON
        && p.x <= a.x.max(b.x) + EPSILON
        && p.y >= a.y.min(b.y) - EPSILON
        && p.y <= a.y.max(b.y) + EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::new([(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]).unwrap()
    }

    #[test]
    fn rejects_fewer_than_three_points() {
        let err = Polygon::new([(0.0, 0.0), (5.0, 5.0)]).unwrap_err();
        assert!(err.to_string().contains("3"));
        // 闭合点不算新顶点
        assert!(Polygon::new([(0.0, 0.0), (5.0, 5.0), (0.0, 0.0)]).is_err());
    }

    #[test]
    fn rejects_repeated_and_degenerate_rings() {
        assert!(Polygon::new([(0.0, 0.0), (0.0, 0.0), (5.0, 5.0)]).is_err());
        assert!(Polygon::new([(1.0, 1.0), (1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]).is_err());
        // 共线
        let err = Polygon::new([(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)]).unwrap_err();
        assert!(err.to_string().contains("面积"));
    }

    #[test]
    fn merges_consecutive_duplicates() {
        let p = Polygon::new([(0.0, 0.0), (0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]).unwrap();
        assert_eq!(p.vertices().len(), 4);
        assert!((p.area() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_finite_points() {
        assert!(Polygon::new([(0.0, 0.0), (f64::NAN, 1.0), (1.0, 1.0)]).is_err());
    }

    #[test]
    fn drops_closing_vertex() {
        let p = Polygon::new([(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 0.0)]).unwrap();
        assert_eq!(p.vertices().len(), 3);
    }

    #[test]
    fn contains_interior_points_only() {
        let sq = square();
        assert!(sq.contains(Point::new(5.0, 5.0)));
        assert!(!sq.contains(Point::new(50.0, 50.0)));
        assert!(!sq.contains(Point::new(-0.1, 5.0)));
    }

    #[test]
    fn boundary_points_are_outside() {
        let sq = square();
        assert!(!sq.contains(Point::new(0.0, 5.0)));
        assert!(!sq.contains(Point::new(10.0, 10.0)));
        assert!(sq.on_boundary(Point::new(5.0, 0.0)));
    }

    #[test]
    fn concave_polygon() {
        // U形
        let u = Polygon::new([(0.0, 0.0), (9.0, 0.0), (9.0, 9.0), (6.0, 9.0), (6.0, 3.0), (3.0, 3.0), (3.0, 9.0), (0.0, 9.0)])
            .unwrap();
        assert!(u.contains(Point::new(1.5, 6.0)));
        assert!(!u.contains(Point::new(4.5, 6.0)));
        assert!(u.contains(Point::new(4.5, 1.5)));
    }

    #[test]
    fn area_and_centroid() {
        let sq = square();
        assert!((sq.area() - 100.0).abs() < 1e-9);
        let c = sq.centroid();
        assert!((c.x - 5.0).abs() < 1e-9 && (c.y - 5.0).abs() < 1e-9);

        // 顺时针顶点顺序
        let cw = Polygon::rect(0.0, 10.0, 4.0, 0.0);
        assert!((cw.area() - 40.0).abs() < 1e-9);
        assert!((cw.centroid().x - 2.0).abs() < 1e-9);
    }
}
