//! 几何图元定义
//!
//! 支持的图元：
//! - 点 (Point)、线段 (Line)、圆 (Circle)、圆弧 (Arc)
//! - 椭圆 (Ellipse，轴对齐)、多段线 (Polyline)、样条曲线 (Spline)、圆环 (Donut)
//! - 单行文本 (Text)、多行文本 (MText)、表格 (Table)
//! - 尺寸标注 (Dimension)、填充 (Hatch)
//!
//! 所有坐标以 [`Point3`] 存储，几何计算只使用 XY 分量。

use crate::error::{KernelError, Result};
use crate::math::{
    angle_of, flat, normalize_relative, point_on_circle, BoundingBox2, Point2, Point3, Vector2,
    EPSILON,
};
use crate::tolerance::{ANGLE_EPSILON, LENGTH_SQ_EPSILON};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// 几何类型枚举
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Geometry {
    Point(Point),
    Line(Line),
    Circle(Circle),
    Arc(Arc),
    Ellipse(Ellipse),
    Polyline(Polyline),
    Spline(Spline),
    Donut(Donut),
    Text(Text),
    MText(MText),
    Table(Table),
    Dimension(Dimension),
    Hatch(Hatch),
}

macro_rules! impl_into_geometry {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Geometry {
                fn from(value: $ty) -> Self {
                    Geometry::$ty(value)
                }
            }
        )*
    };
}

impl_into_geometry!(
    Point, Line, Circle, Arc, Ellipse, Polyline, Spline, Donut, Text, MText, Table, Dimension,
    Hatch,
);

impl Geometry {
    /// 获取几何的包围盒
    pub fn bounding_box(&self) -> BoundingBox2 {
        match self {
            Geometry::Point(p) => p.bounding_box(),
            Geometry::Line(l) => l.bounding_box(),
            Geometry::Circle(c) => c.bounding_box(),
            Geometry::Arc(a) => a.bounding_box(),
            Geometry::Ellipse(e) => e.bounding_box(),
            Geometry::Polyline(pl) => pl.bounding_box(),
            Geometry::Spline(s) => s.bounding_box(),
            Geometry::Donut(d) => d.bounding_box(),
            Geometry::Text(t) => t.bounding_box(),
            Geometry::MText(t) => t.bounding_box(),
            Geometry::Table(t) => t.bounding_box(),
            Geometry::Dimension(d) => d.bounding_box(),
            Geometry::Hatch(h) => h.bounding_box(),
        }
    }

    /// 获取几何的类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::Line(_) => "Line",
            Geometry::Circle(_) => "Circle",
            Geometry::Arc(_) => "Arc",
            Geometry::Ellipse(_) => "Ellipse",
            Geometry::Polyline(_) => "Polyline",
            Geometry::Spline(_) => "Spline",
            Geometry::Donut(_) => "Donut",
            Geometry::Text(_) => "Text",
            Geometry::MText(_) => "MText",
            Geometry::Table(_) => "Table",
            Geometry::Dimension(_) => "Dimension",
            Geometry::Hatch(_) => "Hatch",
        }
    }

    /// 校验几何不变量：半径/尺寸非负、折线至少两个点、坐标有限
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(KernelError::InvalidGeometry(msg));

        let points: Vec<&Point3> = match self {
            Geometry::Point(p) => vec![&p.position],
            Geometry::Line(l) => vec![&l.start, &l.end],
            Geometry::Circle(c) => vec![&c.center],
            Geometry::Arc(a) => vec![&a.center],
            Geometry::Ellipse(e) => vec![&e.center],
            Geometry::Polyline(pl) => pl.vertices.iter().collect(),
            Geometry::Spline(s) => s.control_points.iter().collect(),
            Geometry::Donut(d) => vec![&d.center],
            Geometry::Text(t) => vec![&t.position],
            Geometry::MText(t) => vec![&t.position],
            Geometry::Table(t) => vec![&t.position],
            Geometry::Dimension(d) => {
                vec![&d.definition_point1, &d.definition_point2, &d.line_location]
            }
            Geometry::Hatch(h) => h.boundary.iter().collect(),
        };
        if points.iter().any(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite())) {
            return invalid(format!("{} has non-finite coordinates", self.type_name()));
        }

        match self {
            Geometry::Circle(c) if c.radius < 0.0 => invalid(format!("circle radius {}", c.radius)),
            Geometry::Arc(a) if a.radius < 0.0 => invalid(format!("arc radius {}", a.radius)),
            Geometry::Arc(a) if !(a.start_angle.is_finite() && a.end_angle.is_finite()) => {
                invalid("arc angles must be finite".to_string())
            }
            Geometry::Arc(a) if a.sweep_angle() < ANGLE_EPSILON => {
                invalid(format!("arc sweep is zero ({} -> {})", a.start_angle, a.end_angle))
            }
            Geometry::Ellipse(e) if e.rx < 0.0 || e.ry < 0.0 => {
                invalid(format!("ellipse semi-axes {} x {}", e.rx, e.ry))
            }
            Geometry::Polyline(pl) if pl.vertices.len() < 2 => {
                invalid(format!("polyline needs 2 vertices, got {}", pl.vertices.len()))
            }
            Geometry::Spline(s) if s.control_points.len() < 2 => {
                invalid(format!("spline needs 2 control points, got {}", s.control_points.len()))
            }
            Geometry::Spline(s) if s.degree == 0 => {
                invalid("spline degree must be >= 1".to_string())
            }
            Geometry::Donut(d) if d.inner_radius < 0.0 || d.outer_radius < d.inner_radius => {
                invalid(format!("donut radii {} / {}", d.inner_radius, d.outer_radius))
            }
            Geometry::Text(t) if t.height < 0.0 => invalid(format!("text height {}", t.height)),
            Geometry::MText(t) if t.height < 0.0 || t.width < 0.0 => {
                invalid(format!("mtext size {} x {}", t.width, t.height))
            }
            Geometry::Table(t) if t.row_heights.is_empty() || t.column_widths.is_empty() => {
                invalid("table needs at least one row and one column".to_string())
            }
            Geometry::Table(t)
                if t.row_heights.iter().chain(&t.column_widths).any(|v| *v < 0.0) =>
            {
                invalid("table row/column sizes must be non-negative".to_string())
            }
            Geometry::Dimension(d) if d.text_height < 0.0 => {
                invalid(format!("dimension text height {}", d.text_height))
            }
            Geometry::Hatch(h) if h.boundary.len() < 3 => {
                invalid(format!("hatch boundary needs 3 points, got {}", h.boundary.len()))
            }
            _ => Ok(()),
        }
    }
}

/// 点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub position: Point3,
}

impl Point {
    pub fn new(position: Point3) -> Self {
        Self { position }
    }

    pub fn xy(&self) -> Point2 {
        flat(&self.position)
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::new(self.xy(), self.xy())
    }
}

/// 线段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub start: Point3,
    pub end: Point3,
}

impl Line {
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// 由 XY 平面上的两点创建（z = 0）
    pub fn from_xy(start: Point2, end: Point2) -> Self {
        Self::new(Point3::new(start.x, start.y, 0.0), Point3::new(end.x, end.y, 0.0))
    }

    pub fn start_xy(&self) -> Point2 {
        flat(&self.start)
    }

    pub fn end_xy(&self) -> Point2 {
        flat(&self.end)
    }

    /// 方向向量（未归一化，start → end）
    pub fn delta(&self) -> Vector2 {
        self.end_xy() - self.start_xy()
    }

    /// 计算线段长度
    pub fn length(&self) -> f64 {
        self.delta().norm()
    }

    /// 长度过短，不能包含任何点
    pub fn is_degenerate(&self) -> bool {
        self.delta().norm_squared() <= LENGTH_SQ_EPSILON
    }

    /// 计算线段中点
    pub fn midpoint(&self) -> Point2 {
        nalgebra::center(&self.start_xy(), &self.end_xy())
    }

    /// 参数 t 处的点：start + t·(end − start)
    pub fn point_at(&self, t: f64) -> Point2 {
        self.start_xy() + self.delta() * t
    }

    /// 点在线段所在直线上的投影参数（未截断）
    pub fn parameter_of(&self, point: &Point2) -> f64 {
        let v = self.delta();
        let len_sq = v.norm_squared();
        if len_sq < EPSILON {
            return 0.0;
        }
        (point - self.start_xy()).dot(&v) / len_sq
    }

    /// 线段上离给定点最近的点
    pub fn closest_point(&self, point: &Point2) -> Point2 {
        let v = self.delta();
        let w = point - self.start_xy();

        let c1 = w.dot(&v);
        if c1 <= 0.0 {
            return self.start_xy();
        }

        let c2 = v.dot(&v);
        if c2 <= c1 {
            return self.end_xy();
        }

        self.start_xy() + v * (c1 / c2)
    }

    /// 计算点到线段的距离
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        (point - self.closest_point(point)).norm()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points([self.start_xy(), self.end_xy()])
    }
}

/// 圆
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point3,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point3, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn from_xy(center: Point2, radius: f64) -> Self {
        Self::new(Point3::new(center.x, center.y, 0.0), radius)
    }

    pub fn center_xy(&self) -> Point2 {
        flat(&self.center)
    }

    /// 计算周长
    pub fn circumference(&self) -> f64 {
        TAU * self.radius
    }

    /// 计算点到圆的距离（负值表示在圆内）
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        (point - self.center_xy()).norm() - self.radius
    }

    /// 获取圆上指定角度的点
    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        point_on_circle(&self.center_xy(), self.radius, angle)
    }

    /// 圆周上离给定点最近的点；点与圆心重合时无定义
    pub fn closest_point(&self, point: &Point2) -> Option<Point2> {
        let v = point - self.center_xy();
        let d = v.norm();
        if d < EPSILON {
            return None;
        }
        Some(self.center_xy() + v * (self.radius / d))
    }

    /// 四个象限点（0°, 90°, 180°, 270°）
    pub fn quadrant_points(&self) -> [Point2; 4] {
        [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2].map(|a| self.point_at_angle(a))
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_center(self.center_xy(), self.radius, self.radius)
    }
}

/// 圆弧
///
/// 从 `start_angle` 逆时针扫到 `end_angle`；`end_angle` 可以小于 `start_angle`，
/// 表示圆弧跨过 0 角。起止角相差 2π 的整数倍时扫角为 0，这样的圆弧无效，
/// 整圆请用 [`Circle`]。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arc {
    pub center: Point3,
    pub radius: f64,
    /// 起始角度（弧度）
    pub start_angle: f64,
    /// 终止角度（弧度）
    pub end_angle: f64,
}

impl Arc {
    pub fn new(center: Point3, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
        }
    }

    pub fn from_xy(center: Point2, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self::new(Point3::new(center.x, center.y, 0.0), radius, start_angle, end_angle)
    }

    pub fn center_xy(&self) -> Point2 {
        flat(&self.center)
    }

    /// 所在的整圆
    pub fn circle(&self) -> Circle {
        Circle::new(self.center, self.radius)
    }

    /// 扫过的角度，范围 [0, 2π)
    pub fn sweep_angle(&self) -> f64 {
        normalize_relative(self.end_angle, self.start_angle) - self.start_angle
    }

    /// 计算弧长
    pub fn length(&self) -> f64 {
        self.sweep_angle() * self.radius
    }

    /// 中间角度
    pub fn mid_angle(&self) -> f64 {
        self.start_angle + self.sweep_angle() / 2.0
    }

    pub fn start_point(&self) -> Point2 {
        point_on_circle(&self.center_xy(), self.radius, self.start_angle)
    }

    pub fn end_point(&self) -> Point2 {
        point_on_circle(&self.center_xy(), self.radius, self.end_angle)
    }

    pub fn midpoint(&self) -> Point2 {
        point_on_circle(&self.center_xy(), self.radius, self.mid_angle())
    }

    /// 检查角度是否在弧的范围内
    ///
    /// 先把候选角归一化到不小于起始角，再做简单的区间比较。
    pub fn contains_angle(&self, angle: f64) -> bool {
        let offset = normalize_relative(angle, self.start_angle) - self.start_angle;
        offset <= self.sweep_angle() + ANGLE_EPSILON || offset >= TAU - ANGLE_EPSILON
    }

    /// 检查圆上的点是否落在弧的角度范围内
    pub fn contains_point_angle(&self, point: &Point2) -> bool {
        self.contains_angle(angle_of(&self.center_xy(), point))
    }

    /// 弧上离给定点最近的点：先取圆上最近点，再截断到弧的角度范围
    pub fn closest_point(&self, point: &Point2) -> Point2 {
        let angle = if (point - self.center_xy()).norm() < EPSILON {
            self.start_angle
        } else {
            angle_of(&self.center_xy(), point)
        };

        if self.contains_angle(angle) {
            return point_on_circle(&self.center_xy(), self.radius, angle);
        }

        let start = self.start_point();
        let end = self.end_point();
        if (point - start).norm() <= (point - end).norm() {
            start
        } else {
            end
        }
    }

    /// 计算点到圆弧的距离
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        (point - self.closest_point(point)).norm()
    }

    /// 落在弧上的象限点
    pub fn quadrant_points(&self) -> Vec<Point2> {
        [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2]
            .into_iter()
            .filter(|a| self.contains_angle(*a))
            .map(|a| point_on_circle(&self.center_xy(), self.radius, a))
            .collect()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        let mut bbox = BoundingBox2::from_points([self.start_point(), self.end_point()]);
        for q in self.quadrant_points() {
            bbox.expand_to_include(&q);
        }
        bbox
    }
}

/// 椭圆（轴对齐）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Point3,
    /// X 方向半轴
    pub rx: f64,
    /// Y 方向半轴
    pub ry: f64,
}

impl Ellipse {
    pub fn new(center: Point3, rx: f64, ry: f64) -> Self {
        Self { center, rx, ry }
    }

    pub fn center_xy(&self) -> Point2 {
        flat(&self.center)
    }

    /// 平均半轴，拾取时把椭圆近似为该半径的圆
    pub fn average_radius(&self) -> f64 {
        (self.rx + self.ry) / 2.0
    }

    /// 参数 t 处的点
    pub fn point_at_param(&self, t: f64) -> Point2 {
        let c = self.center_xy();
        Point2::new(c.x + self.rx * t.cos(), c.y + self.ry * t.sin())
    }

    /// 四个轴端点
    pub fn quadrant_points(&self) -> [Point2; 4] {
        [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2].map(|t| self.point_at_param(t))
    }

    /// 用多边形近似椭圆
    pub fn sample(&self, segments: usize) -> Vec<Point2> {
        (0..segments)
            .map(|i| self.point_at_param(TAU * i as f64 / segments as f64))
            .collect()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_center(self.center_xy(), self.rx, self.ry)
    }
}

/// 多段线
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polyline {
    pub vertices: Vec<Point3>,
    /// 是否闭合（闭合时隐含最后一点到第一点的线段）
    pub closed: bool,
}

impl Polyline {
    pub fn new(vertices: Vec<Point3>, closed: bool) -> Self {
        Self { vertices, closed }
    }

    pub fn from_xy(points: impl IntoIterator<Item = Point2>, closed: bool) -> Self {
        Self {
            vertices: points
                .into_iter()
                .map(|p| Point3::new(p.x, p.y, 0.0))
                .collect(),
            closed,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// 线段数量
    pub fn segment_count(&self) -> usize {
        segment_count(self.vertices.len(), self.closed)
    }

    /// 依次给出所有线段（含闭合段）
    pub fn segments(&self) -> impl Iterator<Item = Line> + '_ {
        segments_of(&self.vertices, self.closed)
    }

    pub fn length(&self) -> f64 {
        self.segments().map(|s| s.length()).sum()
    }

    /// 顶点平均值，用作闭合多段线的中心
    pub fn centroid(&self) -> Option<Point2> {
        if self.vertices.is_empty() {
            return None;
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector2::zeros(), |acc, v| acc + flat(v).coords);
        Some(Point2::from(sum / self.vertices.len() as f64))
    }

    /// 离给定点最近的线段及其序号
    pub fn nearest_segment(&self, point: &Point2) -> Option<(usize, Line)> {
        self.segments()
            .enumerate()
            .map(|(i, s)| (s.distance_to_point(point), i, s))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, i, s)| (i, s))
    }

    /// 计算点到多段线的距离
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        match self.vertices.len() {
            0 => f64::MAX,
            1 => (point - flat(&self.vertices[0])).norm(),
            _ => self
                .segments()
                .map(|s| s.distance_to_point(point))
                .fold(f64::MAX, f64::min),
        }
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points(self.vertices.iter().map(flat))
    }
}

/// 样条曲线
///
/// 只保存控制点；拾取与框选使用控制多边形近似。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spline {
    pub control_points: Vec<Point3>,
    pub degree: u32,
    pub closed: bool,
}

impl Spline {
    pub fn new(control_points: Vec<Point3>, degree: u32, closed: bool) -> Self {
        Self {
            control_points,
            degree,
            closed,
        }
    }

    /// 控制多边形的线段
    pub fn control_segments(&self) -> impl Iterator<Item = Line> + '_ {
        segments_of(&self.control_points, self.closed)
    }

    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        match self.control_points.len() {
            0 => f64::MAX,
            1 => (point - flat(&self.control_points[0])).norm(),
            _ => self
                .control_segments()
                .map(|s| s.distance_to_point(point))
                .fold(f64::MAX, f64::min),
        }
    }

    /// 控制多边形的包围盒（凸包性质保证曲线在其内）
    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points(self.control_points.iter().map(flat))
    }
}

/// 圆环（实心环带）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donut {
    pub center: Point3,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl Donut {
    pub fn new(center: Point3, inner_radius: f64, outer_radius: f64) -> Self {
        Self {
            center,
            inner_radius,
            outer_radius,
        }
    }

    pub fn center_xy(&self) -> Point2 {
        flat(&self.center)
    }

    pub fn outer_circle(&self) -> Circle {
        Circle::new(self.center, self.outer_radius)
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_center(self.center_xy(), self.outer_radius, self.outer_radius)
    }
}

/// 带旋转的矩形
///
/// 文本、多行文本、表格和标注文字的近似外框。`pivot` 是旋转中心（插入点），
/// `local` 是未旋转时相对于 `pivot` 的范围。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRect {
    pub pivot: Point2,
    pub rotation: f64,
    pub local: BoundingBox2,
}

impl OrientedRect {
    pub fn new(pivot: Point2, rotation: f64, local: BoundingBox2) -> Self {
        Self {
            pivot,
            rotation,
            local,
        }
    }

    /// 世界坐标 → 局部坐标（抵消旋转）
    pub fn to_local(&self, point: &Point2) -> Point2 {
        let (sin, cos) = self.rotation.sin_cos();
        let d = point - self.pivot;
        Point2::new(d.x * cos + d.y * sin, -d.x * sin + d.y * cos)
    }

    /// 局部坐标 → 世界坐标
    pub fn to_world(&self, local: &Point2) -> Point2 {
        let (sin, cos) = self.rotation.sin_cos();
        Point2::new(
            self.pivot.x + local.x * cos - local.y * sin,
            self.pivot.y + local.x * sin + local.y * cos,
        )
    }

    /// 世界坐标下的四个角点
    pub fn corners(&self) -> [Point2; 4] {
        self.local.corners().map(|c| self.to_world(&c))
    }

    /// 四条边
    pub fn edges(&self) -> [(Point2, Point2); 4] {
        let c = self.corners();
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }

    /// 点到矩形的距离；点在矩形内为 0
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        let local = self.to_local(point);
        (local - self.local.closest_point(&local)).norm()
    }

    pub fn contains(&self, point: &Point2) -> bool {
        self.local.contains(&self.to_local(point))
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points(self.corners())
    }
}

/// 文本对齐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TextAlignment {
    /// 左对齐（默认）
    #[default]
    Left,
    /// 居中对齐
    Center,
    /// 右对齐
    Right,
}

/// 估算文本宽度（英文字符约为高度的0.6倍，中文字符接近高度）
pub fn estimate_text_width(content: &str, height: f64) -> f64 {
    let char_count = content.chars().count();
    let cjk_count = content.chars().filter(|c| is_cjk(*c)).count();
    let ascii_count = char_count - cjk_count;

    (cjk_count as f64 * height) + (ascii_count as f64 * height * 0.6)
}

/// 检查是否是CJK字符
fn is_cjk(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}')
}

/// 单行文本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    /// 插入点
    pub position: Point3,
    pub content: String,
    /// 文本高度
    pub height: f64,
    /// 旋转角度（弧度）
    pub rotation: f64,
    pub alignment: TextAlignment,
}

impl Text {
    pub fn new(position: Point3, content: impl Into<String>, height: f64) -> Self {
        Self {
            position,
            content: content.into(),
            height,
            rotation: 0.0,
            alignment: TextAlignment::Left,
        }
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_alignment(mut self, alignment: TextAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn estimated_width(&self) -> f64 {
        estimate_text_width(&self.content, self.height)
    }

    /// 近似外框：基线在插入点，按对齐方式水平偏移后绕插入点旋转
    pub fn frame(&self) -> OrientedRect {
        text_frame(
            flat(&self.position),
            self.estimated_width(),
            self.height,
            self.rotation,
            self.alignment,
        )
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        self.frame().bounding_box()
    }
}

fn text_frame(
    pivot: Point2,
    width: f64,
    height: f64,
    rotation: f64,
    alignment: TextAlignment,
) -> OrientedRect {
    let x0 = match alignment {
        TextAlignment::Left => 0.0,
        TextAlignment::Center => -width / 2.0,
        TextAlignment::Right => -width,
    };
    OrientedRect::new(
        pivot,
        rotation,
        BoundingBox2::new(Point2::new(x0, 0.0), Point2::new(x0 + width, height)),
    )
}

/// 多行文本
///
/// 插入点在左上角，文字向下排布。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MText {
    pub position: Point3,
    pub content: String,
    /// 单行文字高度
    pub height: f64,
    /// 参考宽度；0 表示按最长行估算
    pub width: f64,
    pub rotation: f64,
    /// 行距系数
    pub line_spacing: f64,
}

impl MText {
    pub fn new(position: Point3, content: impl Into<String>, height: f64, width: f64) -> Self {
        Self {
            position,
            content: content.into(),
            height,
            width,
            rotation: 0.0,
            line_spacing: 1.0,
        }
    }

    pub fn line_count(&self) -> usize {
        self.content.lines().count().max(1)
    }

    pub fn box_width(&self) -> f64 {
        if self.width > 0.0 {
            return self.width;
        }
        self.content
            .lines()
            .map(|line| estimate_text_width(line, self.height))
            .fold(0.0, f64::max)
    }

    pub fn box_height(&self) -> f64 {
        self.line_count() as f64 * self.height * self.line_spacing.max(1.0)
    }

    pub fn frame(&self) -> OrientedRect {
        OrientedRect::new(
            flat(&self.position),
            self.rotation,
            BoundingBox2::new(
                Point2::new(0.0, -self.box_height()),
                Point2::new(self.box_width(), 0.0),
            ),
        )
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        self.frame().bounding_box()
    }
}

/// 表格
///
/// 插入点在左上角，行向下增长、列向右增长。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub position: Point3,
    pub row_heights: Vec<f64>,
    pub column_widths: Vec<f64>,
    pub rotation: f64,
}

impl Table {
    pub fn new(position: Point3, row_heights: Vec<f64>, column_widths: Vec<f64>) -> Self {
        Self {
            position,
            row_heights,
            column_widths,
            rotation: 0.0,
        }
    }

    pub fn total_width(&self) -> f64 {
        self.column_widths.iter().sum()
    }

    pub fn total_height(&self) -> f64 {
        self.row_heights.iter().sum()
    }

    pub fn frame(&self) -> OrientedRect {
        OrientedRect::new(
            flat(&self.position),
            self.rotation,
            BoundingBox2::new(
                Point2::new(0.0, -self.total_height()),
                Point2::new(self.total_width(), 0.0),
            ),
        )
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        self.frame().bounding_box()
    }
}

/// 标注类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DimensionType {
    /// 对齐标注 (Aligned) - 默认
    #[default]
    Aligned,
    /// 线性标注 (Linear) - 水平或垂直
    Linear,
    /// 半径标注
    Radius,
    /// 直径标注
    Diameter,
}

/// 尺寸标注
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimension {
    /// 第一个测量点（半径/直径标注时为圆心）
    pub definition_point1: Point3,
    /// 第二个测量点
    pub definition_point2: Point3,
    /// 标注线位置点 (决定标注线的高度/距离)
    pub line_location: Point3,
    pub dim_type: DimensionType,
    /// 覆盖文本 (如果为空则显示测量值)
    pub text_override: Option<String>,
    pub text_height: f64,
    /// 文本位置 (如果为None，则自动计算默认位置)
    pub text_position: Option<Point3>,
}

impl Dimension {
    pub fn new(p1: Point3, p2: Point3, location: Point3) -> Self {
        Self {
            definition_point1: p1,
            definition_point2: p2,
            line_location: location,
            dim_type: DimensionType::Aligned,
            text_override: None,
            text_height: 2.5,
            text_position: None,
        }
    }

    pub fn with_type(mut self, dim_type: DimensionType) -> Self {
        self.dim_type = dim_type;
        self
    }

    fn p1(&self) -> Point2 {
        flat(&self.definition_point1)
    }

    fn p2(&self) -> Point2 {
        flat(&self.definition_point2)
    }

    /// 线性标注是否为水平方向
    fn is_horizontal(&self) -> bool {
        let d = self.p2() - self.p1();
        d.x.abs() >= d.y.abs()
    }

    /// 标注线两端点
    pub fn dimension_line(&self) -> (Point2, Point2) {
        let (p1, p2) = (self.p1(), self.p2());
        let loc = flat(&self.line_location);
        match self.dim_type {
            DimensionType::Aligned => {
                let d = p2 - p1;
                if d.norm() < EPSILON {
                    return (p1, p2);
                }
                let dir = d.normalize();
                let perp = Vector2::new(-dir.y, dir.x);
                let offset = perp * (loc - p1).dot(&perp);
                (p1 + offset, p2 + offset)
            }
            DimensionType::Linear => {
                if self.is_horizontal() {
                    (Point2::new(p1.x, loc.y), Point2::new(p2.x, loc.y))
                } else {
                    (Point2::new(loc.x, p1.y), Point2::new(loc.x, p2.y))
                }
            }
            DimensionType::Radius => (p1, p2),
            DimensionType::Diameter => (p1 - (p2 - p1), p2),
        }
    }

    /// 尺寸界线（测量点到标注线）；半径/直径标注没有尺寸界线
    pub fn extension_lines(&self) -> Vec<(Point2, Point2)> {
        match self.dim_type {
            DimensionType::Aligned | DimensionType::Linear => {
                let (d1, d2) = self.dimension_line();
                vec![(self.p1(), d1), (self.p2(), d2)]
            }
            DimensionType::Radius | DimensionType::Diameter => Vec::new(),
        }
    }

    /// 获取文本的实际显示位置（如果未设置，则计算默认位置）
    pub fn get_text_position(&self) -> Point2 {
        match self.text_position {
            Some(pos) => flat(&pos),
            None => self.default_text_position(),
        }
    }

    /// 默认文本位置：标注线中点向外偏移 0.8 倍字高
    pub fn default_text_position(&self) -> Point2 {
        match self.dim_type {
            DimensionType::Aligned | DimensionType::Linear => {
                let (d1, d2) = self.dimension_line();
                let mid = nalgebra::center(&d1, &d2);
                let d = d2 - d1;
                if d.norm() < EPSILON {
                    return mid;
                }
                let dir = d.normalize();
                let mut normal = Vector2::new(-dir.y, dir.x);
                let away = mid - nalgebra::center(&self.p1(), &self.p2());
                if away.dot(&normal) < 0.0 {
                    normal = -normal;
                }
                mid + normal * (self.text_height * 0.8)
            }
            DimensionType::Radius | DimensionType::Diameter => flat(&self.line_location),
        }
    }

    /// 获取测量值
    pub fn measurement(&self) -> f64 {
        let d = self.p2() - self.p1();
        match self.dim_type {
            DimensionType::Aligned | DimensionType::Radius => d.norm(),
            DimensionType::Linear => d.x.abs().max(d.y.abs()),
            DimensionType::Diameter => d.norm() * 2.0,
        }
    }

    pub fn display_text(&self) -> String {
        if let Some(text) = &self.text_override {
            return text.clone();
        }
        let val = self.measurement();
        match self.dim_type {
            DimensionType::Radius => format!("R{:.2}", val),
            DimensionType::Diameter => format!("%%C{:.2}", val),
            _ => format!("{:.2}", val),
        }
    }

    /// 文字外框（居中于文本位置）
    pub fn text_frame(&self) -> OrientedRect {
        let width = estimate_text_width(&self.display_text(), self.text_height);
        let pivot = self.get_text_position();
        OrientedRect::new(
            pivot,
            0.0,
            BoundingBox2::new(
                Point2::new(-width / 2.0, -self.text_height / 2.0),
                Point2::new(width / 2.0, self.text_height / 2.0),
            ),
        )
    }

    /// 标注的所有线段：标注线 + 尺寸界线
    pub fn segments(&self) -> Vec<(Point2, Point2)> {
        let mut segments = vec![self.dimension_line()];
        segments.extend(self.extension_lines());
        segments
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        let mut bbox = self.text_frame().bounding_box();
        for (a, b) in self.segments() {
            bbox.expand_to_include(&a);
            bbox.expand_to_include(&b);
        }
        bbox
    }
}

/// 填充区域
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hatch {
    /// 边界多边形（隐含闭合）
    pub boundary: Vec<Point3>,
    /// 图案名称
    pub pattern: String,
}

impl Hatch {
    pub fn new(boundary: Vec<Point3>) -> Self {
        Self {
            boundary,
            pattern: "SOLID".to_string(),
        }
    }

    pub fn edges(&self) -> impl Iterator<Item = Line> + '_ {
        segments_of(&self.boundary, true)
    }

    /// 射线法判断点是否在边界多边形内
    pub fn contains_point(&self, point: &Point2) -> bool {
        point_in_polygon(point, &self.boundary.iter().map(flat).collect::<Vec<_>>())
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points(self.boundary.iter().map(flat))
    }
}

/// 射线法点在多边形内判定（边界上的点结果不确定）
pub fn point_in_polygon(point: &Point2, polygon: &[Point2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x = pj.x + (point.y - pj.y) / (pi.y - pj.y) * (pi.x - pj.x);
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn segment_count(vertex_count: usize, closed: bool) -> usize {
    match vertex_count {
        0 | 1 => 0,
        2 => 1,
        n if closed => n,
        n => n - 1,
    }
}

fn segments_of(points: &[Point3], closed: bool) -> impl Iterator<Item = Line> + '_ {
    let n = points.len();
    (0..segment_count(n, closed)).map(move |i| Line::new(points[i], points[(i + 1) % n]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p3(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn test_line_length() {
        let line = Line::new(p3(0.0, 0.0), p3(3.0, 4.0));
        assert!((line.length() - 5.0).abs() < EPSILON);
        assert_eq!(line.midpoint(), Point2::new(1.5, 2.0));
    }

    #[test]
    fn test_line_closest_point_clamps() {
        let line = Line::new(p3(0.0, 0.0), p3(10.0, 0.0));
        assert_eq!(line.closest_point(&Point2::new(5.0, 5.0)), Point2::new(5.0, 0.0));
        assert_eq!(line.closest_point(&Point2::new(-5.0, 1.0)), Point2::new(0.0, 0.0));
        assert!((line.distance_to_point(&Point2::new(13.0, 4.0)) - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_arc_wraps_through_zero() {
        // 从 270° 扫到 90°，经过 0°
        let arc = Arc::from_xy(Point2::origin(), 1.0, 1.5 * PI, 0.5 * PI);
        assert!((arc.sweep_angle() - PI).abs() < EPSILON);
        assert!(arc.contains_angle(0.0));
        assert!(arc.contains_angle(-0.25 * PI));
        assert!(!arc.contains_angle(PI));
        assert_eq!(arc.quadrant_points().len(), 3);
    }

    #[test]
    fn test_arc_closest_point_clamped_to_range() {
        let arc = Arc::from_xy(Point2::origin(), 5.0, 0.0, FRAC_PI_2);
        let on_arc = arc.closest_point(&Point2::new(10.0, 10.0));
        assert!((on_arc.coords.norm() - 5.0).abs() < 1e-9);

        let clamped = arc.closest_point(&Point2::new(-3.0, -1.0));
        assert!(
            (clamped - Point2::new(5.0, 0.0)).norm() < 1e-9
                || (clamped - Point2::new(0.0, 5.0)).norm() < 1e-9
        );
    }

    #[test]
    fn test_polyline_closed_segments() {
        let square = Polyline::from_xy(
            [
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 10.0),
                Point2::new(0.0, 10.0),
            ],
            true,
        );
        assert_eq!(square.segment_count(), 4);
        assert!((square.length() - 40.0).abs() < EPSILON);
        assert_eq!(square.centroid(), Some(Point2::new(5.0, 5.0)));
        // 闭合段参与距离计算
        assert!((square.distance_to_point(&Point2::new(-1.0, 5.0)) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_oriented_rect_round_trip() {
        let rect = OrientedRect::new(
            Point2::new(1.0, 2.0),
            FRAC_PI_2,
            BoundingBox2::new(Point2::new(0.0, 0.0), Point2::new(4.0, 1.0)),
        );
        // 旋转 90° 后 x 轴朝上
        assert!(rect.contains(&Point2::new(0.5, 4.0)));
        assert!(!rect.contains(&Point2::new(3.0, 2.5)));
        let world = rect.to_world(&Point2::new(2.0, 0.5));
        let local = rect.to_local(&world);
        assert!((local - Point2::new(2.0, 0.5)).norm() < 1e-12);
    }

    #[test]
    fn test_dimension_reconstruction() {
        let dim = Dimension::new(p3(0.0, 0.0), p3(10.0, 0.0), p3(5.0, 4.0));
        let (d1, d2) = dim.dimension_line();
        assert!((d1 - Point2::new(0.0, 4.0)).norm() < EPSILON);
        assert!((d2 - Point2::new(10.0, 4.0)).norm() < EPSILON);
        assert_eq!(dim.extension_lines().len(), 2);
        assert!(dim.get_text_position().y > 4.0);
        assert_eq!(dim.display_text(), "10.00");

        let linear = Dimension::new(p3(0.0, 0.0), p3(3.0, 8.0), p3(-2.0, 0.0))
            .with_type(DimensionType::Linear);
        let (l1, l2) = linear.dimension_line();
        assert_eq!(l1, Point2::new(-2.0, 0.0));
        assert_eq!(l2, Point2::new(-2.0, 8.0));
        assert!((linear.measurement() - 8.0).abs() < EPSILON);
    }

    #[test]
    fn test_point_in_polygon() {
        let tri = [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(0.0, 10.0)];
        assert!(point_in_polygon(&Point2::new(2.0, 2.0), &tri));
        assert!(!point_in_polygon(&Point2::new(8.0, 8.0), &tri));
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        assert!(Geometry::Circle(Circle::new(p3(0.0, 0.0), -1.0)).validate().is_err());
        assert!(Geometry::Polyline(Polyline::new(vec![p3(0.0, 0.0)], false)).validate().is_err());
        assert!(Geometry::Donut(Donut::new(p3(0.0, 0.0), 3.0, 2.0)).validate().is_err());
        assert!(Geometry::Line(Line::new(p3(0.0, 0.0), p3(f64::NAN, 0.0))).validate().is_err());
        assert!(Geometry::Arc(Arc::from_xy(Point2::origin(), 2.0, 0.0, 1.0)).validate().is_ok());
    }

    #[test]
    fn test_full_turn_arc_is_invalid() {
        let full = Arc::from_xy(Point2::origin(), 2.0, 0.0, TAU);
        assert!(full.sweep_angle() < 1e-12);
        assert!(Geometry::Arc(full).validate().is_err());

        let wrapped = Arc::from_xy(Point2::origin(), 2.0, 6.0, 0.5);
        assert!(Geometry::Arc(wrapped).validate().is_ok());
    }
}
