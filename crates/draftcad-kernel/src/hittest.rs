//! 拾取测试
//!
//! - 点选：光标到实体显示几何的最近距离，与拾取容差比较
//! - 框选：AutoCAD 风格的窗口 (Window，完全包含) 与交叉 (Crossing，有任何重叠)
//!
//! 对任意实体和选择框，窗口选中必然交叉选中。

use crate::entity::{Entity, EntityId};
use crate::geometry::{point_in_polygon, Circle, Geometry, Line, OrientedRect};
use crate::intersection::line_circle;
use crate::math::{flat, BoundingBox2, Point2, EPSILON};
use serde::{Deserialize, Serialize};

/// 椭圆框选时的多边形近似段数
const ELLIPSE_SAMPLES: usize = 64;

/// 框选模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    /// 窗口选择：实体完全位于框内
    Window,
    /// 交叉选择：实体与框有任何重叠
    Crossing,
}

impl SelectionMode {
    /// 按拖拽方向决定模式：从左往右为窗口，从右往左为交叉
    pub fn from_drag(start: &Point2, end: &Point2) -> Self {
        if end.x >= start.x {
            SelectionMode::Window
        } else {
            SelectionMode::Crossing
        }
    }
}

/// 光标到实体的距离（与 [`distance_from_entity`] 相同）
pub fn closest_point_on_entity(cursor: &Point2, entity: &Entity) -> f64 {
    distance_from_entity(cursor, entity)
}

/// 光标到实体显示几何的最近距离
pub fn distance_from_entity(cursor: &Point2, entity: &Entity) -> f64 {
    distance_from_geometry(cursor, &entity.geometry)
}

/// 光标到几何的最近距离
///
/// - 线段/多段线：所有线段（含闭合段）截断距离的最小值
/// - 圆/圆弧/椭圆/圆环：到圆心距离与半径之差的绝对值（圆弧超出角度范围时取端点距离，
///   椭圆按平均半轴近似为圆，圆环取内外圆的较小值）
/// - 样条：控制多边形近似
/// - 填充：边界内部的点距离为 0，否则取到边界的距离
/// - 文本/多行文本/表格：光标转换到旋转补偿后的局部坐标，框内为 0
/// - 标注：文字外框、两条尺寸界线和标注线的最小值
pub fn distance_from_geometry(cursor: &Point2, geometry: &Geometry) -> f64 {
    match geometry {
        Geometry::Point(p) => (cursor - p.xy()).norm(),
        Geometry::Line(l) => l.distance_to_point(cursor),
        Geometry::Polyline(pl) => pl.distance_to_point(cursor),
        Geometry::Circle(c) => c.distance_to_point(cursor).abs(),
        Geometry::Arc(a) => a.distance_to_point(cursor),
        Geometry::Ellipse(e) => ((cursor - e.center_xy()).norm() - e.average_radius()).abs(),
        Geometry::Donut(d) => {
            let r = (cursor - d.center_xy()).norm();
            (r - d.inner_radius).abs().min((r - d.outer_radius).abs())
        }
        Geometry::Spline(s) => s.distance_to_point(cursor),
        Geometry::Hatch(h) => {
            if h.contains_point(cursor) {
                0.0
            } else {
                h.edges()
                    .map(|e| e.distance_to_point(cursor))
                    .fold(f64::MAX, f64::min)
            }
        }
        Geometry::Text(t) => t.frame().distance_to_point(cursor),
        Geometry::MText(t) => t.frame().distance_to_point(cursor),
        Geometry::Table(t) => t.frame().distance_to_point(cursor),
        Geometry::Dimension(d) => d
            .segments()
            .into_iter()
            .map(|(a, b)| Line::from_xy(a, b).distance_to_point(cursor))
            .fold(d.text_frame().distance_to_point(cursor), f64::min),
    }
}

/// 实体上离光标最近的点
pub fn closest_point_on_entity_point(cursor: &Point2, entity: &Entity) -> Option<Point2> {
    closest_point_on_geometry(cursor, &entity.geometry)
}

/// 几何上离光标最近的点
///
/// 线段截断投影，圆周取径向点，圆弧截断到角度范围，样条按控制多边形。
/// 光标与圆心重合、文本和填充等没有曲线意义的几何返回 `None`。
pub fn closest_point_on_geometry(cursor: &Point2, geometry: &Geometry) -> Option<Point2> {
    let nearer = |a: &Point2, b: &Point2| (a - cursor).norm().total_cmp(&(b - cursor).norm());
    match geometry {
        Geometry::Point(p) => Some(p.xy()),
        Geometry::Line(l) => Some(l.closest_point(cursor)),
        Geometry::Polyline(pl) => pl.nearest_segment(cursor).map(|(_, s)| s.closest_point(cursor)),
        Geometry::Spline(s) => s
            .control_segments()
            .map(|seg| seg.closest_point(cursor))
            .min_by(nearer),
        Geometry::Circle(c) => c.closest_point(cursor),
        Geometry::Arc(a) => Some(a.closest_point(cursor)),
        Geometry::Donut(d) => {
            let inner = Circle::new(d.center, d.inner_radius);
            [inner.closest_point(cursor), d.outer_circle().closest_point(cursor)]
                .into_iter()
                .flatten()
                .min_by(nearer)
        }
        Geometry::Ellipse(e) => {
            let d = cursor - e.center_xy();
            if d.norm() < EPSILON || e.rx <= 0.0 || e.ry <= 0.0 {
                return None;
            }
            Some(e.point_at_param((d.y / e.ry).atan2(d.x / e.rx)))
        }
        Geometry::Text(_)
        | Geometry::MText(_)
        | Geometry::Table(_)
        | Geometry::Dimension(_)
        | Geometry::Hatch(_) => None,
    }
}

/// 点选：返回容差内距离最近的可见实体
///
/// 距离相同时取列表中靠前的实体。
pub fn pick_entity(cursor: &Point2, entities: &[Entity], tolerance: f64) -> Option<EntityId> {
    let mut best: Option<(EntityId, f64)> = None;
    for entity in entities.iter().filter(|e| e.visible) {
        let d = distance_from_entity(cursor, entity);
        if d > tolerance {
            continue;
        }
        let replace = match best {
            None => true,
            Some((_, bd)) => d < bd,
        };
        if replace {
            best = Some((entity.id, d));
        }
    }
    best.map(|(id, _)| id)
}

/// 窗口选择：实体是否完全位于框内
pub fn is_entity_in_box(entity: &Entity, box_min: &Point2, box_max: &Point2) -> bool {
    geometry_in_box(&entity.geometry, &BoundingBox2::new(*box_min, *box_max))
}

/// 交叉选择：实体是否与框有任何重叠
pub fn does_entity_intersect_box(entity: &Entity, box_min: &Point2, box_max: &Point2) -> bool {
    geometry_intersects_box(&entity.geometry, &BoundingBox2::new(*box_min, *box_max))
}

/// 按模式框选，返回选中的可见实体（保持列表顺序）
pub fn select_in_box(
    entities: &[Entity],
    corner1: &Point2,
    corner2: &Point2,
    mode: SelectionMode,
) -> Vec<EntityId> {
    let bbox = BoundingBox2::new(*corner1, *corner2);
    entities
        .iter()
        .filter(|e| e.visible)
        .filter(|e| match mode {
            SelectionMode::Window => geometry_in_box(&e.geometry, &bbox),
            SelectionMode::Crossing => geometry_intersects_box(&e.geometry, &bbox),
        })
        .map(|e| e.id)
        .collect()
}

/// 窗口包含判定
pub fn geometry_in_box(geometry: &Geometry, bbox: &BoundingBox2) -> bool {
    match geometry {
        Geometry::Point(p) => bbox.contains(&p.xy()),
        Geometry::Line(l) => bbox.contains(&l.start_xy()) && bbox.contains(&l.end_xy()),
        Geometry::Circle(c) => bbox.contains_box(&c.bounding_box()),
        // 圆弧按所在整圆判断
        Geometry::Arc(a) => bbox.contains_box(&a.circle().bounding_box()),
        Geometry::Ellipse(e) => bbox.contains_box(&e.bounding_box()),
        Geometry::Donut(d) => bbox.contains_box(&d.bounding_box()),
        Geometry::Polyline(pl) => all_inside(bbox, pl.vertices.iter().map(flat)),
        Geometry::Spline(s) => all_inside(bbox, s.control_points.iter().map(flat)),
        Geometry::Hatch(h) => all_inside(bbox, h.boundary.iter().map(flat)),
        Geometry::Text(t) => all_inside(bbox, t.frame().corners()),
        Geometry::MText(t) => all_inside(bbox, t.frame().corners()),
        Geometry::Table(t) => all_inside(bbox, t.frame().corners()),
        Geometry::Dimension(d) => bbox.contains_box(&d.bounding_box()),
    }
}

/// 交叉重叠判定（先判窗口包含，再判边界重叠）
pub fn geometry_intersects_box(geometry: &Geometry, bbox: &BoundingBox2) -> bool {
    if geometry_in_box(geometry, bbox) {
        return true;
    }

    match geometry {
        Geometry::Point(p) => bbox.contains(&p.xy()),
        Geometry::Line(l) => segment_intersects_box(&l.start_xy(), &l.end_xy(), bbox),
        Geometry::Polyline(pl) => pl
            .segments()
            .any(|s| segment_intersects_box(&s.start_xy(), &s.end_xy(), bbox)),
        Geometry::Spline(s) => s
            .control_segments()
            .any(|seg| segment_intersects_box(&seg.start_xy(), &seg.end_xy(), bbox)),
        Geometry::Hatch(h) => {
            let polygon: Vec<Point2> = h.boundary.iter().map(flat).collect();
            h.edges()
                .any(|e| segment_intersects_box(&e.start_xy(), &e.end_xy(), bbox))
                || point_in_polygon(&bbox.center(), &polygon)
        }
        Geometry::Circle(c) => disk_touches_box(&c.center_xy(), c.radius, bbox),
        Geometry::Donut(d) => disk_touches_box(&d.center_xy(), d.outer_radius, bbox),
        Geometry::Arc(a) => {
            bbox.contains(&a.start_point())
                || bbox.contains(&a.end_point())
                || box_edges(bbox).iter().any(|(p, q)| {
                    line_circle(&Line::from_xy(*p, *q), &a.center_xy(), a.radius)
                        .iter()
                        .any(|(hit, _)| a.contains_point_angle(hit))
                })
        }
        Geometry::Ellipse(e) => {
            let polygon = e.sample(ELLIPSE_SAMPLES);
            polygon_outline_touches_box(&polygon, bbox)
                || point_in_polygon(&bbox.center(), &polygon)
        }
        Geometry::Text(t) => rect_overlaps_box(&t.frame(), bbox),
        Geometry::MText(t) => rect_overlaps_box(&t.frame(), bbox),
        Geometry::Table(t) => rect_overlaps_box(&t.frame(), bbox),
        Geometry::Dimension(d) => {
            d.segments()
                .iter()
                .any(|(a, b)| segment_intersects_box(a, b, bbox))
                || rect_overlaps_box(&d.text_frame(), bbox)
        }
    }
}

fn all_inside(bbox: &BoundingBox2, points: impl IntoIterator<Item = Point2>) -> bool {
    points.into_iter().all(|p| bbox.contains(&p))
}

/// 框上离圆心最近的点是否在半径之内
fn disk_touches_box(center: &Point2, radius: f64, bbox: &BoundingBox2) -> bool {
    (bbox.closest_point(center) - center).norm() <= radius
}

fn box_edges(bbox: &BoundingBox2) -> [(Point2, Point2); 4] {
    let c = bbox.corners();
    [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
}

/// 线段是否与框有重叠（端点在框内或与任一框边相交）
pub fn segment_intersects_box(a: &Point2, b: &Point2, bbox: &BoundingBox2) -> bool {
    if bbox.contains(a) || bbox.contains(b) {
        return true;
    }
    box_edges(bbox)
        .iter()
        .any(|(c, d)| segments_cross(a, b, c, d))
}

fn polygon_outline_touches_box(polygon: &[Point2], bbox: &BoundingBox2) -> bool {
    let n = polygon.len();
    (0..n).any(|i| segment_intersects_box(&polygon[i], &polygon[(i + 1) % n], bbox))
}

/// 旋转矩形与框的重叠判定
fn rect_overlaps_box(rect: &OrientedRect, bbox: &BoundingBox2) -> bool {
    rect.corners().iter().any(|c| bbox.contains(c))
        || bbox.corners().iter().any(|c| rect.contains(c))
        || rect
            .edges()
            .iter()
            .any(|(a, b)| segment_intersects_box(a, b, bbox))
}

/// 两条线段是否相交（含共线重叠和端点接触）
fn segments_cross(a: &Point2, b: &Point2, c: &Point2, d: &Point2) -> bool {
    fn orient(a: &Point2, b: &Point2, c: &Point2) -> f64 {
        (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
    }
    fn on_segment(a: &Point2, b: &Point2, p: &Point2) -> bool {
        p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
    }

    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);

    if o1 * o2 < 0.0 && o3 * o4 < 0.0 {
        return true;
    }
    (o1 == 0.0 && on_segment(a, b, c))
        || (o2 == 0.0 && on_segment(a, b, d))
        || (o3 == 0.0 && on_segment(c, d, a))
        || (o4 == 0.0 && on_segment(c, d, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{
        Arc, Circle, Dimension, Donut, Ellipse, Hatch, MText, Point, Polyline, Spline, Table,
        Text,
    };
    use crate::math::Point3;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn p2(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn p3(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    fn sample_geometries() -> Vec<Geometry> {
        vec![
            Point::new(p3(1.0, 1.0)).into(),
            Line::new(p3(0.0, 0.0), p3(10.0, 5.0)).into(),
            Circle::new(p3(5.0, 5.0), 3.0).into(),
            Arc::new(p3(0.0, 0.0), 4.0, 0.25 * PI, 1.25 * PI).into(),
            Ellipse::new(p3(-3.0, 2.0), 4.0, 1.5).into(),
            Polyline::new(vec![p3(0.0, 0.0), p3(4.0, 0.0), p3(4.0, 4.0)], true).into(),
            Spline::new(vec![p3(-5.0, -5.0), p3(0.0, 3.0), p3(5.0, -5.0)], 2, false).into(),
            Donut::new(p3(2.0, -2.0), 1.0, 2.0).into(),
            Text::new(p3(1.0, 1.0), "HELLO", 2.0).with_rotation(0.3).into(),
            MText::new(p3(-4.0, 6.0), "line one\nline two", 1.0, 8.0).into(),
            Table::new(p3(0.0, 10.0), vec![2.0, 2.0], vec![5.0, 3.0]).into(),
            Dimension::new(p3(0.0, 0.0), p3(6.0, 0.0), p3(3.0, 3.0)).into(),
            Hatch::new(vec![p3(0.0, 0.0), p3(6.0, 0.0), p3(3.0, 5.0)]).into(),
        ]
    }

    #[test]
    fn test_line_and_circle_distance() {
        let line: Geometry = Line::new(p3(0.0, 0.0), p3(10.0, 0.0)).into();
        assert!((distance_from_geometry(&p2(5.0, 3.0), &line) - 3.0).abs() < 1e-12);

        let circle: Geometry = Circle::new(p3(0.0, 0.0), 5.0).into();
        assert!((distance_from_geometry(&p2(0.0, 2.0), &circle) - 3.0).abs() < 1e-12);
        assert!((distance_from_geometry(&p2(0.0, 7.0), &circle) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_arc_distance_outside_range_uses_endpoints() {
        let arc: Geometry = Arc::new(p3(0.0, 0.0), 5.0, 0.0, FRAC_PI_2).into();
        // 在圆上但不在弧上
        let d = distance_from_geometry(&p2(-5.0, 0.0), &arc);
        assert!((d - 50.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_donut_and_ellipse_distance() {
        let donut: Geometry = Donut::new(p3(0.0, 0.0), 2.0, 4.0).into();
        assert!((distance_from_geometry(&p2(2.5, 0.0), &donut) - 0.5).abs() < 1e-12);

        let ellipse: Geometry = Ellipse::new(p3(0.0, 0.0), 4.0, 2.0).into();
        assert!((distance_from_geometry(&p2(3.0, 0.0), &ellipse)).abs() < 1e-12);
    }

    #[test]
    fn test_hatch_interior_is_hit() {
        let hatch: Geometry =
            Hatch::new(vec![p3(0.0, 0.0), p3(10.0, 0.0), p3(10.0, 10.0), p3(0.0, 10.0)]).into();
        assert_eq!(distance_from_geometry(&p2(5.0, 5.0), &hatch), 0.0);
        assert!((distance_from_geometry(&p2(12.0, 5.0), &hatch) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotated_text_hit() {
        // 旋转 90°，文字沿 +Y 方向排布
        let text: Geometry = Text::new(p3(0.0, 0.0), "ABCD", 1.0)
            .with_rotation(FRAC_PI_2)
            .into();
        assert_eq!(distance_from_geometry(&p2(-0.5, 2.0), &text), 0.0);
        assert!(distance_from_geometry(&p2(2.0, 0.5), &text) > 1.0);
    }

    #[test]
    fn test_table_and_mtext_hang_below_insertion() {
        let table: Geometry = Table::new(p3(0.0, 0.0), vec![1.0, 1.0], vec![3.0]).into();
        assert_eq!(distance_from_geometry(&p2(1.0, -1.5), &table), 0.0);
        assert!((distance_from_geometry(&p2(1.0, 1.0), &table) - 1.0).abs() < 1e-12);

        let mtext: Geometry = MText::new(p3(0.0, 0.0), "a\nb\nc", 1.0, 5.0).into();
        assert_eq!(distance_from_geometry(&p2(2.0, -2.5), &mtext), 0.0);
    }

    #[test]
    fn test_dimension_hit_on_extension_line() {
        let dim: Geometry = Dimension::new(p3(0.0, 0.0), p3(10.0, 0.0), p3(5.0, 5.0)).into();
        // 第一条尺寸界线 x = 0, y ∈ [0, 5]
        assert!(distance_from_geometry(&p2(0.0, 2.0), &dim) < 1e-12);
        // 标注线 y = 5
        assert!(distance_from_geometry(&p2(7.0, 5.0), &dim) < 1e-12);
    }

    #[test]
    fn test_pick_entity_nearest_visible() {
        let near = Entity::new(Line::new(p3(0.0, 1.0), p3(10.0, 1.0)));
        let nearer_hidden = Entity::new(Line::new(p3(0.0, 0.2), p3(10.0, 0.2))).hidden();
        let far = Entity::new(Line::new(p3(0.0, 3.0), p3(10.0, 3.0)));
        let entities = vec![far, nearer_hidden, near.clone()];

        assert_eq!(pick_entity(&p2(5.0, 0.0), &entities, 2.0), Some(near.id));
        assert_eq!(pick_entity(&p2(5.0, -5.0), &entities, 2.0), None);
    }

    #[test]
    fn test_window_vs_crossing_line() {
        let line = Entity::new(Line::new(p3(0.0, 0.0), p3(10.0, 0.0)));
        let (min, max) = (p2(-1.0, -1.0), p2(5.0, 1.0));
        assert!(!is_entity_in_box(&line, &min, &max));
        assert!(does_entity_intersect_box(&line, &min, &max));

        // 穿过框但两端都在外面
        let through = Entity::new(Line::new(p3(-10.0, 0.0), p3(10.0, 0.0)));
        assert!(does_entity_intersect_box(&through, &p2(-1.0, -1.0), &p2(1.0, 1.0)));
        assert!(!does_entity_intersect_box(&through, &p2(-1.0, 2.0), &p2(1.0, 3.0)));
    }

    #[test]
    fn test_circle_crossing_uses_closest_box_point() {
        let circle = Entity::new(Circle::new(p3(0.0, 0.0), 5.0));
        assert!(does_entity_intersect_box(&circle, &p2(4.0, -1.0), &p2(8.0, 1.0)));
        assert!(!does_entity_intersect_box(&circle, &p2(4.0, 4.0), &p2(8.0, 8.0)));
        assert!(is_entity_in_box(&circle, &p2(-5.0, -5.0), &p2(5.0, 5.0)));
    }

    #[test]
    fn test_arc_crossing_respects_range() {
        // 上半圆弧，框只覆盖下半圆所在区域
        let arc = Entity::new(Arc::new(p3(0.0, 0.0), 5.0, 0.0, PI));
        assert!(!does_entity_intersect_box(&arc, &p2(-1.0, -6.0), &p2(1.0, -4.0)));
        assert!(does_entity_intersect_box(&arc, &p2(-1.0, 4.0), &p2(1.0, 6.0)));
    }

    #[test]
    fn test_hatch_crossing_when_box_inside() {
        let hatch = Entity::new(Hatch::new(vec![
            p3(0.0, 0.0),
            p3(10.0, 0.0),
            p3(10.0, 10.0),
            p3(0.0, 10.0),
        ]));
        assert!(does_entity_intersect_box(&hatch, &p2(4.0, 4.0), &p2(6.0, 6.0)));
        assert!(!is_entity_in_box(&hatch, &p2(4.0, 4.0), &p2(6.0, 6.0)));
    }

    #[test]
    fn test_window_implies_crossing_for_all_types() {
        let boxes = [
            (p2(-20.0, -20.0), p2(20.0, 20.0)),
            (p2(0.0, 0.0), p2(5.0, 5.0)),
            (p2(-2.0, -1.0), p2(3.0, 12.0)),
            (p2(4.0, 4.0), p2(6.0, 6.0)),
            (p2(-100.0, -100.0), p2(-50.0, -50.0)),
            (p2(-6.0, -6.0), p2(6.0, 0.5)),
        ];
        for geometry in sample_geometries() {
            let entity = Entity::new(geometry);
            for (min, max) in &boxes {
                if is_entity_in_box(&entity, min, max) {
                    assert!(
                        does_entity_intersect_box(&entity, min, max),
                        "{} window-selected but not crossing-selected",
                        entity.geometry.type_name()
                    );
                }
            }
            // 足够大的框窗口选中所有实体
            assert!(
                is_entity_in_box(&entity, &p2(-50.0, -50.0), &p2(50.0, 50.0)),
                "{} not inside large window",
                entity.geometry.type_name()
            );
        }
    }

    #[test]
    fn test_select_in_box_modes() {
        let inside = Entity::new(Line::new(p3(1.0, 1.0), p3(2.0, 2.0)));
        let partial = Entity::new(Line::new(p3(1.0, 1.0), p3(20.0, 2.0)));
        let entities = vec![inside.clone(), partial.clone()];

        let start = p2(0.0, 0.0);
        let end = p2(5.0, 5.0);
        assert_eq!(SelectionMode::from_drag(&start, &end), SelectionMode::Window);
        assert_eq!(
            select_in_box(&entities, &start, &end, SelectionMode::Window),
            vec![inside.id]
        );
        assert_eq!(
            select_in_box(&entities, &end, &start, SelectionMode::from_drag(&end, &start)),
            vec![inside.id, partial.id]
        );
    }

    #[test]
    fn test_closest_point_on_entity_point() {
        let arc = Entity::new(Arc::new(p3(0.0, 0.0), 5.0, 0.0, FRAC_PI_2));
        let p = closest_point_on_entity_point(&p2(3.0, 3.0), &arc).unwrap();
        assert!((p.coords.norm() - 5.0).abs() < 1e-12);
        assert!((p.x - p.y).abs() < 1e-12);

        // 超出角度范围时截断到端点
        let p = closest_point_on_entity_point(&p2(-1.0, -4.0), &arc).unwrap();
        assert!((p - p2(5.0, 0.0)).norm() < 1e-12);

        let circle = Entity::new(Circle::new(p3(0.0, 0.0), 5.0));
        assert!(closest_point_on_entity_point(&p2(0.0, 0.0), &circle).is_none());

        let text = Entity::new(Text::new(p3(0.0, 0.0), "A", 1.0));
        assert!(closest_point_on_entity_point(&p2(0.0, 0.0), &text).is_none());
    }
}
