//! 特征点与夹点
//!
//! - [`get_snap_points`]：实体上与光标无关的捕捉特征点，由捕捉解析器缓存
//! - [`get_grip_points`]：交互编辑用的夹点
//! - [`move_grip`]：拖动夹点后得到的新实体（保留原ID）

use crate::entity::Entity;
use crate::geometry::Geometry;
use crate::math::{angle_of, flat, lift, Point2, Point3, Vector2};
use crate::snap::{SnapMode, SnapPoint};
use serde::{Deserialize, Serialize};

/// 收集实体的静态捕捉特征点
///
/// 垂足、切点、最近点和交点依赖光标位置，不在此列。
pub fn get_snap_points(entity: &Entity) -> Vec<SnapPoint> {
    let mut points = Vec::new();
    let mut push = |point: Point2, mode: SnapMode| points.push(SnapPoint::new(point, mode));

    match &entity.geometry {
        Geometry::Point(p) => push(p.xy(), SnapMode::Node),
        Geometry::Line(l) => {
            push(l.start_xy(), SnapMode::Endpoint);
            push(l.end_xy(), SnapMode::Endpoint);
            push(l.midpoint(), SnapMode::Midpoint);
        }
        Geometry::Circle(c) => {
            push(c.center_xy(), SnapMode::Center);
            for q in c.quadrant_points() {
                push(q, SnapMode::Quadrant);
            }
        }
        Geometry::Arc(a) => {
            push(a.start_point(), SnapMode::Endpoint);
            push(a.end_point(), SnapMode::Endpoint);
            push(a.midpoint(), SnapMode::Midpoint);
            push(a.center_xy(), SnapMode::Center);
            for q in a.quadrant_points() {
                push(q, SnapMode::Quadrant);
            }
        }
        Geometry::Ellipse(e) => {
            push(e.center_xy(), SnapMode::Center);
            for q in e.quadrant_points() {
                push(q, SnapMode::Quadrant);
            }
        }
        Geometry::Donut(d) => {
            push(d.center_xy(), SnapMode::Center);
            for q in d.outer_circle().quadrant_points() {
                push(q, SnapMode::Quadrant);
            }
        }
        Geometry::Polyline(pl) => {
            if let (Some(first), Some(last)) = (pl.vertices.first(), pl.vertices.last()) {
                push(flat(first), SnapMode::Endpoint);
                push(flat(last), SnapMode::Endpoint);
            }
            for v in &pl.vertices {
                push(flat(v), SnapMode::Node);
            }
            for seg in pl.segments() {
                push(seg.midpoint(), SnapMode::Midpoint);
            }
            if pl.closed {
                if let Some(c) = pl.centroid() {
                    push(c, SnapMode::Center);
                }
            }
        }
        Geometry::Spline(s) => {
            if !s.closed {
                let ends = (s.control_points.first(), s.control_points.last());
                if let (Some(first), Some(last)) = ends {
                    push(flat(first), SnapMode::Endpoint);
                    push(flat(last), SnapMode::Endpoint);
                }
            }
            for cp in &s.control_points {
                push(flat(cp), SnapMode::Node);
            }
        }
        Geometry::Text(t) => push(flat(&t.position), SnapMode::Node),
        Geometry::MText(t) => push(flat(&t.position), SnapMode::Node),
        Geometry::Table(t) => push(flat(&t.position), SnapMode::Node),
        Geometry::Dimension(d) => {
            push(flat(&d.definition_point1), SnapMode::Node);
            push(flat(&d.definition_point2), SnapMode::Node);
        }
        Geometry::Hatch(h) => {
            for v in &h.boundary {
                push(flat(v), SnapMode::Node);
            }
        }
    }

    points
}

/// 夹点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GripKind {
    Endpoint,
    Midpoint,
    Center,
    /// 象限点，拖动改变半径
    Quadrant,
    /// 多段线/填充边界顶点
    Vertex,
    /// 样条控制点
    ControlPoint,
    /// 文本、表格、点的插入点
    Insertion,
    /// 标注测量点
    DefinitionPoint,
    /// 标注线位置
    DimensionLine,
}

/// 夹点
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GripPoint {
    pub point: Point2,
    pub kind: GripKind,
    /// 在 [`get_grip_points`] 返回列表中的序号，传给 [`move_grip`]
    pub index: usize,
}

/// 获取实体的夹点列表
pub fn get_grip_points(entity: &Entity) -> Vec<GripPoint> {
    let raw: Vec<(Point2, GripKind)> = match &entity.geometry {
        Geometry::Point(p) => vec![(p.xy(), GripKind::Insertion)],
        Geometry::Line(l) => vec![
            (l.start_xy(), GripKind::Endpoint),
            (l.midpoint(), GripKind::Midpoint),
            (l.end_xy(), GripKind::Endpoint),
        ],
        Geometry::Circle(c) => std::iter::once((c.center_xy(), GripKind::Center))
            .chain(c.quadrant_points().map(|q| (q, GripKind::Quadrant)))
            .collect(),
        Geometry::Arc(a) => vec![
            (a.center_xy(), GripKind::Center),
            (a.start_point(), GripKind::Endpoint),
            (a.midpoint(), GripKind::Midpoint),
            (a.end_point(), GripKind::Endpoint),
        ],
        Geometry::Ellipse(e) => std::iter::once((e.center_xy(), GripKind::Center))
            .chain(e.quadrant_points().map(|q| (q, GripKind::Quadrant)))
            .collect(),
        Geometry::Donut(d) => std::iter::once((d.center_xy(), GripKind::Center))
            .chain(d.outer_circle().quadrant_points().map(|q| (q, GripKind::Quadrant)))
            .collect(),
        Geometry::Polyline(pl) => pl
            .vertices
            .iter()
            .map(|v| (flat(v), GripKind::Vertex))
            .chain(pl.segments().map(|s| (s.midpoint(), GripKind::Midpoint)))
            .collect(),
        Geometry::Spline(s) => s
            .control_points
            .iter()
            .map(|p| (flat(p), GripKind::ControlPoint))
            .collect(),
        Geometry::Text(t) => vec![(flat(&t.position), GripKind::Insertion)],
        Geometry::MText(t) => vec![(flat(&t.position), GripKind::Insertion)],
        Geometry::Table(t) => vec![(flat(&t.position), GripKind::Insertion)],
        Geometry::Dimension(d) => vec![
            (flat(&d.definition_point1), GripKind::DefinitionPoint),
            (flat(&d.definition_point2), GripKind::DefinitionPoint),
            (flat(&d.line_location), GripKind::DimensionLine),
        ],
        Geometry::Hatch(h) => h
            .boundary
            .iter()
            .map(|v| (flat(v), GripKind::Vertex))
            .collect(),
    };

    raw.into_iter()
        .enumerate()
        .map(|(index, (point, kind))| GripPoint { point, kind, index })
        .collect()
}

/// 把点移动到目标位置，保留原有的 z
fn relocate(point: &mut Point3, target: Point2) {
    *point = lift(target, point.z);
}

/// 平移一个点
fn shift(point: &mut Point3, delta: Vector2) {
    point.x += delta.x;
    point.y += delta.y;
}

/// 拖动夹点
///
/// 返回修改后的实体（保留ID和元数据）；序号越界时返回 `None`。
pub fn move_grip(entity: &Entity, index: usize, target: Point2) -> Option<Entity> {
    let grips = get_grip_points(entity);
    let grip = grips.get(index)?;
    let delta = target - grip.point;

    let mut moved = entity.clone();
    match &mut moved.geometry {
        Geometry::Point(p) => relocate(&mut p.position, target),
        Geometry::Line(l) => match index {
            0 => relocate(&mut l.start, target),
            1 => {
                shift(&mut l.start, delta);
                shift(&mut l.end, delta);
            }
            _ => relocate(&mut l.end, target),
        },
        Geometry::Circle(c) => {
            if index == 0 {
                relocate(&mut c.center, target);
            } else {
                c.radius = (target - c.center_xy()).norm();
            }
        }
        Geometry::Arc(a) => match index {
            0 => relocate(&mut a.center, target),
            1 => a.start_angle = angle_of(&a.center_xy(), &target),
            2 => a.radius = (target - a.center_xy()).norm(),
            _ => a.end_angle = angle_of(&a.center_xy(), &target),
        },
        Geometry::Ellipse(e) => match index {
            0 => relocate(&mut e.center, target),
            // 0° 与 180° 象限点控制 X 半轴
            1 | 3 => e.rx = (target.x - e.center.x).abs(),
            _ => e.ry = (target.y - e.center.y).abs(),
        },
        Geometry::Donut(d) => {
            if index == 0 {
                relocate(&mut d.center, target);
            } else {
                d.outer_radius = (target - d.center_xy()).norm().max(d.inner_radius);
            }
        }
        Geometry::Polyline(pl) => {
            let n = pl.vertices.len();
            if index < n {
                relocate(&mut pl.vertices[index], target);
            } else {
                // 段中点：整段平移
                let seg = index - n;
                let next = (seg + 1) % n;
                shift(&mut pl.vertices[seg], delta);
                shift(&mut pl.vertices[next], delta);
            }
        }
        Geometry::Spline(s) => relocate(&mut s.control_points[index], target),
        Geometry::Text(t) => relocate(&mut t.position, target),
        Geometry::MText(t) => relocate(&mut t.position, target),
        Geometry::Table(t) => relocate(&mut t.position, target),
        Geometry::Dimension(d) => match index {
            0 => relocate(&mut d.definition_point1, target),
            1 => relocate(&mut d.definition_point2, target),
            _ => relocate(&mut d.line_location, target),
        },
        Geometry::Hatch(h) => relocate(&mut h.boundary[index], target),
    }
    Some(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Arc, Circle, Line, Polyline};
    use std::f64::consts::PI;

    fn p3(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn test_line_snap_points() {
        let line = Entity::new(Line::new(p3(0.0, 0.0), p3(10.0, 0.0)));
        let points = get_snap_points(&line);
        assert_eq!(points.len(), 3);
        assert_eq!(points[2], SnapPoint::new(Point2::new(5.0, 0.0), SnapMode::Midpoint));
    }

    #[test]
    fn test_arc_quadrants_limited_to_range() {
        let arc = Entity::new(Arc::new(p3(0.0, 0.0), 1.0, -0.1, PI / 2.0 + 0.1));
        let quadrants = get_snap_points(&arc)
            .into_iter()
            .filter(|p| p.mode == SnapMode::Quadrant)
            .count();
        assert_eq!(quadrants, 2);
    }

    #[test]
    fn test_closed_polyline_has_center() {
        let square = Entity::new(Polyline::new(
            vec![p3(0.0, 0.0), p3(4.0, 0.0), p3(4.0, 4.0), p3(0.0, 4.0)],
            true,
        ));
        let points = get_snap_points(&square);
        let center: Vec<_> = points.iter().filter(|p| p.mode == SnapMode::Center).collect();
        assert_eq!(center.len(), 1);
        assert_eq!(center[0].point, Point2::new(2.0, 2.0));
        assert_eq!(points.iter().filter(|p| p.mode == SnapMode::Midpoint).count(), 4);
    }

    #[test]
    fn test_grip_indices_are_sequential() {
        let circle = Entity::new(Circle::new(p3(1.0, 1.0), 2.0));
        let grips = get_grip_points(&circle);
        assert_eq!(grips.len(), 5);
        assert_eq!(grips[0].kind, GripKind::Center);
        for (i, g) in grips.iter().enumerate() {
            assert_eq!(g.index, i);
        }
    }

    #[test]
    fn test_move_line_grips() {
        let line = Entity::new(Line::new(p3(0.0, 0.0), p3(10.0, 0.0)));

        let stretched = move_grip(&line, 2, Point2::new(20.0, 5.0)).unwrap();
        assert_eq!(stretched.id, line.id);
        let Geometry::Line(l) = &stretched.geometry else { panic!("expected line") };
        assert_eq!(l.end_xy(), Point2::new(20.0, 5.0));

        let moved = move_grip(&line, 1, Point2::new(5.0, 3.0)).unwrap();
        let Geometry::Line(l) = &moved.geometry else { panic!("expected line") };
        assert_eq!(l.start_xy(), Point2::new(0.0, 3.0));
        assert_eq!(l.end_xy(), Point2::new(10.0, 3.0));

        assert!(move_grip(&line, 3, Point2::origin()).is_none());
    }

    #[test]
    fn test_move_circle_quadrant_changes_radius() {
        let circle = Entity::new(Circle::new(p3(0.0, 0.0), 2.0));
        let resized = move_grip(&circle, 1, Point2::new(0.0, 7.0)).unwrap();
        let Geometry::Circle(c) = &resized.geometry else { panic!("expected circle") };
        assert_eq!(c.radius, 7.0);
        assert_eq!(c.center_xy(), Point2::origin());
    }

    #[test]
    fn test_move_closed_polyline_segment_midpoint() {
        let tri = Entity::new(Polyline::new(
            vec![p3(0.0, 0.0), p3(4.0, 0.0), p3(0.0, 4.0)],
            true,
        ));
        // 序号 5 是闭合段 (0,4)-(0,0) 的中点
        let moved = move_grip(&tri, 5, Point2::new(-1.0, 2.0)).unwrap();
        let Geometry::Polyline(pl) = &moved.geometry else { panic!("expected polyline") };
        assert_eq!(flat(&pl.vertices[2]), Point2::new(-1.0, 4.0));
        assert_eq!(flat(&pl.vertices[0]), Point2::new(-1.0, 0.0));
        assert_eq!(flat(&pl.vertices[1]), Point2::new(4.0, 0.0));
    }
}
