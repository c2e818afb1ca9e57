//! 求交引擎
//!
//! 任意两个实体之间的交点计算。实体先分解为基本曲线（线段、整圆、圆弧），
//! 再由对称的曲线对分派表路由到对应的求解器：
//!
//! | A \ B   | 线段 | 整圆 | 圆弧 |
//! |---------|------|------|------|
//! | 线段    | 行列式 | 二次方程 | 二次方程 + 角度过滤 |
//! | 整圆    |  ←   | 三角形法 | 三角形法 + 角度过滤 |
//! | 圆弧    |  ←   |  ←   | 三角形法 + 双向角度过滤 |
//!
//! 左下半部分通过交换参数复用右上半部分的实现。

use crate::entity::Entity;
use crate::geometry::{Arc, Circle, Geometry, Line};
use crate::math::{cross, Point2, Vector2};
use crate::tolerance::{
    DETERMINANT_EPSILON, LENGTH_SQ_EPSILON, PARAM_EPSILON, POINT_EPSILON, ROOT_DEDUP_EPSILON,
    TANGENT_EPSILON,
};
use serde::{Deserialize, Serialize};

/// 交点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntersectionResult {
    pub point: Point2,
    /// 交点在第一个实体上的参数（仅当其为线段时有值，t ∈ [0, 1]）
    pub param_a: Option<f64>,
    /// 交点在第二个实体上的参数
    pub param_b: Option<f64>,
}

impl IntersectionResult {
    fn swapped(self) -> Self {
        Self {
            point: self.point,
            param_a: self.param_b,
            param_b: self.param_a,
        }
    }
}

/// 两条直线的无界交点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineLineHit {
    pub point: Point2,
    /// 在第一条直线上的参数
    pub t: f64,
    /// 在第二条直线上的参数
    pub u: f64,
}

/// 可求交的基本曲线
#[derive(Debug, Clone)]
pub enum Curve {
    Segment(Line),
    Circle(Circle),
    Arc(Arc),
}

impl Curve {
    /// 分派表中的行号，保证只需实现上三角
    fn rank(&self) -> u8 {
        match self {
            Curve::Segment(_) => 0,
            Curve::Circle(_) => 1,
            Curve::Arc(_) => 2,
        }
    }
}

/// 把实体几何分解为基本曲线
///
/// 多段线按线段展开（含闭合段）；样条、椭圆、圆环、文本、表格、标注、
/// 填充和点实体不参与求交。
pub fn curves_of(geometry: &Geometry) -> Vec<Curve> {
    match geometry {
        Geometry::Line(l) => vec![Curve::Segment(l.clone())],
        Geometry::Circle(c) => vec![Curve::Circle(c.clone())],
        Geometry::Arc(a) => vec![Curve::Arc(a.clone())],
        Geometry::Polyline(pl) => pl.segments().map(Curve::Segment).collect(),
        Geometry::Point(_)
        | Geometry::Ellipse(_)
        | Geometry::Spline(_)
        | Geometry::Donut(_)
        | Geometry::Text(_)
        | Geometry::MText(_)
        | Geometry::Table(_)
        | Geometry::Dimension(_)
        | Geometry::Hatch(_) => Vec::new(),
    }
}

/// 计算两个实体的交点
pub fn find_entity_intersections(a: &Entity, b: &Entity) -> Vec<IntersectionResult> {
    find_intersections(&a.geometry, &b.geometry)
}

/// 计算两个几何的交点
///
/// 只有单条线段 (`Geometry::Line`) 会带上参数；多段线共享顶点产生的
/// 重复交点会被合并。
pub fn find_intersections(a: &Geometry, b: &Geometry) -> Vec<IntersectionResult> {
    let a_is_line = matches!(a, Geometry::Line(_));
    let b_is_line = matches!(b, Geometry::Line(_));

    let curves_a = curves_of(a);
    let curves_b = curves_of(b);

    let mut results: Vec<IntersectionResult> = Vec::new();
    for ca in &curves_a {
        for cb in &curves_b {
            for hit in intersect_curves(ca, cb) {
                let hit = IntersectionResult {
                    point: hit.point,
                    param_a: hit.param_a.filter(|_| a_is_line),
                    param_b: hit.param_b.filter(|_| b_is_line),
                };
                let duplicate = results
                    .iter()
                    .any(|r| (r.point - hit.point).norm() < ROOT_DEDUP_EPSILON);
                if !duplicate {
                    results.push(hit);
                }
            }
        }
    }
    results
}

/// 两条基本曲线求交（对称分派）
pub fn intersect_curves(a: &Curve, b: &Curve) -> Vec<IntersectionResult> {
    if a.rank() > b.rank() {
        return intersect_curves(b, a)
            .into_iter()
            .map(IntersectionResult::swapped)
            .collect();
    }

    match (a, b) {
        (Curve::Segment(l1), Curve::Segment(l2)) => segment_segment(l1, l2).into_iter().collect(),
        (Curve::Segment(line), Curve::Circle(circle)) => {
            line_circle(line, &circle.center_xy(), circle.radius)
                .into_iter()
                .map(|(point, t)| IntersectionResult {
                    point,
                    param_a: Some(t),
                    param_b: None,
                })
                .collect()
        }
        (Curve::Segment(line), Curve::Arc(arc)) => {
            line_circle(line, &arc.center_xy(), arc.radius)
                .into_iter()
                .filter(|(p, _)| arc.contains_point_angle(p))
                .map(|(point, t)| IntersectionResult {
                    point,
                    param_a: Some(t),
                    param_b: None,
                })
                .collect()
        }
        (Curve::Circle(c1), Curve::Circle(c2)) => {
            circle_circle(&c1.center_xy(), c1.radius, &c2.center_xy(), c2.radius)
                .into_iter()
                .map(curve_hit)
                .collect()
        }
        (Curve::Circle(c), Curve::Arc(arc)) => {
            circle_circle(&c.center_xy(), c.radius, &arc.center_xy(), arc.radius)
                .into_iter()
                .filter(|p| arc.contains_point_angle(p))
                .map(curve_hit)
                .collect()
        }
        (Curve::Arc(a1), Curve::Arc(a2)) => {
            circle_circle(&a1.center_xy(), a1.radius, &a2.center_xy(), a2.radius)
                .into_iter()
                .filter(|p| a1.contains_point_angle(p) && a2.contains_point_angle(p))
                .map(curve_hit)
                .collect()
        }
        // rank 排序后不会出现下三角组合
        _ => Vec::new(),
    }
}

fn curve_hit(point: Point2) -> IntersectionResult {
    IntersectionResult {
        point,
        param_a: None,
        param_b: None,
    }
}

/// 直线-直线（无界）
///
/// 行列式绝对值小于 [`DETERMINANT_EPSILON`] 时视为平行，返回 `None`；
/// 否则总是返回两条无界直线的交点，由调用方决定是否截断到线段。
pub fn line_line(l1: &Line, l2: &Line) -> Option<LineLineHit> {
    let d1 = l1.delta();
    let d2 = l2.delta();

    let denom = cross(&d1, &d2);
    if denom.abs() < DETERMINANT_EPSILON {
        return None;
    }

    let d = l2.start_xy() - l1.start_xy();
    let t = cross(&d, &d2) / denom;
    let u = cross(&d, &d1) / denom;

    Some(LineLineHit {
        point: l1.start_xy() + d1 * t,
        t,
        u,
    })
}

/// 线段-线段：无界交点再按两侧线段范围过滤
fn segment_segment(l1: &Line, l2: &Line) -> Option<IntersectionResult> {
    let hit = line_line(l1, l2)?;
    if in_unit_range(hit.t) && in_unit_range(hit.u) && !l1.is_degenerate() && !l2.is_degenerate()
    {
        Some(IntersectionResult {
            point: hit.point,
            param_a: Some(hit.t.clamp(0.0, 1.0)),
            param_b: Some(hit.u.clamp(0.0, 1.0)),
        })
    } else {
        None
    }
}

#[inline]
fn in_unit_range(t: f64) -> bool {
    (-PARAM_EPSILON..=1.0 + PARAM_EPSILON).contains(&t)
}

/// 点是否在线段上（按投影参数判断）
///
/// 退化（零长度）线段不包含任何点。
pub fn segment_contains(line: &Line, point: &Point2) -> bool {
    if line.is_degenerate() {
        return false;
    }
    let t = line.parameter_of(point);
    if !in_unit_range(t) {
        return false;
    }
    (line.point_at(t) - point).norm() < ROOT_DEDUP_EPSILON
}

/// 点在直线上的正交投影（不截断）及其参数
pub fn project_point_on_line(point: &Point2, line: &Line) -> (Point2, f64) {
    let t = line.parameter_of(point);
    (line.point_at(t), t)
}

/// 直线与圆的无界交点参数（升序）
fn line_circle_roots(line: &Line, center: &Point2, radius: f64) -> Vec<f64> {
    let d = line.delta();
    let f = line.start_xy() - center;

    let a = d.dot(&d);
    if a < POINT_EPSILON {
        return Vec::new();
    }
    let b = 2.0 * f.dot(&d);
    let c = f.dot(&f) - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }

    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);

    if (t2 - t1).abs() < ROOT_DEDUP_EPSILON {
        // 相切，合并为一个点
        vec![(t1 + t2) / 2.0]
    } else {
        vec![t1, t2]
    }
}

/// 线段-圆：代入参数方程得到关于 t 的二次方程，只保留 t ∈ [0, 1] 的根
pub fn line_circle(line: &Line, center: &Point2, radius: f64) -> Vec<(Point2, f64)> {
    line_circle_roots(line, center, radius)
        .into_iter()
        .filter(|t| in_unit_range(*t))
        .map(|t| {
            let t = t.clamp(0.0, 1.0);
            (line.point_at(t), t)
        })
        .collect()
}

/// 圆-圆（三角形法）
///
/// 圆心距 d 大于半径和、小于半径差或为零（同心）时无交点；
/// 半弦长 h≈0 时相切返回一个点，否则返回关于连心线对称的两个点。
pub fn circle_circle(c1: &Point2, r1: f64, c2: &Point2, r2: f64) -> Vec<Point2> {
    let delta = c2 - c1;
    let d = delta.norm();

    if d < POINT_EPSILON || d > r1 + r2 + TANGENT_EPSILON || d < (r1 - r2).abs() - TANGENT_EPSILON
    {
        return Vec::new();
    }

    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();

    let dir = delta / d;
    let p = c1 + dir * a;

    if h < TANGENT_EPSILON {
        return vec![p];
    }

    let perp = Vector2::new(-dir.y, dir.x);
    vec![p + perp * h, p - perp * h]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polyline;
    use crate::math::Point3;
    use std::f64::consts::PI;

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Line {
        Line::from_xy(Point2::new(x1, y1), Point2::new(x2, y2))
    }

    #[test]
    fn test_line_line_crossing() {
        let a = Geometry::Line(line(0.0, 0.0, 10.0, 0.0));
        let b = Geometry::Line(line(5.0, -5.0, 5.0, 5.0));

        let hits = find_intersections(&a, &b);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].point - Point2::new(5.0, 0.0)).norm() < 1e-9);
        assert!((hits[0].param_a.unwrap() - 0.5).abs() < 1e-9);
        assert!((hits[0].param_b.unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_crossing_segments_satisfy_both_lines() {
        let mut checked = 0;
        for i in 0..24 {
            for j in 0..24 {
                let p = Point2::new((i as f64 * 1.7).sin() * 50.0, (j as f64 * 2.3).cos() * 50.0);
                let theta_a = i as f64 * 0.37;
                // 夹角在 [0.1, 1.71] 内，两线不平行
                let theta_b = theta_a + 0.1 + j as f64 * 0.07;
                let dir_a = Vector2::new(theta_a.cos(), theta_a.sin());
                let dir_b = Vector2::new(theta_b.cos(), theta_b.sin());
                let (back_a, fwd_a) = (1.0 + (i % 5) as f64, 0.5 + (j % 7) as f64);
                let (back_b, fwd_b) = (0.25 + (j % 3) as f64, 2.0 + (i % 4) as f64);

                let a = Line::from_xy(p - dir_a * back_a, p + dir_a * fwd_a);
                let b = Line::from_xy(p - dir_b * back_b, p + dir_b * fwd_b);
                let (ga, gb) = (Geometry::Line(a.clone()), Geometry::Line(b.clone()));
                let hits = find_intersections(&ga, &gb);
                assert_eq!(hits.len(), 1, "pair ({}, {})", i, j);

                let hit = hits[0];
                assert!(cross(&(hit.point - a.start_xy()), &a.delta()).abs() < 1e-6);
                assert!(cross(&(hit.point - b.start_xy()), &b.delta()).abs() < 1e-6);

                let t = hit.param_a.unwrap();
                let u = hit.param_b.unwrap();
                assert!((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u));
                assert!((a.point_at(t) - hit.point).norm() < 1e-6);
                assert!((b.point_at(u) - hit.point).norm() < 1e-6);
                checked += 1;
            }
        }
        assert_eq!(checked, 24 * 24);
    }

    #[test]
    fn test_line_line_raw_solver_is_unbounded() {
        let hit = line_line(&line(0.0, 0.0, 1.0, 0.0), &line(5.0, -1.0, 5.0, 1.0)).unwrap();
        assert!((hit.t - 5.0).abs() < 1e-9);
        assert!((hit.u - 0.5).abs() < 1e-9);

        // 截断后无交点
        let a = Geometry::Line(line(0.0, 0.0, 1.0, 0.0));
        let b = Geometry::Line(line(5.0, -1.0, 5.0, 1.0));
        assert!(find_intersections(&a, &b).is_empty());
    }

    #[test]
    fn test_parallel_lines() {
        assert!(line_line(&line(0.0, 0.0, 10.0, 0.0), &line(0.0, 1.0, 10.0, 1.0)).is_none());
    }

    #[test]
    fn test_segment_contains_rejects_degenerate() {
        let l = line(0.0, 0.0, 10.0, 0.0);
        assert!(segment_contains(&l, &Point2::new(3.0, 0.0)));
        assert!(!segment_contains(&l, &Point2::new(11.0, 0.0)));
        assert!(!segment_contains(&line(1.0, 1.0, 1.0, 1.0), &Point2::new(1.0, 1.0)));
    }

    #[test]
    fn test_line_circle_two_points_and_tangent() {
        let hits = line_circle(&line(-10.0, 0.0, 10.0, 0.0), &Point2::origin(), 5.0);
        assert_eq!(hits.len(), 2);
        assert!((hits[0].0 - Point2::new(-5.0, 0.0)).norm() < 1e-9);
        assert!((hits[1].0 - Point2::new(5.0, 0.0)).norm() < 1e-9);

        let tangent = line_circle(&line(-10.0, 5.0, 10.0, 5.0), &Point2::origin(), 5.0);
        assert_eq!(tangent.len(), 1);

        let miss = line_circle(&line(-10.0, 6.0, 10.0, 6.0), &Point2::origin(), 5.0);
        assert!(miss.is_empty());

        // 线段只到达圆内
        let partial = line_circle(&line(0.0, 0.0, 10.0, 0.0), &Point2::origin(), 5.0);
        assert_eq!(partial.len(), 1);
        assert!((partial[0].1 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_circle_circle_cases() {
        let two = circle_circle(&Point2::origin(), 5.0, &Point2::new(8.0, 0.0), 5.0);
        assert_eq!(two.len(), 2);
        assert!((two[0] - Point2::new(4.0, 3.0)).norm() < 1e-9);
        assert!((two[1] - Point2::new(4.0, -3.0)).norm() < 1e-9);

        let tangent = circle_circle(&Point2::origin(), 5.0, &Point2::new(10.0, 0.0), 5.0);
        assert_eq!(tangent.len(), 1);
        assert!((tangent[0] - Point2::new(5.0, 0.0)).norm() < 1e-9);

        assert!(circle_circle(&Point2::origin(), 5.0, &Point2::new(20.0, 0.0), 5.0).is_empty());
        assert!(circle_circle(&Point2::origin(), 5.0, &Point2::new(1.0, 0.0), 1.0).is_empty());
        assert!(circle_circle(&Point2::origin(), 5.0, &Point2::origin(), 3.0).is_empty());
    }

    #[test]
    fn test_arc_filters_candidates() {
        // 上半圆弧只保留 y > 0 的交点
        let arc = Geometry::Arc(Arc::from_xy(Point2::origin(), 5.0, 0.0, PI));
        let vertical = Geometry::Line(line(3.0, -10.0, 3.0, 10.0));
        let hits = find_intersections(&arc, &vertical);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].point - Point2::new(3.0, 4.0)).norm() < 1e-9);
        // 参数随参数顺序交换
        assert!(hits[0].param_a.is_none());
        assert!(hits[0].param_b.is_some());
    }

    #[test]
    fn test_wrapping_arc_against_circle() {
        // 跨越 0° 的右半圆弧
        let arc = Geometry::Arc(Arc::from_xy(Point2::origin(), 5.0, 1.5 * PI, 0.5 * PI));
        let circle = Geometry::Circle(Circle::from_xy(Point2::new(8.0, 0.0), 5.0));
        assert_eq!(find_intersections(&arc, &circle).len(), 2);

        let left = Geometry::Circle(Circle::from_xy(Point2::new(-8.0, 0.0), 5.0));
        assert!(find_intersections(&arc, &left).is_empty());
    }

    #[test]
    fn test_polyline_shared_vertex_deduplicated() {
        let pl = Geometry::Polyline(Polyline::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(5.0, 0.0, 0.0),
                Point3::new(5.0, 5.0, 0.0),
            ],
            false,
        ));
        // 穿过共享顶点 (5, 0)
        let diag = Geometry::Line(line(3.0, -2.0, 7.0, 2.0));
        let hits = find_intersections(&pl, &diag);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].param_a.is_none());
    }

    #[test]
    fn test_unsupported_pairs_are_empty() {
        let ellipse = Geometry::Ellipse(crate::geometry::Ellipse::new(Point3::origin(), 3.0, 2.0));
        let l = Geometry::Line(line(-10.0, 0.0, 10.0, 0.0));
        assert!(find_intersections(&ellipse, &l).is_empty());
    }
}
