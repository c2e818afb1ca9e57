//! 修剪
//!
//! 在目标实体与剪切边的交点处把它切开，删除光标所在的那一段，其余各段作为新实体返回
//! （新ID，元数据与目标相同）。
//!
//! 没有有效交点时整个实体被删除（返回空列表），不是错误。

use crate::entity::Entity;
use crate::geometry::{Arc, Circle, Geometry, Line};
use crate::intersection::find_intersections;
use crate::math::{angle_of, lift, normalize_angle, normalize_relative, Point2, Point3};
use crate::tolerance::{ANGLE_DEDUP_EPSILON, PARAM_EPSILON, TRIM_ANGLE_MARGIN, TRIM_END_MARGIN};
use std::f64::consts::TAU;
use tracing::debug;

/// 按目标类型分派修剪
///
/// 线段、圆弧、圆之外的实体不支持修剪，原样返回。
pub fn trim_entity(target: &Entity, click: &Point2, cutters: &[Entity]) -> Vec<Entity> {
    match &target.geometry {
        Geometry::Line(_) => trim_line_entity(target, click, cutters),
        Geometry::Arc(_) => trim_arc_entity(target, click, cutters),
        Geometry::Circle(_) => trim_circle_entity(target, click, cutters),
        _ => {
            debug!(entity = %target.id, kind = target.geometry.type_name(), "trim not supported");
            vec![target.clone()]
        }
    }
}

/// 目标与所有剪切边的交点（跳过目标自身）
fn cut_points(target: &Entity, cutters: &[Entity]) -> Vec<(Point2, Option<f64>)> {
    cutters
        .iter()
        .filter(|c| c.id != target.id)
        .flat_map(|c| find_intersections(&target.geometry, &c.geometry))
        .map(|hit| (hit.point, hit.param_a))
        .collect()
}

/// 升序排序并合并相邻的近似重复值
fn sort_dedup(mut values: Vec<f64>, epsilon: f64) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values.dedup_by(|b, a| (*b - *a).abs() < epsilon);
    values
}

/// 找出 `value` 所在的区间序号，`bounds` 升序且首尾为整个参数域
fn interval_containing(bounds: &[f64], value: f64) -> usize {
    let last = bounds.len().saturating_sub(2);
    (0..=last)
        .find(|&i| value < bounds[i + 1])
        .unwrap_or(last)
}

/// 线段上参数 t 处的三维点；端点原样返回
fn line_point3(line: &Line, t: f64) -> Point3 {
    if t <= 0.0 {
        line.start
    } else if t >= 1.0 {
        line.end
    } else {
        lift(line.point_at(t), line.start.z + (line.end.z - line.start.z) * t)
    }
}

/// 修剪线段
///
/// 交点参数只保留 t ∈ (0.001, 0.999)，避免在端点附近产生零长度碎片。
pub fn trim_line_entity(target: &Entity, click: &Point2, cutters: &[Entity]) -> Vec<Entity> {
    let Geometry::Line(line) = &target.geometry else {
        return vec![target.clone()];
    };

    let params: Vec<f64> = cut_points(target, cutters)
        .into_iter()
        .filter_map(|(_, t)| t)
        .filter(|t| *t > TRIM_END_MARGIN && *t < 1.0 - TRIM_END_MARGIN)
        .collect();
    let params = sort_dedup(params, PARAM_EPSILON);

    if params.is_empty() {
        debug!(entity = %target.id, "trim: no cutting edge, line deleted");
        return Vec::new();
    }

    let mut bounds = Vec::with_capacity(params.len() + 2);
    bounds.push(0.0);
    bounds.extend(params);
    bounds.push(1.0);

    let removed = interval_containing(&bounds, line.parameter_of(click));
    let pieces: Vec<Entity> = bounds
        .windows(2)
        .enumerate()
        .filter(|(i, _)| *i != removed)
        .map(|(_, w)| target.derive(Line::new(line_point3(line, w[0]), line_point3(line, w[1]))))
        .collect();

    debug!(entity = %target.id, pieces = pieces.len(), "trim: line split");
    pieces
}

/// 修剪圆弧
///
/// 交点角度相对起始角归一化为偏移量 [0, sweep]，离两端小于扫角 0.1% 的交点被忽略。
pub fn trim_arc_entity(target: &Entity, click: &Point2, cutters: &[Entity]) -> Vec<Entity> {
    let Geometry::Arc(arc) = &target.geometry else {
        return vec![target.clone()];
    };

    let center = arc.center_xy();
    let start = arc.start_angle;
    let sweep = arc.sweep_angle();
    let margin = sweep * TRIM_ANGLE_MARGIN;
    let offset_of = |p: &Point2| normalize_relative(angle_of(&center, p), start) - start;

    let offsets: Vec<f64> = cut_points(target, cutters)
        .iter()
        .map(|(p, _)| offset_of(p))
        .filter(|o| *o > margin && *o < sweep - margin)
        .collect();
    let offsets = sort_dedup(offsets, ANGLE_DEDUP_EPSILON);

    if offsets.is_empty() {
        debug!(entity = %target.id, "trim: no cutting edge, arc deleted");
        return Vec::new();
    }

    // 光标落在圆弧范围外时，归到离它较近的一端
    let mut click_offset = offset_of(click);
    if click_offset > sweep {
        click_offset = if click_offset - sweep < TAU - click_offset {
            sweep
        } else {
            0.0
        };
    }

    let mut bounds = Vec::with_capacity(offsets.len() + 2);
    bounds.push(0.0);
    bounds.extend(offsets);
    bounds.push(sweep);

    let removed = interval_containing(&bounds, click_offset);
    let pieces: Vec<Entity> = bounds
        .windows(2)
        .enumerate()
        .filter(|(i, _)| *i != removed)
        .map(|(_, w)| {
            target.derive(Arc::new(
                arc.center,
                arc.radius,
                normalize_angle(start + w[0]),
                normalize_angle(start + w[1]),
            ))
        })
        .collect();

    debug!(entity = %target.id, pieces = pieces.len(), "trim: arc split");
    pieces
}

/// 修剪整圆
///
/// 至少需要两个交点才能围出一段；n 个交点把圆分成 n 段，删除光标所在的一段后
/// 其余 n-1 段转为圆弧。
pub fn trim_circle_entity(target: &Entity, click: &Point2, cutters: &[Entity]) -> Vec<Entity> {
    let Geometry::Circle(circle) = &target.geometry else {
        return vec![target.clone()];
    };
    let center = circle.center_xy();

    let angles: Vec<f64> = cut_points(target, cutters)
        .iter()
        .map(|(p, _)| normalize_angle(angle_of(&center, p)))
        .collect();
    let mut angles = sort_dedup(angles, ANGLE_DEDUP_EPSILON);
    // 首尾跨过 0 角的重复点
    if angles.len() > 1 && angles[0] + TAU - angles[angles.len() - 1] < ANGLE_DEDUP_EPSILON {
        angles.pop();
    }

    if angles.len() < 2 {
        debug!(entity = %target.id, cuts = angles.len(), "trim: circle needs two cuts, deleted");
        return Vec::new();
    }

    let n = angles.len();
    let click_angle = angle_of(&center, click);
    let wedge_of = |i: usize| {
        let from = angles[i];
        let to = normalize_relative(angles[(i + 1) % n], from);
        (from, if to <= from { to + TAU } else { to })
    };
    let removed = (0..n)
        .find(|&i| {
            let (from, to) = wedge_of(i);
            normalize_relative(click_angle, from) < to
        })
        .unwrap_or(n - 1);

    let pieces: Vec<Entity> = (0..n)
        .filter(|&i| i != removed)
        .map(|i| {
            let (from, to) = wedge_of(i);
            target.derive(arc_on(circle, from, normalize_angle(to)))
        })
        .collect();

    debug!(entity = %target.id, pieces = pieces.len(), "trim: circle split into arcs");
    pieces
}

fn arc_on(circle: &Circle, start: f64, end: f64) -> Arc {
    Arc::new(circle.center, circle.radius, start, end)
}
