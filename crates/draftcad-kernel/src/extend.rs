//! 延伸
//!
//! 把线段或圆弧离光标较近的一端延长到最近的边界。找不到边界时原样返回，
//! 延伸成功则返回带新ID的实体。

use crate::entity::Entity;
use crate::geometry::{Arc, Geometry, Line};
use crate::intersection::find_intersections;
use crate::math::{angle_of, lift, normalize_angle, Point2};
use crate::tolerance::{ANGLE_EPSILON, EXTEND_LENGTH, EXTEND_MIN_DISTANCE};
use std::f64::consts::TAU;
use tracing::debug;

/// 延伸哪一端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Start,
    End,
}

fn nearer_end(click: &Point2, start: &Point2, end: &Point2) -> End {
    if (click - start).norm() < (click - end).norm() {
        End::Start
    } else {
        End::End
    }
}

/// 按目标类型分派延伸；不支持的类型原样返回
pub fn extend_entity(target: &Entity, click: &Point2, boundaries: &[Entity]) -> Entity {
    match &target.geometry {
        Geometry::Line(_) => extend_line_entity(target, click, boundaries),
        Geometry::Arc(_) => extend_arc_entity(target, click, boundaries),
        _ => {
            debug!(entity = %target.id, kind = target.geometry.type_name(), "extend not supported");
            target.clone()
        }
    }
}

/// 延伸线段
///
/// 从较近的端点沿线段方向构造一条长辅助线与边界求交，只接受位于延伸方向上
/// （点积为正）的交点，取最近者。
pub fn extend_line_entity(target: &Entity, click: &Point2, boundaries: &[Entity]) -> Entity {
    let Geometry::Line(line) = &target.geometry else {
        return target.clone();
    };
    if line.is_degenerate() {
        return target.clone();
    }

    let end = nearer_end(click, &line.start_xy(), &line.end_xy());
    let (origin, dir) = match end {
        End::Start => (line.start_xy(), (line.start_xy() - line.end_xy()).normalize()),
        End::End => (line.end_xy(), line.delta().normalize()),
    };
    let ray: Geometry = Line::from_xy(origin, origin + dir * EXTEND_LENGTH).into();

    let hit = boundaries
        .iter()
        .filter(|b| b.id != target.id)
        .flat_map(|b| find_intersections(&ray, &b.geometry))
        .map(|r| (r.point, (r.point - origin).dot(&dir)))
        .filter(|(_, d)| *d > EXTEND_MIN_DISTANCE)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    let Some((point, distance)) = hit else {
        debug!(entity = %target.id, "extend: no boundary hit");
        return target.clone();
    };

    let mut extended = line.clone();
    match end {
        End::Start => extended.start = lift(point, line.start.z),
        End::End => extended.end = lift(point, line.end.z),
    }
    debug!(entity = %target.id, distance, "extend: line extended");
    target.derive(extended)
}

/// 延伸圆弧
///
/// 辅助几何是圆弧所在的整圆；从较近一端沿延伸方向量角距离，只接受落在
/// 圆弧之外（角距离小于 2π - 扫角）的交点，取角距离最小者。
pub fn extend_arc_entity(target: &Entity, click: &Point2, boundaries: &[Entity]) -> Entity {
    let Geometry::Arc(arc) = &target.geometry else {
        return target.clone();
    };

    let center = arc.center_xy();
    let end = nearer_end(click, &arc.start_point(), &arc.end_point());
    let remaining = TAU - arc.sweep_angle();
    let circle: Geometry = arc.circle().into();

    // 起点端顺时针延伸，终点端逆时针延伸
    let angular_distance = |p: &Point2| {
        let angle = angle_of(&center, p);
        match end {
            End::Start => normalize_angle(arc.start_angle - angle),
            End::End => normalize_angle(angle - arc.end_angle),
        }
    };

    let hit = boundaries
        .iter()
        .filter(|b| b.id != target.id)
        .flat_map(|b| find_intersections(&circle, &b.geometry))
        .map(|r| angular_distance(&r.point))
        .filter(|d| *d > ANGLE_EPSILON && *d < remaining)
        .min_by(f64::total_cmp);

    let Some(delta) = hit else {
        debug!(entity = %target.id, "extend: no boundary hit");
        return target.clone();
    };

    let extended = match end {
        End::Start => Arc {
            start_angle: normalize_angle(arc.start_angle - delta),
            ..arc.clone()
        },
        End::End => Arc {
            end_angle: normalize_angle(arc.end_angle + delta),
            ..arc.clone()
        },
    };
    debug!(entity = %target.id, delta, "extend: arc extended");
    target.derive(extended)
}
