//! 对象捕捉系统
//!
//! 参考 LibreCAD 的设计，实现 CAD 标准的对象捕捉功能。
//!
//! 支持的捕捉类型：
//! - 端点 (Endpoint)
//! - 中点 (Midpoint)
//! - 圆心 (Center)
//! - 交点 (Intersection)
//! - 垂足 (Perpendicular)
//! - 切点 (Tangent)
//! - 最近点 (Nearest)
//! - 象限点 (Quadrant)
//! - 节点 (Node)
//!
//! 每个 (实体, 捕捉类型) 组合只产生一个最佳候选点；所有候选中离光标最近且在
//! 孔径内的获胜。距离相同时按求值顺序决定（实体列表顺序，其次捕捉类型顺序），
//! 这只是一个约定俗成的规则，并没有几何上的依据。

use crate::entity::{Entity, EntityId};
use crate::error::{KernelError, Result};
use crate::geometry::{Arc, Circle, Geometry, Line};
use crate::grips::get_snap_points;
use crate::hittest::closest_point_on_geometry;
use crate::intersection::{find_intersections, project_point_on_line};
use crate::math::{angle_of, BoundingBox2, Point2};
use crate::spatial::SpatialIndex;
use crate::tolerance::PARAM_EPSILON;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// 捕捉类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapMode {
    /// 端点捕捉
    Endpoint,
    /// 中点捕捉
    Midpoint,
    /// 圆心捕捉
    Center,
    /// 交点捕捉
    Intersection,
    /// 垂足捕捉
    Perpendicular,
    /// 切点捕捉
    Tangent,
    /// 最近点捕捉
    Nearest,
    /// 象限点（圆/弧的0°, 90°, 180°, 270°位置）
    Quadrant,
    /// 节点（点实体、多段线顶点）
    Node,
}

impl SnapMode {
    /// 固定的求值顺序
    pub const ALL: [SnapMode; 9] = [
        SnapMode::Endpoint,
        SnapMode::Midpoint,
        SnapMode::Center,
        SnapMode::Intersection,
        SnapMode::Perpendicular,
        SnapMode::Tangent,
        SnapMode::Nearest,
        SnapMode::Quadrant,
        SnapMode::Node,
    ];

    /// 获取捕捉类型的名称
    pub fn name(&self) -> &'static str {
        match self {
            SnapMode::Endpoint => "端点",
            SnapMode::Midpoint => "中点",
            SnapMode::Center => "圆心",
            SnapMode::Intersection => "交点",
            SnapMode::Perpendicular => "垂足",
            SnapMode::Tangent => "切点",
            SnapMode::Nearest => "最近点",
            SnapMode::Quadrant => "象限点",
            SnapMode::Node => "节点",
        }
    }

    /// 获取捕捉类型的快捷键
    pub fn shortcut(&self) -> &'static str {
        match self {
            SnapMode::Endpoint => "END",
            SnapMode::Midpoint => "MID",
            SnapMode::Center => "CEN",
            SnapMode::Intersection => "INT",
            SnapMode::Perpendicular => "PER",
            SnapMode::Tangent => "TAN",
            SnapMode::Nearest => "NEA",
            SnapMode::Quadrant => "QUA",
            SnapMode::Node => "NOD",
        }
    }

    fn bit(&self) -> u16 {
        match self {
            SnapMode::Endpoint => SnapMask::ENDPOINT,
            SnapMode::Midpoint => SnapMask::MIDPOINT,
            SnapMode::Center => SnapMask::CENTER,
            SnapMode::Intersection => SnapMask::INTERSECTION,
            SnapMode::Perpendicular => SnapMask::PERPENDICULAR,
            SnapMode::Tangent => SnapMask::TANGENT,
            SnapMode::Nearest => SnapMask::NEAREST,
            SnapMode::Quadrant => SnapMask::QUADRANT,
            SnapMode::Node => SnapMask::NODE,
        }
    }
}

/// 捕捉掩码（位域，用于快速启用/禁用捕捉类型）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapMask {
    bits: u16,
}

impl SnapMask {
    pub const ENDPOINT: u16 = 1 << 0;
    pub const MIDPOINT: u16 = 1 << 1;
    pub const CENTER: u16 = 1 << 2;
    pub const INTERSECTION: u16 = 1 << 3;
    pub const PERPENDICULAR: u16 = 1 << 4;
    pub const TANGENT: u16 = 1 << 5;
    pub const NEAREST: u16 = 1 << 6;
    pub const QUADRANT: u16 = 1 << 7;
    pub const NODE: u16 = 1 << 8;

    pub const NONE: SnapMask = SnapMask { bits: 0 };
    pub const ALL: SnapMask = SnapMask { bits: 0x01FF };

    pub fn new(bits: u16) -> Self {
        Self { bits }
    }

    pub fn of(modes: &[SnapMode]) -> Self {
        let mut mask = Self::NONE;
        for mode in modes {
            mask.set(*mode, true);
        }
        mask
    }

    pub fn is_enabled(&self, mode: SnapMode) -> bool {
        self.bits & mode.bit() != 0
    }

    pub fn set(&mut self, mode: SnapMode, enabled: bool) {
        if enabled {
            self.bits |= mode.bit();
        } else {
            self.bits &= !mode.bit();
        }
    }

    pub fn toggle(&mut self, mode: SnapMode) {
        let enabled = self.is_enabled(mode);
        self.set(mode, !enabled);
    }

    /// 按固定求值顺序列出启用的捕捉类型
    pub fn iter(&self) -> impl Iterator<Item = SnapMode> + '_ {
        SnapMode::ALL.into_iter().filter(|m| self.is_enabled(*m))
    }
}

impl Default for SnapMask {
    fn default() -> Self {
        // 默认启用常用的捕捉类型
        Self {
            bits: Self::ENDPOINT | Self::MIDPOINT | Self::CENTER | Self::INTERSECTION,
        }
    }
}

/// 捕捉配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    /// 捕捉总开关
    pub enabled: bool,
    /// 启用的捕捉类型
    pub modes: SnapMask,
    /// 捕捉孔径（缩放为 1 时的世界单位）
    pub aperture: f64,
    /// 是否启用磁吸（向捕捉点柔性靠拢而非直接跳转）
    pub magnet: bool,
    /// 磁吸强度 [0, 1]
    pub magnet_strength: f64,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            modes: SnapMask::default(),
            aperture: 10.0,
            magnet: false,
            magnet_strength: 0.5,
        }
    }
}

impl SnapSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.aperture.is_finite() && self.aperture > 0.0) {
            return Err(KernelError::InvalidSettings(format!(
                "aperture must be positive, got {}",
                self.aperture
            )));
        }
        if !(0.0..=1.0).contains(&self.magnet_strength) {
            return Err(KernelError::InvalidSettings(format!(
                "magnet strength must be within [0, 1], got {}",
                self.magnet_strength
            )));
        }
        Ok(())
    }

    /// 从 JSON 加载并校验
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: SnapSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// 实体上与光标无关的特征点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapPoint {
    pub point: Point2,
    pub mode: SnapMode,
}

impl SnapPoint {
    pub fn new(point: Point2, mode: SnapMode) -> Self {
        Self { point, mode }
    }
}

/// 捕捉结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// 是否捕捉成功
    pub snapped: bool,
    /// 返回给交互层的点（磁吸时为混合后的点）
    pub point: Point2,
    /// 精确的捕捉点
    pub target: Option<Point2>,
    pub mode: Option<SnapMode>,
    pub entity: Option<EntityId>,
}

impl SnapResult {
    /// 未捕捉，原样返回光标位置
    pub fn none(cursor: Point2) -> Self {
        Self {
            snapped: false,
            point: cursor,
            target: None,
            mode: None,
            entity: None,
        }
    }
}

/// 候选点
#[derive(Debug, Clone, Copy)]
struct Candidate {
    point: Point2,
    mode: SnapMode,
    entity: EntityId,
    distance: f64,
}

/// 捕捉解析器
///
/// 持有一份实体快照及其缓存（静态特征点、空间索引）。快照只能通过
/// [`SnapResolver::set_snapshot`] 整体替换，替换时立即重建缓存，查询只读缓存。
#[derive(Debug, Clone)]
pub struct SnapResolver {
    settings: SnapSettings,
    entities: Vec<Entity>,
    /// 每个实体的静态特征点，与 `entities` 一一对应
    features: Vec<Vec<SnapPoint>>,
    index: SpatialIndex,
    revision: u64,
}

impl SnapResolver {
    pub fn new(settings: SnapSettings) -> Self {
        Self {
            settings,
            entities: Vec::new(),
            features: Vec::new(),
            index: SpatialIndex::default_grid(),
            revision: 0,
        }
    }

    /// 获取配置
    pub fn settings(&self) -> &SnapSettings {
        &self.settings
    }

    /// 获取配置（可变）
    pub fn settings_mut(&mut self) -> &mut SnapSettings {
        &mut self.settings
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// 快照版本号，每次 [`set_snapshot`](Self::set_snapshot) 递增
    pub fn snapshot_revision(&self) -> u64 {
        self.revision
    }

    /// 替换实体快照并重建缓存
    ///
    /// 索引框取几何包围盒与静态特征点的并集：圆弧的圆心通常不在圆弧自身的
    /// 包围盒内。
    pub fn set_snapshot(&mut self, entities: Vec<Entity>) {
        self.features = entities.iter().map(get_snap_points).collect();
        self.index = SpatialIndex::build(entities.iter().zip(&self.features).map(|(e, f)| {
            e.bounding_box()
                .union(&BoundingBox2::from_points(f.iter().map(|s| s.point)))
        }));
        self.entities = entities;
        self.revision += 1;
        debug!(
            entities = self.entities.len(),
            revision = self.revision,
            "snap snapshot rebuilt"
        );
    }

    /// 寻找最佳捕捉点
    ///
    /// 孔径按 `zoom` 缩放，保证屏幕上的拾取半径不随视图缩放变化。
    pub fn find_snap_point(&self, cursor: Point2, zoom: f64) -> SnapResult {
        if !self.settings.enabled || !(zoom.is_finite() && zoom > 0.0) {
            return SnapResult::none(cursor);
        }

        let aperture = self.settings.aperture / zoom;
        let nearby: Vec<usize> = self
            .index
            .query_around(&cursor, aperture)
            .into_iter()
            .filter(|i| self.entities[*i].visible)
            .collect();

        let mut best: Option<Candidate> = None;
        for (k, &i) in nearby.iter().enumerate() {
            let entity = &self.entities[i];
            for mode in self.settings.modes.iter() {
                let point = if mode == SnapMode::Intersection {
                    self.intersection_candidate(i, &nearby[k + 1..], &cursor)
                } else {
                    self.feature_candidate(i, mode, &cursor)
                };
                let Some(point) = point else { continue };

                let distance = (point - cursor).norm();
                if distance > aperture {
                    continue;
                }
                if best.map_or(true, |b| distance < b.distance) {
                    best = Some(Candidate {
                        point,
                        mode,
                        entity: entity.id,
                        distance,
                    });
                }
            }
        }

        let Some(best) = best else {
            return SnapResult::none(cursor);
        };
        trace!(mode = ?best.mode, entity = %best.entity, distance = best.distance, "snap hit");

        let point = if self.settings.magnet {
            let strength = self.settings.magnet_strength.clamp(0.0, 1.0);
            cursor + (best.point - cursor) * strength
        } else {
            best.point
        };

        SnapResult {
            snapped: true,
            point,
            target: Some(best.point),
            mode: Some(best.mode),
            entity: Some(best.entity),
        }
    }

    /// 单个实体在某个捕捉类型下的最佳候选点
    fn feature_candidate(&self, index: usize, mode: SnapMode, cursor: &Point2) -> Option<Point2> {
        let geometry = &self.entities[index].geometry;
        match mode {
            SnapMode::Midpoint => {
                if let Geometry::Polyline(pl) = geometry {
                    // 取离光标最近的那一段的中点
                    return pl.nearest_segment(cursor).map(|(_, seg)| seg.midpoint());
                }
                closest_feature(&self.features[index], mode, cursor)
            }
            SnapMode::Endpoint | SnapMode::Center | SnapMode::Quadrant | SnapMode::Node => {
                closest_feature(&self.features[index], mode, cursor)
            }
            SnapMode::Perpendicular => perpendicular_point(geometry, cursor),
            SnapMode::Nearest => closest_point_on_geometry(cursor, geometry),
            SnapMode::Tangent => tangent_point(geometry, cursor),
            SnapMode::Intersection => None,
        }
    }

    /// 交点候选：与其后的邻近实体两两求交，取离光标最近的交点
    fn intersection_candidate(
        &self,
        index: usize,
        others: &[usize],
        cursor: &Point2,
    ) -> Option<Point2> {
        let geometry = &self.entities[index].geometry;
        others
            .iter()
            .flat_map(|&j| find_intersections(geometry, &self.entities[j].geometry))
            .map(|hit| hit.point)
            .min_by(|a, b| (a - cursor).norm().total_cmp(&(b - cursor).norm()))
    }
}

impl Default for SnapResolver {
    fn default() -> Self {
        Self::new(SnapSettings::default())
    }
}

fn closest_feature(features: &[SnapPoint], mode: SnapMode, cursor: &Point2) -> Option<Point2> {
    features
        .iter()
        .filter(|f| f.mode == mode)
        .map(|f| f.point)
        .min_by(|a, b| (a - cursor).norm().total_cmp(&(b - cursor).norm()))
}

/// 光标沿圆心方向落到圆周上的点；光标与圆心重合时无定义
fn radial_point(circle: &Circle, cursor: &Point2) -> Option<Point2> {
    circle.closest_point(cursor)
}

/// 垂足：光标在直线上的正交投影（必须落在线段内），或圆/弧上的径向点
fn perpendicular_point(geometry: &Geometry, cursor: &Point2) -> Option<Point2> {
    let on_segment = |line: &Line| {
        if line.is_degenerate() {
            return None;
        }
        let (foot, t) = project_point_on_line(cursor, line);
        (-PARAM_EPSILON..=1.0 + PARAM_EPSILON)
            .contains(&t)
            .then_some(foot)
    };

    match geometry {
        Geometry::Line(l) => on_segment(l),
        Geometry::Polyline(pl) => pl.nearest_segment(cursor).and_then(|(_, s)| on_segment(&s)),
        Geometry::Circle(c) => radial_point(c, cursor),
        Geometry::Arc(a) => radial_point(&a.circle(), cursor).filter(|p| a.contains_point_angle(p)),
        _ => None,
    }
}

/// 切点：光标在圆外时取圆周上的径向点，光标在圆内时无结果
fn tangent_point(geometry: &Geometry, cursor: &Point2) -> Option<Point2> {
    let outside = |circle: &Circle| (cursor - circle.center_xy()).norm() >= circle.radius;
    match geometry {
        Geometry::Circle(c) if outside(c) => radial_point(c, cursor),
        Geometry::Arc(a) if outside(&a.circle()) => arc_radial(a, cursor),
        Geometry::Donut(d) if outside(&d.outer_circle()) => radial_point(&d.outer_circle(), cursor),
        _ => None,
    }
}

fn arc_radial(arc: &Arc, cursor: &Point2) -> Option<Point2> {
    arc.contains_angle(angle_of(&arc.center_xy(), cursor))
        .then(|| radial_point(&arc.circle(), cursor))
        .flatten()
}
