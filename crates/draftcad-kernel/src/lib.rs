//! DraftCAD 二维几何内核
//!
//! 为交互式绘图提供计算几何支持：任意两个图元求交、光标附近的对象捕捉、
//! 按剪切边修剪/按边界延伸，以及点选和框选。
//!
//! # 架构设计
//!
//! 内核是纯函数库，不持有实体存储：
//! - `Entity`: 唯一ID + 图层/颜色/可见性 + 几何数据
//! - 每次查询读取调用方传入的实体快照
//! - 修剪/延伸不修改输入，产生带新ID的实体
//!
//! # 示例
//!
//! ```rust
//! use draftcad_kernel::prelude::*;
//!
//! let a = Entity::new(Line::from_xy(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)));
//! let b = Entity::new(Line::from_xy(Point2::new(5.0, -5.0), Point2::new(5.0, 5.0)));
//!
//! let hits = find_entity_intersections(&a, &b);
//! assert_eq!(hits.len(), 1);
//!
//! // 点击左半段，保留右半段
//! let pieces = trim_line_entity(&a, &Point2::new(2.0, 0.0), &[b]);
//! assert_eq!(pieces.len(), 1);
//! ```

pub mod entity;
pub mod error;
pub mod extend;
pub mod geometry;
pub mod grips;
pub mod hittest;
pub mod intersection;
pub mod math;
pub mod properties;
pub mod snap;
pub mod spatial;
pub mod tolerance;
pub mod trim;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::entity::{Entity, EntityId};
    pub use crate::error::{KernelError, Result};
    pub use crate::extend::{extend_arc_entity, extend_entity, extend_line_entity};
    pub use crate::geometry::{
        Arc, Circle, Dimension, DimensionType, Donut, Ellipse, Geometry, Hatch, Line, MText,
        Point, Polyline, Spline, Table, Text, TextAlignment,
    };
    pub use crate::grips::{get_grip_points, get_snap_points, move_grip, GripKind, GripPoint};
    pub use crate::hittest::{
        closest_point_on_entity, closest_point_on_entity_point, does_entity_intersect_box,
        is_entity_in_box, pick_entity, select_in_box, SelectionMode,
    };
    pub use crate::intersection::{
        circle_circle, find_entity_intersections, find_intersections, line_circle, line_line,
        project_point_on_line, segment_contains, IntersectionResult,
    };
    pub use crate::math::{normalize_relative, BoundingBox2, Point2, Point3, Vector2, Vector3};
    pub use crate::properties::{Color, LayerId};
    pub use crate::snap::{SnapMask, SnapMode, SnapPoint, SnapResolver, SnapResult, SnapSettings};
    pub use crate::trim::{trim_arc_entity, trim_circle_entity, trim_entity, trim_line_entity};
}
