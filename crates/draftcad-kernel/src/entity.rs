//! 实体标识和元数据
//!
//! 实体 = 唯一ID + 图层 + 颜色 + 可见性 + 几何数据。
//! 内核只读取实体快照，修剪/延伸产生的新实体通过 [`Entity::derive`] 获得新ID。

use crate::error::Result;
use crate::geometry::Geometry;
use crate::math::BoundingBox2;
use crate::properties::{Color, LayerId};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// 全局实体ID生成器
static ENTITY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// 实体唯一标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// 生成新的实体ID
    pub fn new() -> Self {
        Self(ENTITY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// 从指定值创建（用于外部加载的快照）
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// CAD实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// 唯一标识符
    pub id: EntityId,
    /// 所属图层
    pub layer: LayerId,
    /// 显示颜色
    pub color: Color,
    /// 是否可见
    pub visible: bool,
    /// 几何类型和数据
    pub geometry: Geometry,
}

impl Entity {
    /// 创建新实体（新ID、默认图层、可见）
    pub fn new(geometry: impl Into<Geometry>) -> Self {
        Self {
            id: EntityId::new(),
            layer: LayerId::DEFAULT,
            color: Color::default(),
            visible: true,
            geometry: geometry.into(),
        }
    }

    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }

    pub fn with_layer(mut self, layer: LayerId) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// 以新几何和新ID复制实体，其余元数据保持不变
    pub fn derive(&self, geometry: impl Into<Geometry>) -> Self {
        Self {
            id: EntityId::new(),
            layer: self.layer,
            color: self.color,
            visible: self.visible,
            geometry: geometry.into(),
        }
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        self.geometry.bounding_box()
    }

    /// 校验几何不变量
    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Line;
    use crate::math::Point3;

    #[test]
    fn test_entity_ids_are_unique() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
        assert_eq!(EntityId::from_raw(42).raw(), 42);
    }

    #[test]
    fn test_derive_copies_metadata_with_fresh_id() {
        let line = Line::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let source = Entity::new(line.clone())
            .with_layer(LayerId(3))
            .with_color(Color::RED);

        let copy = source.derive(line);
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.layer, LayerId(3));
        assert_eq!(copy.color, Color::RED);
        assert!(copy.visible);
    }
}
