//! 数学基础类型
//!
//! 基于 nalgebra 的二维/三维点与向量别名，以及包围盒和角度工具函数。
//! 内核只在 XY 平面内计算，z 分量随实体原样携带。

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

pub type Point2 = nalgebra::Point2<f64>;
pub type Point3 = nalgebra::Point3<f64>;
pub type Vector2 = nalgebra::Vector2<f64>;
pub type Vector3 = nalgebra::Vector3<f64>;

/// 通用浮点比较容差
pub const EPSILON: f64 = 1e-10;

/// 将二维点提升为指定高程的三维点
#[inline]
pub fn lift(point: Point2, z: f64) -> Point3 {
    Point3::new(point.x, point.y, z)
}

/// 从三维点取 XY 分量
#[inline]
pub fn flat(point: &Point3) -> Point2 {
    Point2::new(point.x, point.y)
}

/// 二维叉积（z 分量）
#[inline]
pub fn cross(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// 点相对于圆心的极角（弧度，范围 (-π, π]）
#[inline]
pub fn angle_of(center: &Point2, point: &Point2) -> f64 {
    (point.y - center.y).atan2(point.x - center.x)
}

/// 圆周上指定角度的点
#[inline]
pub fn point_on_circle(center: &Point2, radius: f64, angle: f64) -> Point2 {
    Point2::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

/// 把角度归一化到 [0, 2π)
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid 在极小负数上可能返回 TAU
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// 把角度归一化为不小于 `reference` 的最小等价角
///
/// 结果落在 `[reference, reference + 2π)` 内。所有需要比较角度的算法
/// （圆弧过滤、修剪、延伸）都通过这里处理跨越 0 的回绕。
pub fn normalize_relative(angle: f64, reference: f64) -> f64 {
    reference + normalize_angle(angle - reference)
}

/// 二维轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    /// 由两个角点创建，自动排序分量
    pub fn new(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// 空包围盒（不包含任何点）
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(&p);
        }
        bbox
    }

    /// 以中心和半宽/半高创建
    pub fn from_center(center: Point2, half_width: f64, half_height: f64) -> Self {
        Self::new(
            Point2::new(center.x - half_width, center.y - half_height),
            Point2::new(center.x + half_width, center.y + half_height),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn expand_to_include(&mut self, point: &Point2) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    pub fn union(&self, other: &BoundingBox2) -> BoundingBox2 {
        let mut result = *self;
        if !other.is_empty() {
            result.expand_to_include(&other.min);
            result.expand_to_include(&other.max);
        }
        result
    }

    /// 向四周扩展指定距离
    pub fn inflate(&self, amount: f64) -> BoundingBox2 {
        BoundingBox2 {
            min: Point2::new(self.min.x - amount, self.min.y - amount),
            max: Point2::new(self.max.x + amount, self.max.y + amount),
        }
    }

    /// 点是否在包围盒内（含边界）
    pub fn contains(&self, point: &Point2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// `other` 是否完全位于包围盒内
    pub fn contains_box(&self, other: &BoundingBox2) -> bool {
        !other.is_empty() && self.contains(&other.min) && self.contains(&other.max)
    }

    pub fn intersects(&self, other: &BoundingBox2) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// 四个角点，逆时针，从左下角开始
    pub fn corners(&self) -> [Point2; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }

    /// 包围盒上离给定点最近的点（点在盒内时返回自身）
    pub fn closest_point(&self, point: &Point2) -> Point2 {
        Point2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_normalize_relative_wraps_forward() {
        let a = normalize_relative(-PI / 2.0, 0.0);
        assert!((a - 1.5 * PI).abs() < EPSILON);

        let b = normalize_relative(0.1, 5.0);
        assert!(b >= 5.0 && b < 5.0 + TAU);
        assert!((b - (0.1 + TAU)).abs() < EPSILON);
    }

    #[test]
    fn test_normalize_angle_range() {
        assert!((normalize_angle(-PI) - PI).abs() < EPSILON);
        assert!(normalize_angle(TAU).abs() < EPSILON);
        assert!(normalize_angle(-1e-18) < TAU);
    }

    #[test]
    fn test_bbox_contains_and_intersects() {
        let a = BoundingBox2::new(Point2::new(10.0, 10.0), Point2::new(0.0, 0.0));
        assert_eq!(a.min, Point2::new(0.0, 0.0));
        assert!(a.contains(&Point2::new(5.0, 10.0)));
        assert!(!a.contains(&Point2::new(5.0, 10.1)));

        let b = BoundingBox2::new(Point2::new(9.0, 9.0), Point2::new(20.0, 20.0));
        assert!(a.intersects(&b));
        assert!(!a.contains_box(&b));
        assert!(a.union(&b).contains_box(&b));
        assert!(!BoundingBox2::empty().intersects(&a));
    }

    #[test]
    fn test_bbox_closest_point() {
        let bbox = BoundingBox2::new(Point2::new(0.0, 0.0), Point2::new(4.0, 4.0));
        assert_eq!(bbox.closest_point(&Point2::new(10.0, 2.0)), Point2::new(4.0, 2.0));
        assert_eq!(bbox.closest_point(&Point2::new(1.0, 1.0)), Point2::new(1.0, 1.0));
    }
}
