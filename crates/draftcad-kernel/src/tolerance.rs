//! 容差常量
//!
//! 按容差的量纲分组：位置（世界单位）、行列式、参数（线段比例）、角度。
//! 每一处与零比较的地方都使用这里的命名常量。

// ========== 位置 ==========

/// 线段长度平方低于此值视为退化线段（零长度线段不包含任何点）
pub const LENGTH_SQ_EPSILON: f64 = 1e-4;

/// 两点重合判定距离
pub const POINT_EPSILON: f64 = 1e-9;

/// 圆-圆半弦长、线-圆判别式的相切判定
pub const TANGENT_EPSILON: f64 = 1e-4;

// ========== 行列式 ==========

/// 直线求交的行列式绝对值低于此值视为平行
pub const DETERMINANT_EPSILON: f64 = 1e-4;

// ========== 参数 ==========

/// 判断点是否在线段上时参数区间的放宽量：[-tol, 1 + tol]
pub const PARAM_EPSILON: f64 = 1e-9;

/// 线-圆两个根的参数差低于此值时合并为一个（相切）
pub const ROOT_DEDUP_EPSILON: f64 = 1e-4;

/// 修剪时丢弃离端点过近的交点：只保留 t ∈ (MARGIN, 1 - MARGIN)
pub const TRIM_END_MARGIN: f64 = 0.001;

// ========== 角度 ==========

/// 角度范围判定的放宽量（弧度）
pub const ANGLE_EPSILON: f64 = 1e-9;

/// 圆弧修剪时按扫角比例丢弃离端点过近的交点
pub const TRIM_ANGLE_MARGIN: f64 = 0.001;

/// 两个交点角度差低于此值视为同一点（弧度）
pub const ANGLE_DEDUP_EPSILON: f64 = 1e-6;

// ========== 延伸 ==========

/// 直线延伸时构造的辅助射线长度
pub const EXTEND_LENGTH: f64 = 10_000.0;

/// 延伸的最小有效距离；更近的交点视为端点本身已在边界上
pub const EXTEND_MIN_DISTANCE: f64 = 1e-6;
