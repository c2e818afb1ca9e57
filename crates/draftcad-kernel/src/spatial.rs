//! 空间索引
//!
//! 基于均匀网格的包围盒索引，用于捕捉和拾取前的候选裁剪。
//! 条目以实体在快照中的序号存储，查询结果按序号升序返回，
//! 从而保留"列表靠前者优先"的平局规则。

use crate::math::{BoundingBox2, Point2};
use std::collections::{HashMap, HashSet};

/// 简单的空间索引（基于网格）
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    /// 网格单元大小
    cell_size: f64,

    /// 网格映射：网格坐标 -> 实体序号列表
    grid: HashMap<(i64, i64), Vec<usize>>,

    /// 实体的包围盒缓存
    bboxes: HashMap<usize, BoundingBox2>,
}

impl SpatialIndex {
    /// 单个包围盒最多覆盖的网格数，超出的实体放入溢出列表
    const MAX_CELLS_PER_ENTRY: i64 = 4096;

    /// 创建新的空间索引
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: cell_size.max(f64::MIN_POSITIVE),
            grid: HashMap::new(),
            bboxes: HashMap::new(),
        }
    }

    /// 使用默认网格大小创建
    pub fn default_grid() -> Self {
        Self::new(100.0)
    }

    /// 按一组包围盒批量建立索引，网格大小取平均包围盒尺寸
    pub fn build(bboxes: impl IntoIterator<Item = BoundingBox2>) -> Self {
        let bboxes: Vec<BoundingBox2> = bboxes.into_iter().collect();
        let sizes: Vec<f64> = bboxes
            .iter()
            .filter(|b| !b.is_empty())
            .map(|b| b.width().max(b.height()))
            .filter(|s| *s > 0.0)
            .collect();
        let cell_size = if sizes.is_empty() {
            100.0
        } else {
            (sizes.iter().sum::<f64>() / sizes.len() as f64).max(1.0)
        };

        let mut index = Self::new(cell_size);
        for (i, bbox) in bboxes.into_iter().enumerate() {
            index.insert(i, bbox);
        }
        index
    }

    /// 将世界坐标转换为网格坐标
    fn to_grid_coord(&self, x: f64, y: f64) -> (i64, i64) {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }

    /// 获取包围盒覆盖的所有网格单元；覆盖过多时返回 None
    fn cells_for_bbox(&self, bbox: &BoundingBox2) -> Option<Vec<(i64, i64)>> {
        let (min_gx, min_gy) = self.to_grid_coord(bbox.min.x, bbox.min.y);
        let (max_gx, max_gy) = self.to_grid_coord(bbox.max.x, bbox.max.y);

        let span_x = max_gx.saturating_sub(min_gx).saturating_add(1);
        let span_y = max_gy.saturating_sub(min_gy).saturating_add(1);
        let span = span_x.saturating_mul(span_y);
        if span > Self::MAX_CELLS_PER_ENTRY {
            return None;
        }

        let mut cells = Vec::new();
        for gx in min_gx..=max_gx {
            for gy in min_gy..=max_gy {
                cells.push((gx, gy));
            }
        }
        Some(cells)
    }

    /// 溢出列表的键（超大实体统一放这里，每次查询都会检查）
    const OVERFLOW: (i64, i64) = (i64::MIN, i64::MIN);

    /// 插入实体
    pub fn insert(&mut self, index: usize, bbox: BoundingBox2) {
        self.remove(index);
        if bbox.is_empty() {
            return;
        }

        match self.cells_for_bbox(&bbox) {
            Some(cells) => {
                for cell in cells {
                    self.grid.entry(cell).or_default().push(index);
                }
            }
            None => self.grid.entry(Self::OVERFLOW).or_default().push(index),
        }

        self.bboxes.insert(index, bbox);
    }

    /// 移除实体
    pub fn remove(&mut self, index: usize) -> bool {
        let Some(bbox) = self.bboxes.remove(&index) else {
            return false;
        };
        let cells = self
            .cells_for_bbox(&bbox)
            .unwrap_or_else(|| vec![Self::OVERFLOW]);
        for cell in cells {
            if let Some(entries) = self.grid.get_mut(&cell) {
                entries.retain(|e| *e != index);
            }
        }
        true
    }

    /// 范围查询：查找与指定矩形相交的所有实体，按序号升序
    pub fn query_rect(&self, rect: &BoundingBox2) -> Vec<usize> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        let mut visit = |entries: &Vec<usize>| {
            for index in entries {
                if seen.insert(*index) {
                    if let Some(bbox) = self.bboxes.get(index) {
                        if bbox.intersects(rect) {
                            result.push(*index);
                        }
                    }
                }
            }
        };

        if let Some(overflow) = self.grid.get(&Self::OVERFLOW) {
            visit(overflow);
        }

        match self.cells_for_bbox(rect) {
            Some(cells) => {
                for cell in cells {
                    if let Some(entries) = self.grid.get(&cell) {
                        visit(entries);
                    }
                }
            }
            // 查询范围过大时退化为全表扫描
            None => {
                for entries in self.grid.values() {
                    visit(entries);
                }
            }
        }

        result.sort_unstable();
        result
    }

    /// 以点为中心、指定半径的方形范围查询
    pub fn query_around(&self, point: &Point2, radius: f64) -> Vec<usize> {
        self.query_rect(&BoundingBox2::from_center(*point, radius, radius))
    }

    /// 清空索引
    pub fn clear(&mut self) {
        self.grid.clear();
        self.bboxes.clear();
    }

    /// 获取实体数量
    pub fn len(&self) -> usize {
        self.bboxes.len()
    }

    /// 检查是否为空
    pub fn is_empty(&self) -> bool {
        self.bboxes.is_empty()
    }

    /// 获取实体的包围盒
    pub fn get_bbox(&self, index: usize) -> Option<&BoundingBox2> {
        self.bboxes.get(&index)
    }
}
