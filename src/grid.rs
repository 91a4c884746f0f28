//! 网格切分与合并的纯几何计算。
//!
//! # 设计思路
//!
//! 切分（sheet → cards）与合并（cards → sheet）共用同一个 `GridSpec`：
//! `rows x cols` 个等大单元，单元之间留 `separation` 像素的间隔，外边缘不留间隔。
//! 这里只负责坐标计算，不接触像素，便于单独测试。
//!
//! # 实现思路
//!
//! - 单元尺寸：`cell_w = (W - sep * (cols - 1)) / cols`（整数向下取整），高度同理。
//! - 单元按行优先顺序编号，第 `(i, j)` 个单元左上角为 `(j * (cell_w + sep), i * (cell_h + sep))`。
//! - 任意一维得到非正尺寸即返回 `InvalidGeometry`。

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::raster::Rect;

static GRID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+)\s*[xX×]\s*(\d+)\s*(?:\+\s*(\d+)\s*)?$").expect("grid pattern is valid")
});

/// 网格描述：行数、列数、单元间隔（像素）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: u32,
    pub cols: u32,
    #[serde(default)]
    pub separation: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::single()
    }
}

impl GridSpec {
    pub fn new(rows: u32, cols: u32, separation: u32) -> Result<Self, AppError> {
        let grid = Self { rows, cols, separation };
        grid.validate()?;
        Ok(grid)
    }

    /// 1x1，不切分。
    pub fn single() -> Self {
        Self { rows: 1, cols: 1, separation: 0 }
    }

    pub fn cells(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.rows < 1 || self.cols < 1 {
            return Err(AppError::geometry(format!(
                "网格行列数必须为正：{}x{}",
                self.rows, self.cols
            )));
        }
        Ok(())
    }

    /// 由整张图尺寸推出单元尺寸。
    pub fn cell_size(&self, width: u32, height: u32) -> Result<(u32, u32), AppError> {
        self.validate()?;
        let cell_w = Self::cell_extent(width, self.cols, self.separation);
        let cell_h = Self::cell_extent(height, self.rows, self.separation);
        match (cell_w, cell_h) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Ok((w, h)),
            _ => Err(AppError::geometry(format!(
                "{}x{} 的图像无法按 {}x{}（间隔 {}）切分",
                width, height, self.rows, self.cols, self.separation
            ))),
        }
    }

    fn cell_extent(total: u32, count: u32, separation: u32) -> Option<u32> {
        let gutters = u64::from(separation) * u64::from(count - 1);
        let usable = u64::from(total).checked_sub(gutters)?;
        u32::try_from(usable / u64::from(count)).ok()
    }

    /// 行优先顺序列出所有单元矩形。
    pub fn partition(&self, width: u32, height: u32) -> Result<Vec<Rect>, AppError> {
        let (cell_w, cell_h) = self.cell_size(width, height)?;
        (0..self.cells())
            .map(|index| {
                let (x, y) = self.cell_origin(index, cell_w, cell_h)?;
                Ok(Rect::new(x, y, cell_w, cell_h))
            })
            .collect()
    }

    /// 第 `index` 个单元（行优先）的左上角；坐标超出 `u32` 时返回 `InvalidGeometry`。
    pub fn cell_origin(&self, index: usize, cell_w: u32, cell_h: u32) -> Result<(u32, u32), AppError> {
        let cols = u64::from(self.cols.max(1));
        let index = index as u64;
        let offset = |slot: u64, cell: u32| {
            slot.checked_mul(u64::from(cell) + u64::from(self.separation))
                .and_then(|v| u32::try_from(v).ok())
        };
        match (offset(index % cols, cell_w), offset(index / cols, cell_h)) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(AppError::geometry(format!(
                "网格 {} 中第 {} 个单元的位置超出范围",
                self, index
            ))),
        }
    }

    /// 合并后整张图的尺寸；超出 `u32` 时返回 `InvalidGeometry`。
    pub fn sheet_size(&self, cell_w: u32, cell_h: u32) -> Result<(u32, u32), AppError> {
        let extent = |cell: u32, count: u32| {
            let count = u64::from(count.max(1));
            (u64::from(cell) * count)
                .checked_add(u64::from(self.separation) * (count - 1))
                .and_then(|v| u32::try_from(v).ok())
        };
        match (extent(cell_w, self.cols), extent(cell_h, self.rows)) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(AppError::geometry(format!(
                "{}x{} 的单元按网格 {} 合并后尺寸超出范围",
                cell_w, cell_h, self
            ))),
        }
    }
}

impl FromStr for GridSpec {
    type Err = AppError;

    /// 解析 `3x3` 或 `3x3+10`（间隔 10 像素）。
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let caps = GRID_PATTERN
            .captures(value)
            .ok_or_else(|| AppError::UnsupportedFormat(format!("无法解析网格：{}", value)))?;
        let number = |i: usize| -> Result<u32, AppError> {
            caps.get(i)
                .map_or(Ok(0), |m| m.as_str().parse::<u32>())
                .map_err(|e| AppError::UnsupportedFormat(format!("网格数值无效：{}", e)))
        };
        Self::new(number(1)?, number(2)?, number(3)?)
    }
}

impl fmt::Display for GridSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)?;
        if self.separation > 0 {
            write!(f, "+{}", self.separation)?;
        }
        Ok(())
    }
}

/// 合并时牌数不是 `rows * cols` 整数倍的补齐策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JoinPadding {
    /// 重复第一张牌补齐。
    #[default]
    RepeatFirst,
    /// 留空单元（只有背景色）。
    Blank,
    /// 拒绝合并。
    Reject,
}

impl FromStr for JoinPadding {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "repeat-first" | "repeat" => Ok(Self::RepeatFirst),
            "blank" => Ok(Self::Blank),
            "reject" => Ok(Self::Reject),
            other => Err(AppError::UnsupportedFormat(format!(
                "未知补齐策略：{}（可选：repeat-first / blank / reject）",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_without_separation() {
        let grid = GridSpec::new(2, 3, 0).unwrap();
        let rects = grid.partition(300, 200).unwrap();

        assert_eq!(rects.len(), 6);
        assert_eq!(rects[0], Rect::new(0, 0, 100, 100));
        assert_eq!(rects[2], Rect::new(200, 0, 100, 100));
        assert_eq!(rects[3], Rect::new(0, 100, 100, 100));
        assert_eq!(rects[5], Rect::new(200, 100, 100, 100));
    }

    #[test]
    fn partition_with_separation_skips_gutters() {
        // 3 列 * 100 + 2 个 10px 间隔 = 320
        let grid = GridSpec::new(1, 3, 10).unwrap();
        let rects = grid.partition(320, 50).unwrap();

        assert_eq!(rects[0], Rect::new(0, 0, 100, 50));
        assert_eq!(rects[1], Rect::new(110, 0, 100, 50));
        assert_eq!(rects[2], Rect::new(220, 0, 100, 50));
    }

    #[test]
    fn partition_floors_uneven_sizes() {
        let grid = GridSpec::new(1, 3, 0).unwrap();
        let (w, h) = grid.cell_size(101, 10).unwrap();
        assert_eq!((w, h), (33, 10));
    }

    #[test]
    fn zero_rows_or_cols_is_invalid() {
        assert!(matches!(GridSpec::new(0, 3, 0), Err(AppError::InvalidGeometry(_))));
        let raw = GridSpec { rows: 2, cols: 0, separation: 0 };
        assert!(matches!(raw.partition(10, 10), Err(AppError::InvalidGeometry(_))));
    }

    #[test]
    fn separation_larger_than_image_is_invalid() {
        let grid = GridSpec::new(1, 4, 50).unwrap();
        assert!(matches!(grid.partition(100, 100), Err(AppError::InvalidGeometry(_))));
    }

    #[test]
    fn more_cells_than_pixels_is_invalid() {
        let grid = GridSpec::new(1, 20, 0).unwrap();
        assert!(matches!(grid.partition(10, 10), Err(AppError::InvalidGeometry(_))));
    }

    #[test]
    fn sheet_size_inverts_cell_size() {
        let grid = GridSpec::new(3, 2, 7).unwrap();
        let (w, h) = grid.sheet_size(60, 90).unwrap();
        assert_eq!((w, h), (127, 284));
        assert_eq!(grid.cell_size(w, h).unwrap(), (60, 90));
    }

    #[test]
    fn sheet_size_overflow_is_invalid() {
        let grid = GridSpec::new(1, 2, u32::MAX - 5).unwrap();
        assert!(matches!(grid.sheet_size(10, 10), Err(AppError::InvalidGeometry(_))));
        assert!(matches!(grid.cell_origin(1, 10, 10), Err(AppError::InvalidGeometry(_))));
        assert_eq!(grid.cell_origin(0, 10, 10).unwrap(), (0, 0));

        let wide = GridSpec::new(1, 3, 0).unwrap();
        assert!(matches!(wide.sheet_size(u32::MAX / 2, 1), Err(AppError::InvalidGeometry(_))));
    }

    #[test]
    fn parses_grid_strings() {
        assert_eq!("3x3".parse::<GridSpec>().unwrap(), GridSpec::new(3, 3, 0).unwrap());
        assert_eq!(" 2 X 4 + 12 ".parse::<GridSpec>().unwrap(), GridSpec::new(2, 4, 12).unwrap());
        assert!(matches!("0x3".parse::<GridSpec>(), Err(AppError::InvalidGeometry(_))));
        assert!(matches!("three".parse::<GridSpec>(), Err(AppError::UnsupportedFormat(_))));
        assert_eq!(GridSpec::new(2, 4, 12).unwrap().to_string(), "2x4+12");
    }

    #[test]
    fn parses_join_padding() {
        assert_eq!("repeat-first".parse::<JoinPadding>().unwrap(), JoinPadding::RepeatFirst);
        assert_eq!("Blank".parse::<JoinPadding>().unwrap(), JoinPadding::Blank);
        assert!("pad".parse::<JoinPadding>().is_err());
    }
}
