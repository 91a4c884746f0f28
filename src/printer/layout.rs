//! 排版规划：一页纸上能放多少张卡牌。
//!
//! ## 实现思路
//!
//! 网格对齐的贪心摆放，不旋转单张卡牌：
//!
//! - `horizontal_count = floor(纸宽 / 卡宽)`，`vertical_count = floor(纸高 / 卡高)`
//! - 余量平分到两侧：`margin = (纸边 - count * 卡边) / 2`
//! - 纵向与横向（纸张宽高互换）各算一次，取 `max_cards` 严格更大的；相等时取纵向

use serde::Serialize;

use super::config::{Orientation, PhysicalSize};
use crate::error::AppError;

/// 浮点除法的容差，避免 `7.0 / 3.5` 之类算出 1.9999…
const EPSILON: f64 = 1e-9;

/// 一页纸的排版结果。尺寸单位为英寸。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Layout {
    pub orientation: Orientation,
    /// 按方向摆好的纸张尺寸。
    pub paper: PhysicalSize,
    pub card: PhysicalSize,
    pub horizontal_count: u32,
    pub vertical_count: u32,
    pub max_cards: u32,
    pub margin_horizontal: f64,
    pub margin_vertical: f64,
}

/// 卡牌在输出中的位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CardSlot {
    /// 从 0 开始的页码。
    pub page: usize,
    pub col: u32,
    pub row: u32,
}

fn fit(paper: f64, card: f64) -> u32 {
    (paper / card + EPSILON).floor().max(0.0) as u32
}

fn check(card: PhysicalSize, paper: PhysicalSize) -> Result<(), AppError> {
    let positive = |s: PhysicalSize| s.width > 0.0 && s.height > 0.0;
    if !positive(card) || !positive(paper) {
        return Err(AppError::geometry(format!(
            "卡牌 {} 与纸张 {} 尺寸必须为正",
            card, paper
        )));
    }
    Ok(())
}

/// 固定方向的排版。`paper` 按纵向给出。
pub fn plan_fixed(
    card: PhysicalSize,
    paper: PhysicalSize,
    orientation: Orientation,
) -> Result<Layout, AppError> {
    check(card, paper)?;
    let paper = orientation.orient(paper);
    let horizontal_count = fit(paper.width, card.width);
    let vertical_count = fit(paper.height, card.height);

    Ok(Layout {
        orientation,
        paper,
        card,
        horizontal_count,
        vertical_count,
        max_cards: horizontal_count * vertical_count,
        margin_horizontal: ((paper.width - f64::from(horizontal_count) * card.width) / 2.0).max(0.0),
        margin_vertical: ((paper.height - f64::from(vertical_count) * card.height) / 2.0).max(0.0),
    })
}

/// 比较两个方向，选出每页卡牌更多的一个。
pub fn plan(card: PhysicalSize, paper: PhysicalSize) -> Result<Layout, AppError> {
    let portrait = plan_fixed(card, paper, Orientation::Portrait)?;
    let landscape = plan_fixed(card, paper, Orientation::Landscape)?;

    log::debug!(
        "排版比较：纵向 {}x{}={}，横向 {}x{}={}",
        portrait.horizontal_count,
        portrait.vertical_count,
        portrait.max_cards,
        landscape.horizontal_count,
        landscape.vertical_count,
        landscape.max_cards
    );

    if landscape.max_cards > portrait.max_cards {
        Ok(landscape)
    } else {
        Ok(portrait)
    }
}

impl Layout {
    /// 第 `index` 张卡牌的页码与行列：
    /// `col = k mod h`，`row = (k mod max) div h`，`page = k div max`。
    pub fn slot(&self, index: usize) -> Result<CardSlot, AppError> {
        if self.max_cards == 0 {
            return Err(AppError::geometry(format!(
                "卡牌 {} 放不进纸张 {}",
                self.card, self.paper
            )));
        }
        let per_page = self.max_cards as usize;
        let per_row = self.horizontal_count as usize;
        Ok(CardSlot {
            page: index / per_page,
            col: (index % per_row) as u32,
            row: ((index % per_page) / per_row) as u32,
        })
    }

    /// 卡牌左上角相对纸张左上角的位置（英寸）。
    pub fn position(&self, slot: CardSlot, centered: bool) -> (f64, f64) {
        let (offset_x, offset_y) = if centered {
            (self.margin_horizontal, self.margin_vertical)
        } else {
            (0.0, 0.0)
        };
        (
            offset_x + f64::from(slot.col) * self.card.width,
            offset_y + f64::from(slot.row) * self.card.height,
        )
    }

    /// 放下 `count` 张卡牌所需页数。
    pub fn pages_for(&self, count: usize) -> usize {
        if self.max_cards == 0 {
            return 0;
        }
        count.div_ceil(self.max_cards as usize)
    }
}
