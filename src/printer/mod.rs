//! # 打印模块
//!
//! ## 设计思路
//!
//! `Printer` 持有一份 `PrintConfig`，负责两件事：
//!
//! 1. **排版规划**（`max_cards`）：给定卡牌与纸张的物理尺寸，算出每页行列数与方向
//! 2. **导出**（`print_images` / `print_grid` / `print_pdf`）：遍历牌组并写出文件
//!
//! ## 子模块
//!
//! - `config`：尺寸预设、方向、导出模式、`PrintConfig`
//! - `layout`：纯函数排版规划与落位公式
//! - `export`：图片 / PDF 写出

mod config;
mod export;
mod layout;

use std::path::PathBuf;

use serde::Serialize;

use crate::deck::Deck;
use crate::error::AppError;
use crate::progress::Progress;

pub use config::{CardSize, ExportMode, Orientation, PaperSize, PhysicalSize, PrintConfig};
pub use layout::{CardSlot, Layout, plan, plan_fixed};

/// 一次导出的结果。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    pub mode: ExportMode,
    pub cards: usize,
    /// PDF 页数；`images` 模式为 0。
    pub pages: usize,
    /// 写出的文件。
    pub files: Vec<PathBuf>,
    /// `pdf` 模式使用的排版。
    pub layout: Option<Layout>,
}

#[derive(Debug, Clone, Default)]
pub struct Printer {
    config: PrintConfig,
}

impl Printer {
    pub fn new(config: PrintConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PrintConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PrintConfig) {
        self.config = config;
    }

    /// 当前配置下的排版。`lock_orientation` 时不比较方向。
    pub fn max_cards(&self) -> Result<Layout, AppError> {
        let card = self.config.card_size.size();
        let paper = self.config.paper_size.size();
        if self.config.lock_orientation {
            plan_fixed(card, paper, self.config.orientation)
        } else {
            plan(card, paper)
        }
    }

    /// 第 `index` 张卡牌在 `layout` 中的页码与行列。
    pub fn slot(index: usize, layout: &Layout) -> Result<CardSlot, AppError> {
        layout.slot(index)
    }

    /// 按模式导出。
    pub fn export(
        &self,
        mode: ExportMode,
        deck: &Deck,
        progress: &mut dyn Progress,
    ) -> Result<ExportSummary, AppError> {
        match mode {
            ExportMode::Images => self.print_images(deck, progress),
            ExportMode::Grid => self.print_grid(deck, progress),
            ExportMode::Pdf => self.print_pdf(deck, progress),
        }
    }

    fn empty(&self, mode: ExportMode) -> ExportSummary {
        log::warn!("牌组为空，跳过 {} 导出", mode);
        ExportSummary {
            mode,
            cards: 0,
            pages: 0,
            files: Vec::new(),
            layout: None,
        }
    }

    /// 每张卡牌写成 `{print_path}{序号}.{扩展名}`。
    pub fn print_images(&self, deck: &Deck, progress: &mut dyn Progress) -> Result<ExportSummary, AppError> {
        let files = export::write_images(deck, &self.config.print_path, progress)?;
        log::info!("✅ 已导出 {} 张图片（前缀 {}）", files.len(), self.config.print_path.display());
        Ok(ExportSummary {
            mode: ExportMode::Images,
            cards: files.len(),
            pages: 0,
            files,
            layout: None,
        })
    }

    /// PDF，每页一张卡牌。
    pub fn print_grid(&self, deck: &Deck, progress: &mut dyn Progress) -> Result<ExportSummary, AppError> {
        if deck.is_empty() {
            return Ok(self.empty(ExportMode::Grid));
        }
        let pages = export::write_grid(deck, &self.config, progress)?;
        log::info!("✅ 已导出 {}（{} 页，每页一张）", self.config.print_path.display(), pages);
        Ok(ExportSummary {
            mode: ExportMode::Grid,
            cards: deck.len(),
            pages,
            files: vec![self.config.print_path.clone()],
            layout: None,
        })
    }

    /// PDF，按排版平铺。
    pub fn print_pdf(&self, deck: &Deck, progress: &mut dyn Progress) -> Result<ExportSummary, AppError> {
        let layout = self.max_cards()?;
        if layout.max_cards == 0 {
            return Err(AppError::geometry(format!(
                "{} 卡牌放不进 {} 纸张",
                self.config.card_size, self.config.paper_size
            )));
        }
        if deck.is_empty() {
            return Ok(self.empty(ExportMode::Pdf));
        }

        let pages = export::write_tiled(deck, &layout, &self.config, progress)?;
        log::info!(
            "✅ 已导出 {}：{} 张卡牌，{} 页（{} {}x{}）",
            self.config.print_path.display(),
            deck.len(),
            pages,
            layout.orientation,
            layout.horizontal_count,
            layout.vertical_count
        );
        Ok(ExportSummary {
            mode: ExportMode::Pdf,
            cards: deck.len(),
            pages,
            files: vec![self.config.print_path.clone()],
            layout: Some(layout),
        })
    }
}
