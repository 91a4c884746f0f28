//! 合并：把多张卡牌按网格拼到整张牌页上。
//!
//! 单元尺寸取第一张卡牌的尺寸；其余卡牌应与之同尺寸，超出单元的部分被截掉。
//! 牌数不是 `rows * cols` 的整数倍时按 `JoinPadding` 处理。

use image::RgbaImage;

use super::Deck;
use crate::card::Card;
use crate::config::JoinOptions;
use crate::error::AppError;
use crate::grid::{GridSpec, JoinPadding};
use crate::progress::Progress;
use crate::raster::{self, Rect, parse_color};

impl Deck {
    /// 按 `grid` 合并，结果替换当前内容。空牌组不做任何事。
    pub fn join(
        &mut self,
        grid: &GridSpec,
        options: &JoinOptions,
        progress: &mut dyn Progress,
    ) -> Result<(), AppError> {
        let Some(first) = self.cards.first() else {
            return Ok(());
        };
        let grid = GridSpec::new(grid.rows, grid.cols, grid.separation)?;
        let background = parse_color(&options.background).ok_or_else(|| {
            AppError::UnsupportedFormat(format!("未知背景色：{}", options.background))
        })?;

        let per_sheet = grid.cells();
        let missing = (per_sheet - self.cards.len() % per_sheet) % per_sheet;
        let mut slots: Vec<Option<&Card>> = self.cards.iter().map(Some).collect();
        match options.padding {
            JoinPadding::RepeatFirst => slots.extend(std::iter::repeat_n(Some(first), missing)),
            JoinPadding::Blank => slots.extend(std::iter::repeat_n(None, missing)),
            JoinPadding::Reject if missing > 0 => {
                return Err(AppError::geometry(format!(
                    "{} 张卡牌无法填满 {} 网格（还差 {} 张）",
                    self.cards.len(),
                    grid,
                    missing
                )));
            }
            JoinPadding::Reject => {}
        }

        let (cell_w, cell_h) = first.dimensions();
        let (sheet_w, sheet_h) = grid.sheet_size(cell_w, cell_h)?;
        raster::check_canvas(sheet_w, sheet_h)?;
        let format = first.format();
        let total = slots.len();
        let mut sheets = Vec::with_capacity(total / per_sheet);

        for (sheet_index, chunk) in slots.chunks(per_sheet).enumerate() {
            let mut canvas = RgbaImage::from_pixel(sheet_w, sheet_h, background);
            for (position, slot) in chunk.iter().enumerate() {
                if let Some(card) = slot {
                    let (x, y) = grid.cell_origin(position, cell_w, cell_h)?;
                    paste_clipped(&mut canvas, card, x, y, cell_w, cell_h);
                }
                progress.on_progress(sheet_index * per_sheet + position + 1, total);
            }
            sheets.push(Card::new(canvas, format));
        }

        log::info!(
            "合并完成：{} 张 → {} 页（网格 {}，补齐 {} 张）",
            self.cards.len(),
            sheets.len(),
            grid,
            missing
        );
        self.cards = sheets;
        Ok(())
    }
}

fn paste_clipped(canvas: &mut RgbaImage, card: &Card, x: u32, y: u32, cell_w: u32, cell_h: u32) {
    let (width, height) = card.dimensions();
    if width <= cell_w && height <= cell_h {
        raster::composite(canvas, card.image(), x, y);
        return;
    }
    log::warn!(
        "卡牌尺寸 {}x{} 超出单元 {}x{}，超出部分被截掉",
        width,
        height,
        cell_w,
        cell_h
    );
    let clipped = raster::crop(card.image(), Rect::new(0, 0, width.min(cell_w), height.min(cell_h)));
    raster::composite(canvas, &clipped, x, y);
}
