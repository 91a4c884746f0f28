//! # 卡牌模块
//!
//! ## 设计思路
//!
//! `Card` 独占一张位图、可选的边框状态，以及一份预览图缓存。
//! 所有会改变像素的方法都在方法体内显式置 `dirty = true`，
//! `preview` 只在 `dirty` 时重新编码，否则原样返回缓存。
//!
//! ## 实现思路
//!
//! - 边框不变量：设置了 `border` 时，位图四周 `border.width` 像素就是最近一次画上的边框，
//!   删除边框等价于四边各裁掉 `width` 像素。
//! - `crop` 的 `right` / `bottom` 是“距边缘的距离”，内部按当前尺寸换算为绝对坐标。
//! - 克隆会深拷贝位图，且新卡牌的预览缓存为空。

mod preview;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use image::imageops::FilterType;
use image::{ImageFormat, RgbaImage};

use crate::border::Border;
use crate::config::PreviewConfig;
use crate::deck::Deck;
use crate::error::AppError;
use crate::grid::GridSpec;
use crate::raster::{self, Rect};

use preview::CachedPreview;
pub use preview::{Preview, UNAVAILABLE};

/// 四边裁剪量（像素，距对应边缘的距离）。未指定的边为 0。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Margins {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Margins {
    pub fn new(top: u32, bottom: u32, left: u32, right: u32) -> Self {
        Self { top, bottom, left, right }
    }

    pub fn uniform(width: u32) -> Self {
        Self::new(width, width, width, width)
    }

    /// 按当前尺寸换算出保留区域；宽或高不为正时返回 `InvalidGeometry`。
    pub fn crop_rect(&self, width: u32, height: u32) -> Result<Rect, AppError> {
        let right_abs = width.checked_sub(self.right);
        let bottom_abs = height.checked_sub(self.bottom);
        let new_width = right_abs.and_then(|r| r.checked_sub(self.left));
        let new_height = bottom_abs.and_then(|b| b.checked_sub(self.top));

        match (new_width, new_height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Ok(Rect::new(self.left, self.top, w, h)),
            _ => Err(AppError::geometry(format!(
                "裁剪 {:?} 后 {}x{} 的图像没有剩余内容",
                self, width, height
            ))),
        }
    }
}

impl FromStr for Margins {
    type Err = AppError;

    /// `10`（四边相同）或 `top,bottom,left,right`。
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts = value
            .split(',')
            .map(|part| part.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::UnsupportedFormat(format!("裁剪边距无效 {}: {}", value, e)))?;
        match parts.as_slice() {
            [all] => Ok(Self::uniform(*all)),
            [top, bottom, left, right] => Ok(Self::new(*top, *bottom, *left, *right)),
            _ => Err(AppError::UnsupportedFormat(format!(
                "裁剪边距需要 1 个或 4 个数值：{}",
                value
            ))),
        }
    }
}

/// 一张卡牌：位图 + 边框状态 + 预览缓存。
#[derive(Debug)]
pub struct Card {
    image: RgbaImage,
    format: ImageFormat,
    border: Option<Border>,
    dirty: bool,
    preview: Option<CachedPreview>,
    renders: u64,
}

impl Clone for Card {
    fn clone(&self) -> Self {
        Self {
            image: self.image.clone(),
            format: self.format,
            border: self.border.clone(),
            dirty: true,
            preview: None,
            renders: 0,
        }
    }
}

impl Card {
    /// `format` 为保存 / 合并时沿用的编码格式。
    pub fn new(image: RgbaImage, format: ImageFormat) -> Self {
        Self {
            image,
            format,
            border: None,
            dirty: true,
            preview: None,
            renders: 0,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn border(&self) -> Option<&Border> {
        self.border.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 预览图实际编码的次数。
    pub fn preview_renders(&self) -> u64 {
        self.renders
    }

    fn replace_image(&mut self, image: RgbaImage) {
        self.image = image;
        self.dirty = true;
    }

    /// 四边按 `margins` 裁剪。每次都读取当前尺寸，裁剪后原点归零。
    pub fn crop(&mut self, margins: Margins) -> Result<(), AppError> {
        let (width, height) = self.dimensions();
        let rect = margins.crop_rect(width, height)?;
        let cropped = raster::crop(&self.image, rect);
        self.replace_image(cropped);
        Ok(())
    }

    /// 设置边框；已有边框时先删除再画新边框。任何检查失败时卡牌不变。
    pub fn set_border(&mut self, border: Border) -> Result<(), AppError> {
        self.check_border(&border)?;
        let color = border.color.to_rgba()?;
        self.del_border()?;
        let bordered = raster::draw_border(&self.image, border.width, color);
        self.replace_image(bordered);
        self.border = Some(border);
        Ok(())
    }

    /// 换上 `border` 前的检查：颜色可解析、旧边框可删除、新尺寸不溢出且不超过画布上限。
    pub(crate) fn check_border(&self, border: &Border) -> Result<(), AppError> {
        border.color.to_rgba()?;
        self.check_del_border()?;
        let old = self.border.as_ref().map_or(0, |b| b.width);
        let expanded = |side: u32| {
            let content = side.checked_sub(old.checked_mul(2)?)?;
            border.width.checked_mul(2)?.checked_add(content)
        };
        let (width, height) = self.dimensions();
        match (expanded(width), expanded(height)) {
            (Some(w), Some(h)) => Ok(raster::check_canvas(w, h)?),
            _ => Err(AppError::geometry(format!(
                "{}x{} 的卡牌加上 {}px 边框后尺寸超出范围",
                width, height, border.width
            ))),
        }
    }

    /// 删除边框前的检查：当前尺寸仍容得下记录的边框宽度。
    pub(crate) fn check_del_border(&self) -> Result<(), AppError> {
        if let Some(border) = &self.border {
            let (width, height) = self.dimensions();
            Margins::uniform(border.width).crop_rect(width, height)?;
        }
        Ok(())
    }

    /// 删除边框；没有边框时什么也不做。
    pub fn del_border(&mut self) -> Result<(), AppError> {
        let Some(width) = self.border.as_ref().map(|b| b.width) else {
            return Ok(());
        };
        self.crop(Margins::uniform(width))?;
        self.border = None;
        self.dirty = true;
        Ok(())
    }

    /// 模糊修剪与左上角颜色相近的边缘，`fuzz` 取值 0–100。
    pub fn trim(&mut self, fuzz: f64) {
        let trimmed = raster::trim(&self.image, fuzz);
        self.replace_image(trimmed);
    }

    /// 精确缩放到 `width x height` 像素。
    pub fn resize(&mut self, width: u32, height: u32, filter: FilterType) {
        let resized = raster::resize(&self.image, width, height, filter);
        self.replace_image(resized);
    }

    /// 圆角（透明蒙版）尚未实现，目前只标记预览需要刷新。
    pub fn round_corners(&mut self) {
        log::debug!("round_corners 尚未实现，位图保持不变");
        self.dirty = true;
    }

    /// 按网格切分为新的牌组，每个单元成为一张独立卡牌（不带边框）。
    pub fn split(&self, grid: &GridSpec) -> Result<Deck, AppError> {
        let (width, height) = self.dimensions();
        let cards = grid
            .partition(width, height)?
            .into_iter()
            .map(|rect| Card::new(raster::crop(&self.image, rect), self.format))
            .collect::<Vec<_>>();
        Ok(Deck::from(cards))
    }

    /// 返回预览图；仅在 `dirty` 或预览参数变化时重新编码。
    pub fn preview(&mut self, config: &PreviewConfig) -> Preview {
        if !self.dirty {
            if let Some(cached) = &self.preview {
                if cached.config == *config {
                    return Preview::Ready(cached.bytes.clone());
                }
            }
        }

        match preview::render(&self.image, config) {
            Ok(bytes) => {
                self.renders += 1;
                self.preview = Some(CachedPreview {
                    bytes: bytes.clone(),
                    config: *config,
                });
                self.dirty = false;
                Preview::Ready(bytes)
            }
            Err(err) => {
                log::warn!("预览生成失败，使用占位结果：{}", err);
                self.preview = None;
                Preview::Unavailable(UNAVAILABLE)
            }
        }
    }

    /// 按自身格式编码。
    pub fn encode(&self) -> Result<Vec<u8>, AppError> {
        Ok(raster::encode(&self.image, self.format)?)
    }

    /// 按自身格式保存到 `path`。
    pub fn save_as(&self, path: &Path) -> Result<(), AppError> {
        let bytes = self.encode()?;
        fs::write(path, bytes)?;
        Ok(())
    }
}
