//! 导出管线：逐张遍历牌组，按模式写图片或 PDF。
//!
//! ## 实现思路
//!
//! - `images`：`{前缀}{序号}.{扩展名}`，序号从 1 开始，扩展名取自卡牌自身格式。
//! - `grid`：每页一张卡牌，按 `dpi` 原始尺寸摆放；比纸大时等比缩小。
//! - `pdf`：先规划排版，所有卡牌缩放到物理卡牌尺寸，行优先平铺，满页换页。
//!
//! 导出不是原子的：中途失败时已写出的文件保留在磁盘上，错误照常向上返回。
//! PDF 只在全部页面生成完后一次性写出。

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage, RgbaImage};
use image::imageops::FilterType;
use printpdf::{
    ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Px,
};

use super::config::{PhysicalSize, PrintConfig};
use super::layout::Layout;
use crate::deck::Deck;
use crate::error::AppError;
use crate::progress::Progress;
use crate::raster;

const MM_PER_INCH: f64 = 25.4;
const LAYER_NAME: &str = "Cards";

/// `cards` + 3 + `png` → `cards3.png`
pub(crate) fn numbered_path(base: &Path, number: usize, extension: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(format!("{}.{}", number, extension));
    PathBuf::from(name)
}

fn ensure_parent(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub(crate) fn write_images(
    deck: &Deck,
    base: &Path,
    progress: &mut dyn Progress,
) -> Result<Vec<PathBuf>, AppError> {
    ensure_parent(base)?;
    let total = deck.len();
    let mut written = Vec::with_capacity(total);
    for (index, card) in deck.iter().enumerate() {
        let extension = card.format().extensions_str().first().copied().unwrap_or("png");
        let path = numbered_path(base, index + 1, extension);
        card.save_as(&path)?;
        log::debug!("已写出 {}", path.display());
        written.push(path);
        progress.on_progress(index + 1, total);
    }
    Ok(written)
}

/// 组合到白底上，去掉 alpha 通道。
fn flatten(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = f32::from(a) / 255.0;
        let blend = |c: u8| (f32::from(c) * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// 正在生成的 PDF 文档，页面尺寸固定。
struct Sheets {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    paper: PhysicalSize,
    pages: usize,
}

impl Sheets {
    fn new(title: &str, paper: PhysicalSize) -> Self {
        let (width, height) = Self::page_mm(paper);
        let (doc, page, layer) = PdfDocument::new(title, width, height, LAYER_NAME);
        let layer = doc.get_page(page).get_layer(layer);
        Self {
            doc,
            layer,
            paper,
            pages: 1,
        }
    }

    fn page_mm(paper: PhysicalSize) -> (Mm, Mm) {
        (
            Mm((paper.width * MM_PER_INCH) as f32),
            Mm((paper.height * MM_PER_INCH) as f32),
        )
    }

    fn next_page(&mut self) {
        let (width, height) = Self::page_mm(self.paper);
        self.pages += 1;
        let (page, layer) = self.doc.add_page(width, height, format!("{} {}", LAYER_NAME, self.pages));
        self.layer = self.doc.get_page(page).get_layer(layer);
    }

    /// 左上角放在距纸张左上角 `(left, top)` 英寸处，按 `dpi` 换算物理尺寸。
    fn place(&self, image: &RgbaImage, left: f64, top: f64, dpi: u32) {
        let height_in = f64::from(image.height()) / f64::from(dpi);
        let bottom = self.paper.height - top - height_in;
        let rgb = flatten(image);

        let xobject = Image::from(ImageXObject {
            width: Px(rgb.width() as usize),
            height: Px(rgb.height() as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: rgb.into_raw(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });
        xobject.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm((left * MM_PER_INCH) as f32)),
                translate_y: Some(Mm((bottom * MM_PER_INCH) as f32)),
                dpi: Some(dpi as f32),
                ..Default::default()
            },
        );
    }

    fn save(self, path: &Path) -> Result<usize, AppError> {
        ensure_parent(path)?;
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.doc
            .save(&mut writer)
            .map_err(|e| AppError::Pdf(e.to_string()))?;
        Ok(self.pages)
    }
}

/// 在不超过 `max` 的前提下等比缩小，返回新尺寸；已经放得下时返回 `None`。
fn shrink_to_fit(width: u32, height: u32, max: (u32, u32)) -> Option<(u32, u32)> {
    if width <= max.0 && height <= max.1 {
        return None;
    }
    let scale = (f64::from(max.0) / f64::from(width)).min(f64::from(max.1) / f64::from(height));
    Some((
        ((f64::from(width) * scale).floor() as u32).max(1),
        ((f64::from(height) * scale).floor() as u32).max(1),
    ))
}

/// 原始尺寸（像素 / dpi）的图像在纸上的左上角，单位英寸；不居中时贴左上角。
fn page_offset(pixels: (u32, u32), paper: PhysicalSize, dpi: u32, centered: bool) -> (f64, f64) {
    if !centered {
        return (0.0, 0.0);
    }
    let dpi = f64::from(dpi);
    (
        ((paper.width - f64::from(pixels.0) / dpi) / 2.0).max(0.0),
        ((paper.height - f64::from(pixels.1) / dpi) / 2.0).max(0.0),
    )
}

/// 每页一张卡牌。返回页数。
pub(crate) fn write_grid(
    deck: &Deck,
    config: &PrintConfig,
    progress: &mut dyn Progress,
) -> Result<usize, AppError> {
    let paper = config.orientation.orient(config.paper_size.size());
    let page_px = paper.to_pixels(config.dpi);
    let mut sheets = Sheets::new("Cards", paper);
    let total = deck.len();

    for (index, card) in deck.iter().enumerate() {
        if index > 0 {
            sheets.next_page();
        }
        let (width, height) = card.dimensions();
        let scaled = shrink_to_fit(width, height, page_px).map(|(w, h)| {
            log::debug!("第 {} 张卡牌 {}x{} 超出页面，缩小到 {}x{}", index + 1, width, height, w, h);
            raster::resize(card.image(), w, h, FilterType::Lanczos3)
        });
        let image = scaled.as_ref().unwrap_or(card.image());

        let (left, top) = page_offset(image.dimensions(), paper, config.dpi, config.center_on_page);
        sheets.place(image, left, top, config.dpi);
        progress.on_progress(index + 1, total);
    }

    sheets.save(&config.print_path)
}

/// 按 `layout` 平铺。返回页数。
pub(crate) fn write_tiled(
    deck: &Deck,
    layout: &Layout,
    config: &PrintConfig,
    progress: &mut dyn Progress,
) -> Result<usize, AppError> {
    let (card_w, card_h) = layout.card.to_pixels(config.dpi);
    let mut sheets = Sheets::new("Cards", layout.paper);
    let total = deck.len();
    let expected = layout.pages_for(total);
    log::debug!("平铺 {} 张卡牌，每页 {} 张，共 {} 页", total, layout.max_cards, expected);

    for (index, card) in deck.iter().enumerate() {
        let slot = layout.slot(index)?;
        if index > 0 && slot.col == 0 && slot.row == 0 {
            sheets.next_page();
        }

        let resized;
        let image = if card.dimensions() == (card_w, card_h) {
            card.image()
        } else {
            resized = raster::resize(card.image(), card_w, card_h, FilterType::Lanczos3);
            &resized
        };

        let (left, top) = layout.position(slot, config.center_on_page);
        sheets.place(image, left, top, config.dpi);
        progress.on_progress(index + 1, total);
    }

    debug_assert_eq!(sheets.pages, expected.max(1));
    sheets.save(&config.print_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn numbered_path_appends_index_and_extension() {
        assert_eq!(numbered_path(Path::new("out/card"), 1, "png"), PathBuf::from("out/card1.png"));
        assert_eq!(numbered_path(Path::new("deck_"), 12, "jpg"), PathBuf::from("deck_12.jpg"));
    }

    #[test]
    fn flatten_blends_on_white() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 0, 0]));
        let rgb = flatten(&image);
        assert_eq!(*rgb.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*rgb.get_pixel(1, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn shrink_keeps_aspect() {
        assert_eq!(shrink_to_fit(100, 50, (200, 200)), None);
        assert_eq!(shrink_to_fit(400, 200, (200, 200)), Some((200, 100)));
        assert_eq!(shrink_to_fit(100, 400, (200, 200)), Some((50, 200)));
    }

    #[test]
    fn page_offset_centers_native_size() {
        let letter = PhysicalSize::new(8.5, 11.0);
        // 750x1050 px @ 300 dpi = 2.5 x 3.5 in
        assert_eq!(page_offset((750, 1050), letter, 300, true), (3.0, 3.75));
        assert_eq!(page_offset((750, 1050), letter, 150, true), (1.75, 2.0));
        assert_eq!(page_offset((750, 1050), letter, 300, false), (0.0, 0.0));
    }

    #[test]
    fn oversized_card_is_shrunk_then_placed_at_page_edge() {
        let letter = PhysicalSize::new(8.5, 11.0);
        let page_px = letter.to_pixels(100);
        assert_eq!(page_px, (850, 1100));

        let (w, h) = shrink_to_fit(1700, 1100, page_px).unwrap();
        assert_eq!((w, h), (850, 550));
        assert_eq!(page_offset((w, h), letter, 100, true), (0.0, 2.75));
        assert_eq!(page_offset((2000, 2000), letter, 100, true), (0.0, 0.0));
    }
}
