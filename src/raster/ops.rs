//! 位图基础操作：裁剪、合成、修剪、描边。
//!
//! 这些函数不做几何合法性校验（由 `Card` / `grid` 负责），
//! 越界矩形会被 `image::imageops::crop_imm` 截到图像范围内。

use image::{Rgba, RgbaImage, imageops};

use super::RasterError;

/// 新建画布的像素上限（RGBA 约 2 GiB）。
pub const MAX_CANVAS_PIXELS: u64 = 500_000_000;

/// 分配 `width x height` 画布之前的像素总数检查。
pub fn check_canvas(width: u32, height: u32) -> Result<(), RasterError> {
    let pixels = u64::from(width) * u64::from(height);
    if pixels > MAX_CANVAS_PIXELS {
        return Err(RasterError::ResourceLimit(format!(
            "画布过大：{}x{}（{} 像素，上限 {} 像素）",
            width, height, pixels, MAX_CANVAS_PIXELS
        )));
    }
    Ok(())
}

/// 像素坐标系下的矩形区域。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// 复制出 `rect` 区域，返回的新位图原点为 `(0, 0)`。
pub fn crop(image: &RgbaImage, rect: Rect) -> RgbaImage {
    imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image()
}

/// 以 alpha 混合方式把 `image` 贴到 `canvas` 的 `(x, y)` 处，超出画布的部分被裁掉。
pub fn composite(canvas: &mut RgbaImage, image: &RgbaImage, x: u32, y: u32) {
    imageops::overlay(canvas, image, i64::from(x), i64::from(y));
}

/// 向外扩展画布 `width` 像素并用 `color` 填充四周。
///
/// 调用方负责保证扩展后的尺寸不溢出且通过 `check_canvas`。
pub fn draw_border(image: &RgbaImage, width: u32, color: Rgba<u8>) -> RgbaImage {
    if width == 0 {
        return image.clone();
    }
    let (w, h) = image.dimensions();
    let mut canvas = RgbaImage::from_pixel(w + 2 * width, h + 2 * width, color);
    imageops::replace(&mut canvas, image, i64::from(width), i64::from(width));
    canvas
}

/// 计算去掉与左上角颜色相近的边缘后剩余内容的包围盒。
///
/// `fuzz` 取值 0–100，表示 RGB 归一化欧氏距离（除以 √3）允许的百分比，
/// alpha 通道差值单独按同一阈值比较。整幅图都与背景相近时返回 `None`。
pub fn trim_bounds(image: &RgbaImage, fuzz: f64) -> Option<Rect> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return None;
    }
    let background = *image.get_pixel(0, 0);
    let threshold = (fuzz.clamp(0.0, 100.0)) / 100.0;

    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if is_similar(pixel, &background, threshold) {
            continue;
        }
        found = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    found.then(|| Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// 模糊修剪；没有可保留内容时原样返回。
pub fn trim(image: &RgbaImage, fuzz: f64) -> RgbaImage {
    match trim_bounds(image, fuzz) {
        Some(rect) => crop(image, rect),
        None => image.clone(),
    }
}

fn is_similar(a: &Rgba<u8>, b: &Rgba<u8>, threshold: f64) -> bool {
    let channel = |i: usize| (f64::from(a.0[i]) - f64::from(b.0[i])) / 255.0;
    let rgb = ((channel(0).powi(2) + channel(1).powi(2) + channel(2).powi(2)) / 3.0).sqrt();
    rgb <= threshold && channel(3).abs() <= threshold
}
