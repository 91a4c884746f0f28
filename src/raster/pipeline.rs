//! # 解码、编码与缩放流水线
//!
//! ## 设计思路
//!
//! 将“字节 → 位图”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先读取 header 尺寸做检查，再进行完整解码，扫描件过大时可以快速拒绝。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素上限快速拒绝
//! 3. 完整解码并统一转换为 RGBA
//! 4. 缩放优先走 `fast_image_resize`，失败时回退 `image::imageops::resize`

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;

use super::RasterError;

/// 解码阶段的资源上限。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_decoded_pixels: 200_000_000,
        }
    }
}

/// 将原始字节解码为 RGBA 位图，同时返回源编码格式。
pub fn decode(bytes: &[u8], limits: &DecodeLimits) -> Result<(RgbaImage, ImageFormat), RasterError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| RasterError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;
    let format = reader
        .format()
        .ok_or_else(|| RasterError::InvalidFormat("不支持的图片格式".to_string()))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| RasterError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))?;
    validate_pixel_limits(limits, width, height)?;

    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| RasterError::Decode(format!("图片解码失败：{}", e)))?;

    log::debug!("图片解码成功 - 格式: {:?} 尺寸: {}x{}", format, width, height);

    Ok((decoded.to_rgba8(), format))
}

fn validate_pixel_limits(limits: &DecodeLimits, width: u32, height: u32) -> Result<(), RasterError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| RasterError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > limits.max_decoded_pixels {
        return Err(RasterError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, limits.max_decoded_pixels
        )));
    }

    Ok(())
}

/// 按目标格式编码位图。
///
/// JPEG / PNM 不支持 alpha 通道，编码前先转换为 RGB。
pub fn encode(image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, RasterError> {
    let dynamic = DynamicImage::ImageRgba8(image.clone());
    let dynamic = match format {
        ImageFormat::Jpeg | ImageFormat::Pnm => DynamicImage::ImageRgb8(dynamic.to_rgb8()),
        _ => dynamic,
    };

    let mut cursor = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut cursor, format)
        .map_err(|e| RasterError::Encode(format!("编码为 {:?} 失败：{}", format, e)))?;
    Ok(cursor.into_inner())
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RasterError> {
    encode(image, ImageFormat::Png)
}

/// 精确缩放到 `target_width x target_height`。
pub fn resize(image: &RgbaImage, target_width: u32, target_height: u32, filter: FilterType) -> RgbaImage {
    let target_width = target_width.max(1);
    let target_height = target_height.max(1);
    if image.dimensions() == (target_width, target_height) {
        return image.clone();
    }

    match resize_with_fast_image_resize(image, target_width, target_height, filter) {
        Ok(resized) => resized,
        Err(err) => {
            log::warn!("fast_image_resize 缩放失败，回退 image::imageops::resize：{}", err);
            image::imageops::resize(image, target_width, target_height, filter)
        }
    }
}

fn resize_with_fast_image_resize(
    image: &RgbaImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<RgbaImage, RasterError> {
    let (src_width, src_height) = image.dimensions();

    let src_image = fr::images::Image::from_vec_u8(
        src_width,
        src_height,
        image.as_raw().clone(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| RasterError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(filter)));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| RasterError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

    RgbaImage::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| RasterError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
}

fn to_fast_filter(filter: FilterType) -> fr::FilterType {
    match filter {
        FilterType::Nearest => fr::FilterType::Box,
        FilterType::Triangle => fr::FilterType::Bilinear,
        FilterType::CatmullRom => fr::FilterType::CatmullRom,
        FilterType::Gaussian => fr::FilterType::Mitchell,
        FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}
