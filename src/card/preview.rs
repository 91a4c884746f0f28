//! 预览图缓存。
//!
//! 生成失败时降级为 `Preview::Unavailable`，错误不向上传播。

use bytes::Bytes;
use image::RgbaImage;

use crate::config::PreviewConfig;
use crate::raster::{self, RasterError};

/// 生成失败时展示给用户的占位文字。
pub const UNAVAILABLE: &str = "image not available";

/// `Card::preview` 的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// PNG 编码的预览图。
    Ready(Bytes),
    /// 占位结果。
    Unavailable(&'static str),
}

impl Preview {
    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Ready(bytes) => Some(bytes),
            Self::Unavailable(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CachedPreview {
    pub(crate) bytes: Bytes,
    pub(crate) config: PreviewConfig,
}

/// 按 `max_dimension` 等比缩小后编码为 PNG。
pub(crate) fn render(image: &RgbaImage, config: &PreviewConfig) -> Result<Bytes, RasterError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(RasterError::Encode("空图像无法生成预览".to_string()));
    }

    let longest = width.max(height);
    let encoded = if longest > config.max_dimension {
        let scale = f64::from(config.max_dimension) / f64::from(longest);
        let target_width = ((f64::from(width) * scale).floor() as u32).max(1);
        let target_height = ((f64::from(height) * scale).floor() as u32).max(1);
        let scaled = raster::resize(image, target_width, target_height, config.filter.into());
        raster::encode_png(&scaled)?
    } else {
        raster::encode_png(image)?
    };

    Ok(Bytes::from(encoded))
}
