//! 卡牌边框值类型。

use std::fmt;

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::raster::parse_color;

/// 边框颜色：黑 / 白两个预设，或任意颜色字符串（颜色名、`#RRGGBB` 等）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderColor {
    Black,
    White,
    Custom(String),
}

impl BorderColor {
    pub fn to_rgba(&self) -> Result<Rgba<u8>, AppError> {
        match self {
            Self::Black => Ok(Rgba([0, 0, 0, 255])),
            Self::White => Ok(Rgba([255, 255, 255, 255])),
            Self::Custom(value) => parse_color(value)
                .ok_or_else(|| AppError::UnsupportedFormat(format!("无法识别的颜色：{}", value))),
        }
    }
}

impl From<&str> for BorderColor {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "black" => Self::Black,
            "white" => Self::White,
            _ => Self::Custom(value.trim().to_string()),
        }
    }
}

impl fmt::Display for BorderColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Black => f.write_str("black"),
            Self::White => f.write_str("white"),
            Self::Custom(value) => f.write_str(value),
        }
    }
}

/// 边框：颜色 + 宽度（像素）。四边对称外扩 `width` 像素。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Border {
    pub color: BorderColor,
    pub width: u32,
}

impl Border {
    pub fn new(color: impl Into<BorderColor>, width: u32) -> Self {
        Self {
            color: color.into(),
            width,
        }
    }

    pub fn black(width: u32) -> Self {
        Self::new(BorderColor::Black, width)
    }

    pub fn white(width: u32) -> Self {
        Self::new(BorderColor::White, width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_resolve_without_parsing() {
        assert_eq!(Border::black(4).color.to_rgba().unwrap(), Rgba([0, 0, 0, 255]));
        assert_eq!(Border::white(4).color.to_rgba().unwrap(), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn custom_color_from_str() {
        let border = Border::new("#ff8800", 2);
        assert_eq!(border.color, BorderColor::Custom("#ff8800".into()));
        assert_eq!(border.color.to_rgba().unwrap(), Rgba([0xff, 0x88, 0x00, 255]));
        assert_eq!(Border::new("White", 1).color, BorderColor::White);
    }

    #[test]
    fn css_color_names_and_functions_resolve() {
        assert_eq!(
            Border::new("orange", 3).color.to_rgba().unwrap(),
            Rgba([255, 165, 0, 255])
        );
        assert_eq!(
            Border::new("rgb(0, 128, 255)", 3).color.to_rgba().unwrap(),
            Rgba([0, 128, 255, 255])
        );
    }

    #[test]
    fn unknown_custom_color_is_unsupported() {
        let err = Border::new("nope", 2).color.to_rgba().unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }
}
