//! 打印配置：纸张 / 卡牌尺寸预设、方向与导出模式。
//!
//! 尺寸一律以英寸表示。预设名不区分大小写，且只看第一个空白前的单词，
//! 所以界面上显示的 `"Poker (2.5x3.5)"` 也能选中 Poker。
//! `WxH`（如 `2.5x3.5`）表示自定义尺寸。

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

static CUSTOM_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*[xX×]\s*(\d+(?:\.\d+)?)\s*$").expect("size pattern is valid")
});

/// 物理尺寸（英寸）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSize {
    pub width: f64,
    pub height: f64,
}

impl PhysicalSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// 宽高互换。
    pub fn swapped(self) -> Self {
        Self::new(self.height, self.width)
    }

    /// 在 `dpi` 分辨率下对应的像素尺寸（四舍五入）。
    pub fn to_pixels(self, dpi: u32) -> (u32, u32) {
        let dpi = f64::from(dpi);
        (
            (self.width * dpi).round().max(1.0) as u32,
            (self.height * dpi).round().max(1.0) as u32,
        )
    }

    fn is_positive(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

impl fmt::Display for PhysicalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

fn parse_custom(key: &str) -> Option<Result<PhysicalSize, AppError>> {
    let caps = CUSTOM_SIZE.captures(key)?;
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<f64>().ok());
    let size = match (number(1), number(2)) {
        (Some(width), Some(height)) => PhysicalSize::new(width, height),
        _ => return Some(Err(AppError::UnsupportedFormat(format!("尺寸数值无效：{}", key)))),
    };
    if !size.is_positive() {
        return Some(Err(AppError::geometry(format!("尺寸必须为正：{}", key))));
    }
    Some(Ok(size))
}

fn first_word(key: &str) -> String {
    key.split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// 纸张方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }

    /// 把纵向给出的纸张尺寸转到当前方向。
    pub fn orient(self, paper: PhysicalSize) -> PhysicalSize {
        match self {
            Self::Portrait => paper,
            Self::Landscape => paper.swapped(),
        }
    }
}

impl FromStr for Orientation {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match first_word(value).as_str() {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            _ => Err(AppError::UnsupportedFormat(format!("未知方向：{}", value))),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 卡牌尺寸预设。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CardSize {
    Jumbo,
    Tarot,
    Square,
    Poker,
    Bridge,
    Biz,
    Mini,
    Micro,
    Custom(PhysicalSize),
}

impl CardSize {
    pub const PRESETS: [CardSize; 8] = [
        Self::Jumbo,
        Self::Tarot,
        Self::Square,
        Self::Poker,
        Self::Bridge,
        Self::Biz,
        Self::Mini,
        Self::Micro,
    ];

    pub fn size(self) -> PhysicalSize {
        match self {
            Self::Jumbo => PhysicalSize::new(3.5, 5.5),
            Self::Tarot => PhysicalSize::new(2.75, 4.75),
            Self::Square => PhysicalSize::new(3.5, 3.5),
            Self::Poker => PhysicalSize::new(2.5, 3.5),
            Self::Bridge => PhysicalSize::new(2.25, 3.5),
            Self::Biz => PhysicalSize::new(2.0, 3.5),
            Self::Mini => PhysicalSize::new(1.75, 2.5),
            Self::Micro => PhysicalSize::new(1.25, 1.75),
            Self::Custom(size) => size,
        }
    }

    fn name(self) -> Option<&'static str> {
        match self {
            Self::Jumbo => Some("Jumbo"),
            Self::Tarot => Some("Tarot"),
            Self::Square => Some("Square"),
            Self::Poker => Some("Poker"),
            Self::Bridge => Some("Bridge"),
            Self::Biz => Some("Biz"),
            Self::Mini => Some("Mini"),
            Self::Micro => Some("Micro"),
            Self::Custom(_) => None,
        }
    }
}

impl FromStr for CardSize {
    type Err = AppError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        if let Some(custom) = parse_custom(key) {
            return custom.map(Self::Custom);
        }
        let word = first_word(key);
        Self::PRESETS
            .into_iter()
            .find(|preset| preset.name().is_some_and(|name| name.eq_ignore_ascii_case(&word)))
            .ok_or_else(|| AppError::UnsupportedFormat(format!("未知卡牌尺寸：{}", key)))
    }
}

impl fmt::Display for CardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.size()),
        }
    }
}

impl TryFrom<String> for CardSize {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CardSize> for String {
    fn from(size: CardSize) -> Self {
        size.to_string()
    }
}

/// 纸张尺寸预设（纵向给出）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaperSize {
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    Letter,
    Legal,
    Custom(PhysicalSize),
}

impl PaperSize {
    pub const PRESETS: [PaperSize; 9] = [
        Self::A0,
        Self::A1,
        Self::A2,
        Self::A3,
        Self::A4,
        Self::A5,
        Self::A6,
        Self::Letter,
        Self::Legal,
    ];

    pub fn size(self) -> PhysicalSize {
        match self {
            Self::A0 => PhysicalSize::new(33.1, 46.8),
            Self::A1 => PhysicalSize::new(23.4, 33.1),
            Self::A2 => PhysicalSize::new(16.5, 23.4),
            Self::A3 => PhysicalSize::new(11.7, 16.5),
            Self::A4 => PhysicalSize::new(8.3, 11.7),
            Self::A5 => PhysicalSize::new(5.8, 8.3),
            Self::A6 => PhysicalSize::new(4.1, 5.8),
            Self::Letter => PhysicalSize::new(8.5, 11.0),
            Self::Legal => PhysicalSize::new(8.5, 14.0),
            Self::Custom(size) => size,
        }
    }

    fn name(self) -> Option<&'static str> {
        match self {
            Self::A0 => Some("A0"),
            Self::A1 => Some("A1"),
            Self::A2 => Some("A2"),
            Self::A3 => Some("A3"),
            Self::A4 => Some("A4"),
            Self::A5 => Some("A5"),
            Self::A6 => Some("A6"),
            Self::Letter => Some("Letter"),
            Self::Legal => Some("Legal"),
            Self::Custom(_) => None,
        }
    }
}

impl FromStr for PaperSize {
    type Err = AppError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        if let Some(custom) = parse_custom(key) {
            return custom.map(Self::Custom);
        }
        let word = first_word(key);
        Self::PRESETS
            .into_iter()
            .find(|preset| preset.name().is_some_and(|name| name.eq_ignore_ascii_case(&word)))
            .ok_or_else(|| AppError::UnsupportedFormat(format!("未知纸张尺寸：{}", key)))
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.size()),
        }
    }
}

impl TryFrom<String> for PaperSize {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PaperSize> for String {
    fn from(size: PaperSize) -> Self {
        size.to_string()
    }
}

/// 导出模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// 每张卡牌单独写成图片文件
    Images,
    /// PDF，每页一张卡牌（原始尺寸）
    Grid,
    /// PDF，按纸张排版平铺
    Pdf,
}

impl ExportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Grid => "grid",
            Self::Pdf => "pdf",
        }
    }
}

impl FromStr for ExportMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match first_word(value).as_str() {
            "images" | "image" => Ok(Self::Images),
            "grid" => Ok(Self::Grid),
            "pdf" | "tiled" => Ok(Self::Pdf),
            _ => Err(AppError::UnsupportedFormat(format!(
                "未知导出模式：{}（可选：images / grid / pdf）",
                value
            ))),
        }
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 打印 / 导出配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    pub orientation: Orientation,
    pub card_size: CardSize,
    pub paper_size: PaperSize,
    /// PDF 输出路径；`images` 模式下作为文件名前缀。
    pub print_path: PathBuf,
    /// 输出设备分辨率。
    pub dpi: u32,
    /// 固定使用 `orientation`，不让排版自动选择方向。
    pub lock_orientation: bool,
    /// 平铺时按余量居中。
    pub center_on_page: bool,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Portrait,
            card_size: CardSize::Poker,
            paper_size: PaperSize::A4,
            print_path: PathBuf::from("cards.pdf"),
            dpi: 300,
            lock_orientation: false,
            center_on_page: true,
        }
    }
}

impl PrintConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(36..=1200).contains(&self.dpi) {
            return Err(AppError::Settings("print.dpi 必须在 36~1200 之间".to_string()));
        }
        if self.print_path.as_os_str().is_empty() {
            return Err(AppError::Settings("print.print_path 不能为空".to_string()));
        }
        if !self.card_size.size().is_positive() || !self.paper_size.size().is_positive() {
            return Err(AppError::Settings("卡牌与纸张尺寸必须为正".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_parse_from_first_word() {
        assert_eq!("Poker (2.5x3.5)".parse::<CardSize>().unwrap(), CardSize::Poker);
        assert_eq!("  tarot".parse::<CardSize>().unwrap(), CardSize::Tarot);
        assert_eq!("a4 (8.3 x 11.7)".parse::<PaperSize>().unwrap(), PaperSize::A4);
        assert_eq!("LETTER".parse::<PaperSize>().unwrap(), PaperSize::Letter);
    }

    #[test]
    fn custom_sizes_parse() {
        assert_eq!(
            "2.5x3.5".parse::<CardSize>().unwrap(),
            CardSize::Custom(PhysicalSize::new(2.5, 3.5))
        );
        assert_eq!(
            "10 x 12".parse::<PaperSize>().unwrap().size(),
            PhysicalSize::new(10.0, 12.0)
        );
        assert!(matches!(
            "0x3".parse::<CardSize>(),
            Err(AppError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn unknown_keys_are_unsupported() {
        assert!(matches!("Huge".parse::<CardSize>(), Err(AppError::UnsupportedFormat(_))));
        assert!(matches!("B5".parse::<PaperSize>(), Err(AppError::UnsupportedFormat(_))));
        assert!(matches!("".parse::<PaperSize>(), Err(AppError::UnsupportedFormat(_))));
        assert!(matches!("fax".parse::<ExportMode>(), Err(AppError::UnsupportedFormat(_))));
    }

    #[test]
    fn preset_table_matches_inches() {
        assert_eq!(CardSize::Jumbo.size(), PhysicalSize::new(3.5, 5.5));
        assert_eq!(CardSize::Micro.size(), PhysicalSize::new(1.25, 1.75));
        assert_eq!(PaperSize::A0.size(), PhysicalSize::new(33.1, 46.8));
        assert_eq!(PaperSize::A6.size(), PhysicalSize::new(4.1, 5.8));
    }

    #[test]
    fn sizes_serialize_as_names() {
        let config = PrintConfig {
            card_size: CardSize::Custom(PhysicalSize::new(2.0, 3.0)),
            ..PrintConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"paper_size\":\"A4\""));
        assert!(json.contains("\"card_size\":\"2x3\""));

        let back: PrintConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn pixels_follow_dpi() {
        assert_eq!(CardSize::Poker.size().to_pixels(300), (750, 1050));
        assert_eq!(Orientation::Landscape.orient(PaperSize::A4.size()), PhysicalSize::new(11.7, 8.3));
    }

    #[test]
    fn validate_rejects_bad_dpi() {
        let config = PrintConfig {
            dpi: 10,
            ..PrintConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Settings(_))));
        assert!(PrintConfig::default().validate().is_ok());
    }
}
