//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `CardsConfig`，保证运行时行为可观测、可调整、可测试。
//! 其中预览档位（quality / balanced / speed）作为高层语义，映射到底层参数组合。
//!
//! ## 实现思路
//!
//! - `Default` 提供与原工具一致的默认值（PDF 200 DPI、trim fuzz 13、50 步历史）。
//! - 整个结构体可 `serde` 序列化，由 `settings` 模块持久化为 JSON。
//! - `PreviewProfile` 负责档位字符串解析与反向输出。
//! - `validate` 在加载配置和 CLI 覆盖参数后统一校验取值范围。

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::grid::JoinPadding;
use crate::printer::PrintConfig;
use crate::raster::DecodeLimits;

/// 可序列化的缩放滤镜，映射到 `image::imageops::FilterType`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// 预览图生成参数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// 预览图宽/高单边最大值，超过时等比缩小。
    pub max_dimension: u32,
    /// 缩小时使用的滤镜。
    pub filter: ResizeFilter,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1024,
            filter: ResizeFilter::Triangle,
        }
    }
}

/// 预览档位（面向产品/用户语义）。
///
/// - `Quality`：尽量保真
/// - `Balanced`：质量与性能平衡
/// - `Speed`：优先刷新速度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewProfile {
    Quality,
    Balanced,
    Speed,
}

impl PreviewProfile {
    /// 从外部字符串解析档位。
    pub fn from_str(profile: &str) -> Result<Self, AppError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(AppError::UnsupportedFormat(format!(
                "未知预览档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl PreviewConfig {
    /// 基于当前参数反推档位。
    pub fn infer_profile(&self) -> PreviewProfile {
        if self.max_dimension >= 4096 {
            return PreviewProfile::Quality;
        }
        if self.max_dimension <= 512 {
            return PreviewProfile::Speed;
        }
        PreviewProfile::Balanced
    }

    pub fn apply_profile(&mut self, profile: PreviewProfile) {
        match profile {
            PreviewProfile::Quality => {
                self.max_dimension = 4096;
                self.filter = ResizeFilter::Lanczos3;
            }
            PreviewProfile::Balanced => {
                self.max_dimension = 1024;
                self.filter = ResizeFilter::Triangle;
            }
            PreviewProfile::Speed => {
                self.max_dimension = 512;
                self.filter = ResizeFilter::Nearest;
            }
        }
    }
}

/// 合并（join）参数。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinOptions {
    /// 牌数不足整页时的补齐策略。
    pub padding: JoinPadding,
    /// 画布背景色（间隔与空单元），颜色名或 `#RRGGBB[AA]`。
    pub background: String,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            padding: JoinPadding::RepeatFirst,
            background: "white".to_string(),
        }
    }
}

/// 全局配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardsConfig {
    /// PDF 输入的光栅化分辨率。
    pub pdf_dpi: u32,
    /// 未显式指定时 trim 使用的相似度阈值（0–100）。
    pub default_fuzz: f64,
    /// 撤销历史保留的快照数。
    pub history_depth: usize,
    /// 读取输入文件时允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    pub preview: PreviewConfig,
    pub join: JoinOptions,
    pub print: PrintConfig,
}

impl Default for CardsConfig {
    fn default() -> Self {
        Self {
            pdf_dpi: 200,
            default_fuzz: 13.0,
            history_depth: 50,
            max_file_size: 200 * 1024 * 1024,
            max_decoded_pixels: 200_000_000,
            preview: PreviewConfig::default(),
            join: JoinOptions::default(),
            print: PrintConfig::default(),
        }
    }
}

impl CardsConfig {
    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_decoded_pixels: self.max_decoded_pixels,
        }
    }

    /// 校验取值范围。
    pub fn validate(&self) -> Result<(), AppError> {
        if !(36..=1200).contains(&self.pdf_dpi) {
            return Err(AppError::Settings("pdf_dpi 必须在 36~1200 之间".to_string()));
        }
        if !(0.0..=100.0).contains(&self.default_fuzz) {
            return Err(AppError::Settings("default_fuzz 必须在 0~100 之间".to_string()));
        }
        if self.history_depth < 1 {
            return Err(AppError::Settings("history_depth 不能小于 1".to_string()));
        }
        if self.preview.max_dimension < 16 {
            return Err(AppError::Settings("preview.max_dimension 不能小于 16".to_string()));
        }
        if self.max_file_size == 0 || self.max_decoded_pixels == 0 {
            return Err(AppError::Settings("资源上限必须为正".to_string()));
        }
        self.print.validate()
    }
}
