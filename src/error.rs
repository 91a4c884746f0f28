//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，所有卡牌 / 牌组 / 打印操作统一返回
//! `Result<T, AppError>`，调用方（CLI 或 GUI 宿主）可按分支匹配。
//!
//! 错误分为两类：
//! - 几何错误与越界错误属于调用方编程错误，立即失败，绝不静默截断。
//! - I/O 类错误（文件读写、编解码、PDF）在导出时必须上抛，让用户知道导出不完整。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `RasterError` 与 `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，方便 GUI 宿主直接展示。

use serde::Serialize;

use crate::raster::RasterError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 裁剪 / 切分 / 合并得到非正尺寸
    #[error("几何参数无效: {0}")]
    InvalidGeometry(String),

    /// 牌组下标越界
    #[error("下标越界: {index}（牌组共 {len} 张）")]
    IndexOutOfRange { index: usize, len: usize },

    /// 未知的卡牌尺寸 / 纸张尺寸 / 颜色 / 导出模式
    #[error("不支持的格式: {0}")]
    UnsupportedFormat(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 图像服务错误（解码 / 编码 / 资源限制）
    #[error("{0}")]
    Raster(#[from] RasterError),

    /// PDF 生成或光栅化失败
    #[error("PDF 错误: {0}")]
    Pdf(String),

    /// 配置文件读写失败
    #[error("配置错误: {0}")]
    Settings(String),
}

impl AppError {
    /// 是否属于 I/O 类失败（读写、编解码、PDF）。
    pub fn is_io_failure(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Raster(_) | Self::Pdf(_))
    }

    pub(crate) fn geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry(message.into())
    }
}

/// GUI 宿主要求返回值实现 `Serialize`。
/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
