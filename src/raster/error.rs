//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载图像服务中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。

/// 图像服务统一错误类型。
///
/// 该类型会在上层被转换为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),
}
