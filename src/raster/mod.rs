//! # 图像服务模块（raster）
//!
//! ## 设计思路
//!
//! 卡牌与牌组逻辑只把图像当作不透明的二维位图，真正的像素操作集中在这里：
//!
//! - `pipeline`：字节 → 位图（含尺寸预检与资源上限）、位图 → 字节、缩放
//! - `ops`：裁剪、合成、模糊边缘修剪（trim）、描边
//! - `color`：颜色名 / 十六进制颜色解析
//! - `error`：图像服务统一错误
//!
//! ## 实现思路
//!
//! 所有位图统一为 `RgbaImage`，避免在各处分支处理不同像素类型；
//! 只在编码阶段按目标格式（如 JPEG 不支持 alpha）转换。
//! 裁剪 / 修剪都返回新的缓冲区，坐标原点天然为 `(0, 0)`。

mod color;
mod error;
mod ops;
mod pipeline;

pub use color::parse_color;
pub use error::RasterError;
pub use ops::{MAX_CANVAS_PIXELS, Rect, check_canvas, composite, crop, draw_border, trim, trim_bounds};
pub use pipeline::{DecodeLimits, decode, encode, encode_png, resize};
