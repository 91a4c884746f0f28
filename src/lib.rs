//! # 卡牌排版工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │           宿主（命令行 / GUI，通过 Progress 接收通知）      │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ Result<T, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │  session ──── Session：牌组 + 撤销历史 + 打印机            │
//! │       │                                                  │
//! │  ├─ deck ──────── 有序卡牌集合，批量操作                   │
//! │  │   ├─ join          多张卡牌合成整页                     │
//! │  │   └─ loader        图片 / PDF 载入                      │
//! │  ├─ card ──────── 单张卡牌：裁剪·边框·修剪·切分·预览        │
//! │  ├─ grid ──────── 网格切分 / 合并的几何计算                 │
//! │  ├─ printer ───── 排版规划 + 图片 / PDF 导出               │
//! │  └─ raster ────── 图像服务适配（image + fast_image_resize）│
//! │                                                          │
//! │  error · config · settings · progress · history · border │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`config`] | 全局配置 `CardsConfig` 与预览档位 |
//! | [`settings`] | 配置文件的读取与保存 |
//! | [`progress`] | 进度 / 状态回调接口 |
//! | [`history`] | 通用撤销 / 重做快照 |
//! | [`border`] | 边框颜色与宽度 |
//! | [`grid`] | 网格规格、单元尺寸与位置 |
//! | [`raster`] | 解码·编码·裁剪·合成·修剪·画边框·缩放 |
//! | [`card`] | 单张卡牌及其预览缓存 |
//! | [`deck`] | 牌组与批量操作、载入、合并 |
//! | [`printer`] | 纸张排版与导出 |
//! | [`session`] | 面向宿主的会话门面 |

pub mod border;
pub mod card;
pub mod config;
pub mod deck;
pub mod error;
pub mod grid;
pub mod history;
pub mod printer;
pub mod progress;
pub mod raster;
pub mod session;
pub mod settings;

pub use border::{Border, BorderColor};
pub use card::{Card, Margins, Preview};
pub use config::CardsConfig;
pub use deck::Deck;
pub use error::AppError;
pub use grid::GridSpec;
pub use printer::{ExportMode, Printer};
pub use session::Session;
