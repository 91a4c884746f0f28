//! 输入载入：图片文件直接解码，PDF 先逐页光栅化。
//!
//! ## 实现思路
//!
//! 1. 先检查文件体积，再读入内存。
//! 2. 用 `infer` 识别魔数（兼看 `.pdf` 扩展名）判断是否为 PDF。
//! 3. PDF 交给 `PdfRasterizer` 按 `pdf_dpi` 输出每页 PNG，再统一解码。
//! 4. 网格多于一个单元时，每张整页先切分再追加到牌组。
//!
//! 全部成功后才写入牌组，失败时牌组保持原样。

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::ImageFormat;
use once_cell::sync::Lazy;
use regex::Regex;
use tempfile::TempDir;

use super::Deck;
use crate::card::Card;
use crate::config::CardsConfig;
use crate::error::AppError;
use crate::grid::GridSpec;
use crate::progress::Progress;
use crate::raster::{self, DecodeLimits, RasterError};

static PAGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^page-(\d+)\.png$").expect("page pattern is valid"));

/// 载入参数，通常由 `CardsConfig` 得出。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    pub pdf_dpi: u32,
    pub max_file_size: u64,
    pub limits: DecodeLimits,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::from(&CardsConfig::default())
    }
}

impl From<&CardsConfig> for LoadOptions {
    fn from(config: &CardsConfig) -> Self {
        Self {
            pdf_dpi: config.pdf_dpi,
            max_file_size: config.max_file_size,
            limits: config.decode_limits(),
        }
    }
}

/// PDF 光栅化器：把每一页渲染为编码后的 PNG，按页序返回。
pub trait PdfRasterizer {
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<Vec<u8>>, AppError>;
}

/// 调用 poppler 的 `pdftoppm` 命令行工具。
#[derive(Debug, Clone)]
pub struct Pdftoppm {
    program: PathBuf,
}

impl Default for Pdftoppm {
    fn default() -> Self {
        Self {
            program: PathBuf::from("pdftoppm"),
        }
    }
}

impl Pdftoppm {
    /// 使用指定路径的可执行文件。
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl PdfRasterizer for Pdftoppm {
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<Vec<u8>>, AppError> {
        let workdir = scratch_dir()?;
        let result = run_pdftoppm(&self.program, path, dpi, workdir.path());
        let location = workdir.path().display().to_string();
        if let Err(e) = workdir.close() {
            log::warn!("清理临时目录失败 {}: {}", location, e);
        }
        result
    }
}

fn run_pdftoppm(program: &Path, path: &Path, dpi: u32, workdir: &Path) -> Result<Vec<Vec<u8>>, AppError> {
    let output = Command::new(program)
        .arg("-r")
        .arg(dpi.to_string())
        .arg("-png")
        .arg(path)
        .arg(workdir.join("page"))
        .output()
        .map_err(|e| AppError::Pdf(format!("无法启动 {}: {}", program.display(), e)))?;

    if !output.status.success() {
        return Err(AppError::Pdf(format!(
            "{} 退出码 {:?}: {}",
            program.display(),
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let mut pages = Vec::new();
    for entry in fs::read_dir(workdir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(number) = page_number(&name.to_string_lossy()) else {
            continue;
        };
        pages.push((number, entry.path()));
    }
    pages.sort_by_key(|(number, _)| *number);

    if pages.is_empty() {
        return Err(AppError::Pdf(format!("{} 没有输出任何页面", path.display())));
    }

    pages
        .into_iter()
        .map(|(_, page)| fs::read(page).map_err(AppError::from))
        .collect()
}

/// `page-07.png` → 7
fn page_number(file_name: &str) -> Option<u32> {
    PAGE_PATTERN
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// 每次光栅化独占一个新建的临时目录，`TempDir` 析构时自动删除。
fn scratch_dir() -> Result<TempDir, AppError> {
    Ok(tempfile::Builder::new().prefix("pnp-cards-pdf-").tempdir()?)
}

fn read_source(path: &Path, max_file_size: u64) -> Result<Vec<u8>, AppError> {
    let size = fs::metadata(path)?.len();
    if size > max_file_size {
        return Err(RasterError::ResourceLimit(format!(
            "文件过大：{}（{} 字节，上限 {} 字节）",
            path.display(),
            size,
            max_file_size
        ))
        .into());
    }
    Ok(fs::read(path)?)
}

fn is_pdf(bytes: &[u8], path: &Path) -> bool {
    let by_magic = infer::get(bytes).is_some_and(|kind| kind.mime_type() == "application/pdf");
    let by_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    by_magic || by_extension
}

impl Deck {
    /// 载入一个图片或 PDF 文件并追加到牌组末尾，返回新增卡牌数。
    pub fn load(
        &mut self,
        path: &Path,
        grid: Option<&GridSpec>,
        options: &LoadOptions,
        rasterizer: &dyn PdfRasterizer,
        progress: &mut dyn Progress,
    ) -> Result<usize, AppError> {
        let bytes = read_source(path, options.max_file_size)?;

        let sheets = if is_pdf(&bytes, path) {
            log::info!("📄 光栅化 PDF {}（{} DPI）", path.display(), options.pdf_dpi);
            rasterizer
                .rasterize(path, options.pdf_dpi)?
                .iter()
                .map(|page| {
                    let (image, _) = raster::decode(page, &options.limits)?;
                    Ok(Card::new(image, ImageFormat::Png))
                })
                .collect::<Result<Vec<_>, AppError>>()?
        } else {
            let (image, format) = raster::decode(&bytes, &options.limits)?;
            vec![Card::new(image, format)]
        };

        let total = sheets.len();
        let mut loaded = Deck::new();
        for (index, sheet) in sheets.into_iter().enumerate() {
            match grid {
                Some(grid) if grid.cells() > 1 => loaded.append_deck(sheet.split(grid)?),
                _ => loaded.push(sheet),
            }
            progress.on_progress(index + 1, total);
        }

        let added = loaded.len();
        log::info!("已载入 {}：{} 页 → {} 张卡牌", path.display(), total, added);
        self.append_deck(loaded);
        Ok(added)
    }
}
