//! # 卡牌排版工具 — 命令行入口
//!
//! 本文件只负责解析参数并按顺序驱动 `Session`：
//! 载入 → 切分 → 修剪 → 裁剪 → 边框 → 合并 → 导出。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use pnp_cards::config::{CardsConfig, PreviewProfile};
use pnp_cards::grid::JoinPadding;
use pnp_cards::printer::{CardSize, ExportSummary, Orientation, PaperSize};
use pnp_cards::progress::LogProgress;
use pnp_cards::settings::{load_settings, save_settings};
use pnp_cards::{AppError, Border, ExportMode, GridSpec, Margins, Session};

/// 把扫描件或 PDF 切成单张卡牌，加边框后排版成可打印的页面。
#[derive(Parser, Debug)]
#[command(name = "pnp-cards", version)]
#[command(about = "🃏 Print-and-play card sheet composer")]
struct Args {
    /// 输入的图片或 PDF 文件
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// 配置文件（JSON），不存在时使用默认值
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 把生效的配置写回该文件
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// 载入时按网格切分每一页，如 3x3 或 3x3+10（间隔像素）
    #[arg(short, long)]
    grid: Option<GridSpec>,

    /// 载入后再按网格切分一次
    #[arg(long)]
    split: Option<GridSpec>,

    /// 修剪与左上角颜色相近的边缘
    #[arg(long)]
    trim: bool,

    /// 修剪阈值 0~100，默认取配置中的 default_fuzz
    #[arg(long)]
    fuzz: Option<f64>,

    /// 裁剪边距：`10` 或 `top,bottom,left,right`
    #[arg(long)]
    crop: Option<Margins>,

    /// 边框颜色：black / white / 颜色名 / #RRGGBB
    #[arg(long)]
    border: Option<String>,

    /// 边框宽度（像素）
    #[arg(long, default_value_t = 10)]
    border_width: u32,

    /// 合并为整页，如 2x2
    #[arg(long)]
    join: Option<GridSpec>,

    /// 合并补齐策略：repeat-first / blank / reject
    #[arg(long)]
    padding: Option<JoinPadding>,

    /// 导出模式：images / grid / pdf
    #[arg(short, long, default_value = "pdf")]
    mode: ExportMode,

    /// 输出路径（images 模式为文件名前缀）
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 卡牌尺寸：Poker、Tarot…或 2.5x3.5（英寸）
    #[arg(long)]
    card_size: Option<CardSize>,

    /// 纸张尺寸：A4、Letter…或 8.5x11（英寸）
    #[arg(long)]
    paper_size: Option<PaperSize>,

    /// 纸张方向：portrait / landscape（同时锁定方向）
    #[arg(long)]
    orientation: Option<Orientation>,

    /// 输出分辨率
    #[arg(long)]
    dpi: Option<u32>,

    /// 预览档位：quality / balanced / speed，配合 --save-config 写入配置
    #[arg(long, value_parser = PreviewProfile::from_str)]
    preview_profile: Option<PreviewProfile>,
}

impl Args {
    /// 命令行参数覆盖配置文件中的值。
    fn apply(&self, config: &mut CardsConfig) {
        if let Some(padding) = self.padding {
            config.join.padding = padding;
        }
        if let Some(output) = &self.output {
            config.print.print_path = output.clone();
        }
        if let Some(card_size) = self.card_size {
            config.print.card_size = card_size;
        }
        if let Some(paper_size) = self.paper_size {
            config.print.paper_size = paper_size;
        }
        if let Some(orientation) = self.orientation {
            config.print.orientation = orientation;
            config.print.lock_orientation = true;
        }
        if let Some(dpi) = self.dpi {
            config.print.dpi = dpi;
        }
        if let Some(profile) = self.preview_profile {
            config.preview.apply_profile(profile);
        }
    }
}

fn run(args: &Args) -> Result<ExportSummary, AppError> {
    let mut config = args
        .config
        .as_deref()
        .map(load_settings)
        .unwrap_or_default();
    args.apply(&mut config);
    log::debug!("预览档位：{}", config.preview.infer_profile().as_str());

    if let Some(path) = &args.save_config {
        save_settings(path, &config)?;
        log::info!("配置已保存到 {}", path.display());
    }

    let mut progress = LogProgress;
    let mut session = Session::new(config)?;

    session.open(&args.inputs, args.grid.as_ref(), &mut progress)?;
    if let Some(grid) = &args.split {
        session.split(grid, &mut progress)?;
    }
    if args.trim {
        session.trim(args.fuzz, &mut progress)?;
    }
    if let Some(margins) = args.crop {
        session.crop(margins, &mut progress)?;
    }
    if let Some(color) = &args.border {
        session.borders(&Border::new(color.as_str(), args.border_width), &mut progress)?;
    }
    if let Some(grid) = &args.join {
        session.join(grid, &mut progress)?;
    }

    session.export(args.mode, &mut progress)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(summary) => {
            log::info!(
                "完成：{} 张卡牌，{} 页，{} 个文件",
                summary.cards,
                summary.pages,
                summary.files.len()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
