//! # 会话
//!
//! ## 设计思路
//!
//! 一个 `Session` 对应界面上打开的一份文档：当前牌组、撤销历史、配置、打印机。
//! 宿主（命令行或 GUI）只调用这里的方法，并通过 `Progress` 接收进度与状态。
//!
//! ## 实现思路
//!
//! 所有修改牌组的命令都经过同一个 `commit` 组合子：
//!
//! 1. 发出开始状态
//! 2. 在牌组上执行操作
//! 3. 成功：记录一份快照；失败：从最近一次快照恢复牌组，错误照常返回
//!
//! 只读命令（预览、导出）不进入历史。

use std::path::PathBuf;

use crate::border::Border;
use crate::card::{Margins, Preview};
use crate::config::CardsConfig;
use crate::deck::{Deck, LoadOptions, PdfRasterizer, Pdftoppm};
use crate::error::AppError;
use crate::grid::GridSpec;
use crate::history::History;
use crate::printer::{ExportMode, ExportSummary, PrintConfig, Printer};
use crate::progress::Progress;

/// 就绪状态文字。
pub const READY: &str = "就绪";

/// 牌组与其历史。
struct Document {
    deck: Deck,
    history: History<Deck>,
}

impl Document {
    fn new(depth: usize) -> Self {
        let deck = Deck::new();
        let history = History::new(&deck, depth);
        Self { deck, history }
    }

    fn commit<R>(
        &mut self,
        message: &str,
        progress: &mut dyn Progress,
        op: impl FnOnce(&mut Deck, &mut dyn Progress) -> Result<R, AppError>,
    ) -> Result<R, AppError> {
        progress.on_status(&format!("{}…", message));
        match op(&mut self.deck, progress) {
            Ok(value) => {
                self.history.track(&self.deck, message);
                progress.on_status(&format!("{}完成", message));
                Ok(value)
            }
            Err(e) => {
                log::warn!("{}失败，牌组恢复到上一状态: {}", message, e);
                self.deck = self.history.current().clone();
                progress.on_status(&format!("{}失败: {}", message, e));
                Err(e)
            }
        }
    }
}

pub struct Session {
    document: Document,
    config: CardsConfig,
    printer: Printer,
    rasterizer: Box<dyn PdfRasterizer>,
}

impl Session {
    /// 使用 `pdftoppm` 光栅化 PDF。
    pub fn new(config: CardsConfig) -> Result<Self, AppError> {
        Self::with_rasterizer(config, Box::new(Pdftoppm::default()))
    }

    pub fn with_rasterizer(config: CardsConfig, rasterizer: Box<dyn PdfRasterizer>) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self {
            document: Document::new(config.history_depth),
            printer: Printer::new(config.print.clone()),
            config,
            rasterizer,
        })
    }

    pub fn deck(&self) -> &Deck {
        &self.document.deck
    }

    pub fn config(&self) -> &CardsConfig {
        &self.config
    }

    pub fn printer(&self) -> &Printer {
        &self.printer
    }

    /// 替换打印配置。
    pub fn set_print_config(&mut self, print: PrintConfig) -> Result<(), AppError> {
        print.validate()?;
        self.printer.set_config(print.clone());
        self.config.print = print;
        Ok(())
    }

    /// 依次载入文件并追加到牌组，返回新增卡牌数。任一文件失败时整体不生效。
    pub fn open(
        &mut self,
        paths: &[PathBuf],
        grid: Option<&GridSpec>,
        progress: &mut dyn Progress,
    ) -> Result<usize, AppError> {
        let options = LoadOptions::from(&self.config);
        let rasterizer = self.rasterizer.as_ref();
        self.document.commit("载入", progress, |deck, progress| {
            let mut added = 0;
            for path in paths {
                added += deck.load(path, grid, &options, rasterizer, progress)?;
            }
            Ok(added)
        })
    }

    pub fn split(&mut self, grid: &GridSpec, progress: &mut dyn Progress) -> Result<(), AppError> {
        self.document
            .commit("切分", progress, |deck, progress| deck.split(grid, progress))
    }

    pub fn join(&mut self, grid: &GridSpec, progress: &mut dyn Progress) -> Result<(), AppError> {
        let options = &self.config.join;
        self.document
            .commit("合并", progress, |deck, progress| deck.join(grid, options, progress))
    }

    pub fn borders(&mut self, border: &Border, progress: &mut dyn Progress) -> Result<(), AppError> {
        self.document
            .commit("设置边框", progress, |deck, progress| deck.borders(border, progress))
    }

    pub fn del_borders(&mut self, progress: &mut dyn Progress) -> Result<(), AppError> {
        self.document
            .commit("删除边框", progress, |deck, progress| deck.del_borders(progress))
    }

    /// `fuzz` 为空时使用配置中的 `default_fuzz`。
    pub fn trim(&mut self, fuzz: Option<f64>, progress: &mut dyn Progress) -> Result<(), AppError> {
        let fuzz = fuzz.unwrap_or(self.config.default_fuzz);
        if !(0.0..=100.0).contains(&fuzz) {
            return Err(AppError::geometry(format!("fuzz 必须在 0~100 之间：{}", fuzz)));
        }
        self.document.commit("修剪", progress, |deck, progress| {
            deck.trim(fuzz, progress);
            Ok(())
        })
    }

    pub fn crop(&mut self, margins: Margins, progress: &mut dyn Progress) -> Result<(), AppError> {
        self.document
            .commit("裁剪", progress, |deck, progress| deck.crop(margins, progress))
    }

    pub fn delete_card(&mut self, index: usize, progress: &mut dyn Progress) -> Result<(), AppError> {
        self.document.commit("删除卡牌", progress, |deck, _| deck.remove(index).map(|_| ()))
    }

    pub fn clear(&mut self, progress: &mut dyn Progress) -> Result<(), AppError> {
        self.document.commit("清空", progress, |deck, _| {
            deck.clear();
            Ok(())
        })
    }

    /// 撤销到上一快照；没有可撤销的内容时返回 `false`。
    pub fn undo(&mut self, progress: &mut dyn Progress) -> bool {
        let message = self.document.history.current_message().to_string();
        match self.document.history.undo() {
            Some(deck) => {
                self.document.deck = deck;
                progress.on_status(&format!("已撤销：{}", message));
                true
            }
            None => false,
        }
    }

    /// 重做下一快照；没有可重做的内容时返回 `false`。
    pub fn redo(&mut self, progress: &mut dyn Progress) -> bool {
        match self.document.history.redo() {
            Some(deck) => {
                self.document.deck = deck;
                progress.on_status(&format!("已重做：{}", self.document.history.current_message()));
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.document.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.document.history.can_redo()
    }

    /// 第 `index` 张卡牌的预览。下标越界是错误，预览生成失败则降级为占位结果。
    pub fn preview(&mut self, index: usize) -> Result<Preview, AppError> {
        let config = self.config.preview;
        Ok(self.document.deck.get_mut(index)?.preview(&config))
    }

    pub fn export(&self, mode: ExportMode, progress: &mut dyn Progress) -> Result<ExportSummary, AppError> {
        progress.on_status(&format!("导出 {}…", mode));
        let summary = self.printer.export(mode, &self.document.deck, progress)?;
        progress.on_status("保存完成");
        Ok(summary)
    }
}
