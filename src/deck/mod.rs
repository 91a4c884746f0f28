//! # 牌组模块
//!
//! ## 设计思路
//!
//! `Deck` 是有序的卡牌序列，顺序即显示与导出顺序。批量操作逐张处理，
//! 每处理完一张调用一次 `Progress::on_progress`。
//!
//! - `join`：多张卡牌合成整张牌页（见 `join.rs`）
//! - `loader`：从图片 / PDF 文件载入（见 `loader.rs`）
//!
//! ## 实现思路
//!
//! - 下标访问统一做边界检查，越界返回 `IndexOutOfRange`。
//! - 会失败的批量操作先整体校验再修改（或先生成新序列再替换），
//!   避免出错时牌组停在“改了一半”的状态。
//! - `extend` / `set` 移动卡牌进入接收方，牌组之间从不共享卡牌。

mod join;
mod loader;

use crate::border::Border;
use crate::card::{Card, Margins};
use crate::error::AppError;
use crate::grid::GridSpec;
use crate::progress::Progress;

pub use loader::{LoadOptions, PdfRasterizer, Pdftoppm};

/// 有序卡牌集合。
#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<Card>,
}

impl From<Vec<Card>> for Deck {
    fn from(cards: Vec<Card>) -> Self {
        Self { cards }
    }
}

impl Extend<Card> for Deck {
    fn extend<I: IntoIterator<Item = Card>>(&mut self, iter: I) {
        self.cards.extend(iter);
    }
}

impl IntoIterator for Deck {
    type Item = Card;
    type IntoIter = std::vec::IntoIter<Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.into_iter()
    }
}

impl<'a> IntoIterator for &'a Deck {
    type Item = &'a Card;
    type IntoIter = std::slice::Iter<'a, Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }

    pub fn get(&self, index: usize) -> Result<&Card, AppError> {
        let len = self.cards.len();
        self.cards
            .get(index)
            .ok_or(AppError::IndexOutOfRange { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Card, AppError> {
        let len = self.cards.len();
        self.cards
            .get_mut(index)
            .ok_or(AppError::IndexOutOfRange { index, len })
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// 把另一个牌组的卡牌移入本牌组末尾。
    pub fn append_deck(&mut self, other: Deck) {
        self.cards.extend(other.cards);
    }

    /// 用另一个牌组整体替换当前内容。
    pub fn set(&mut self, other: Deck) {
        self.cards = other.cards;
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    /// 删除并返回第 `index` 张。
    pub fn remove(&mut self, index: usize) -> Result<Card, AppError> {
        if index >= self.cards.len() {
            return Err(AppError::IndexOutOfRange {
                index,
                len: self.cards.len(),
            });
        }
        Ok(self.cards.remove(index))
    }

    /// 每张卡牌按网格切分，结果按原顺序拼接后替换当前内容。
    pub fn split(&mut self, grid: &GridSpec, progress: &mut dyn Progress) -> Result<(), AppError> {
        let total = self.cards.len();
        let mut result = Deck::new();
        for (index, card) in self.cards.iter().enumerate() {
            result.append_deck(card.split(grid)?);
            progress.on_progress(index + 1, total);
        }

        log::info!("切分完成：{} 张 → {} 张（网格 {}）", total, result.len(), grid);
        self.set(result);
        Ok(())
    }

    /// 为所有卡牌设置同一边框。
    pub fn borders(&mut self, border: &Border, progress: &mut dyn Progress) -> Result<(), AppError> {
        for card in &self.cards {
            card.check_border(border)?;
        }

        let total = self.cards.len();
        for (index, card) in self.cards.iter_mut().enumerate() {
            card.set_border(border.clone())?;
            progress.on_progress(index + 1, total);
        }
        log::info!("已为 {} 张卡牌设置 {} 边框（{}px）", total, border.color, border.width);
        Ok(())
    }

    /// 删除所有卡牌的边框；任何一张删不掉时整体不改动。
    pub fn del_borders(&mut self, progress: &mut dyn Progress) -> Result<(), AppError> {
        for card in &self.cards {
            card.check_del_border()?;
        }

        let total = self.cards.len();
        for (index, card) in self.cards.iter_mut().enumerate() {
            card.del_border()?;
            progress.on_progress(index + 1, total);
        }
        Ok(())
    }

    /// 以 `fuzz` 相似度阈值修剪所有卡牌。
    pub fn trim(&mut self, fuzz: f64, progress: &mut dyn Progress) {
        let total = self.cards.len();
        for (index, card) in self.cards.iter_mut().enumerate() {
            card.trim(fuzz);
            progress.on_progress(index + 1, total);
        }
        log::info!("已修剪 {} 张卡牌（fuzz={}）", total, fuzz);
    }

    /// 所有卡牌按同一组边距裁剪；任何一张放不下时整体不改动。
    pub fn crop(&mut self, margins: Margins, progress: &mut dyn Progress) -> Result<(), AppError> {
        for card in &self.cards {
            let (width, height) = card.dimensions();
            margins.crop_rect(width, height)?;
        }

        let total = self.cards.len();
        for (index, card) in self.cards.iter_mut().enumerate() {
            card.crop(margins)?;
            progress.on_progress(index + 1, total);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::testing::Recorder;
    use crate::progress::Silent;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn card(width: u32, height: u32, shade: u8) -> Card {
        Card::new(
            RgbaImage::from_pixel(width, height, Rgba([shade, shade, shade, 255])),
            ImageFormat::Png,
        )
    }

    fn deck(count: usize) -> Deck {
        Deck::from((0..count).map(|i| card(30, 40, i as u8 * 10)).collect::<Vec<_>>())
    }

    #[test]
    fn index_access_is_bounds_checked() {
        let mut d = deck(2);
        assert!(d.get(1).is_ok());
        assert!(matches!(
            d.get(2),
            Err(AppError::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert!(matches!(d.get_mut(9), Err(AppError::IndexOutOfRange { .. })));
        assert!(matches!(d.remove(5), Err(AppError::IndexOutOfRange { .. })));
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn remove_returns_card_and_keeps_order() {
        let mut d = deck(3);
        let removed = d.remove(1).unwrap();
        assert_eq!(*removed.image().get_pixel(0, 0), Rgba([10, 10, 10, 255]));
        assert_eq!(*d.get(1).unwrap().image().get_pixel(0, 0), Rgba([20, 20, 20, 255]));
    }

    #[test]
    fn extend_and_set_move_cards() {
        let mut d = deck(2);
        d.append_deck(deck(3));
        assert_eq!(d.len(), 5);
        d.extend(vec![card(5, 5, 1)]);
        assert_eq!(d.len(), 6);
        d.set(deck(1));
        assert_eq!(d.len(), 1);
        d.clear();
        assert!(d.is_empty());
    }

    #[test]
    fn bulk_operations_preserve_count() {
        let mut d = deck(4);
        let mut recorder = Recorder::default();

        d.borders(&Border::black(3), &mut recorder).unwrap();
        d.trim(13.0, &mut recorder);
        d.crop(Margins::uniform(1), &mut recorder).unwrap();

        assert_eq!(d.len(), 4);
        assert_eq!(recorder.ticks.len(), 12);
        assert_eq!(recorder.ticks[3], (4, 4));
    }

    #[test]
    fn borders_then_del_borders_restore_size() {
        let mut d = deck(3);
        d.borders(&Border::white(6), &mut Silent).unwrap();
        assert!(d.iter().all(|c| c.dimensions() == (42, 52)));

        d.del_borders(&mut Silent).unwrap();
        assert!(d.iter().all(|c| c.dimensions() == (30, 40)));
        assert!(d.iter().all(|c| c.border().is_none()));
    }

    #[test]
    fn del_borders_is_all_or_nothing() {
        let mut a = card(40, 30, 1);
        a.set_border(Border::black(5)).unwrap();
        let mut b = card(40, 30, 2);
        b.set_border(Border::black(5)).unwrap();
        b.crop(Margins::new(0, 0, 0, 42)).unwrap();
        assert_eq!(b.dimensions(), (8, 40));
        let mut d = Deck::from(vec![a, b]);

        let err = d.del_borders(&mut Silent).unwrap_err();
        assert!(matches!(err, AppError::InvalidGeometry(_)));
        assert_eq!(d.get(0).unwrap().dimensions(), (50, 40));
        assert_eq!(d.get(0).unwrap().border(), Some(&Border::black(5)));
    }

    #[test]
    fn borders_is_all_or_nothing() {
        let mut d = deck(2);
        let mut narrow = card(30, 40, 3);
        narrow.set_border(Border::black(5)).unwrap();
        narrow.crop(Margins::new(0, 0, 0, 32)).unwrap();
        d.push(narrow);

        let err = d.borders(&Border::white(2), &mut Silent).unwrap_err();
        assert!(matches!(err, AppError::InvalidGeometry(_)));
        assert!(d.iter().take(2).all(|c| c.dimensions() == (30, 40) && c.border().is_none()));

        let err = d.borders(&Border::black(u32::MAX / 2), &mut Silent).unwrap_err();
        assert!(matches!(err, AppError::InvalidGeometry(_)));
        assert!(d.iter().take(2).all(|c| c.border().is_none()));
    }

    #[test]
    fn crop_is_all_or_nothing() {
        let mut d = deck(2);
        d.push(card(4, 4, 99));

        let err = d.crop(Margins::uniform(3), &mut Silent).unwrap_err();
        assert!(matches!(err, AppError::InvalidGeometry(_)));
        assert_eq!(d.get(0).unwrap().dimensions(), (30, 40));
    }

    #[test]
    fn split_replaces_each_sheet_with_cells() {
        let mut d = Deck::from(vec![card(60, 40, 0), card(60, 40, 50)]);
        let mut recorder = Recorder::default();
        d.split(&GridSpec::new(2, 3, 0).unwrap(), &mut recorder).unwrap();

        assert_eq!(d.len(), 12);
        assert!(d.iter().all(|c| c.dimensions() == (20, 20)));
        assert_eq!(*d.get(6).unwrap().image().get_pixel(0, 0), Rgba([50, 50, 50, 255]));
        assert_eq!(recorder.ticks, vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn failed_split_leaves_deck_unchanged() {
        let mut d = Deck::from(vec![card(60, 40, 0), card(2, 2, 0)]);
        let err = d.split(&GridSpec::new(3, 3, 0).unwrap(), &mut Silent).unwrap_err();
        assert!(matches!(err, AppError::InvalidGeometry(_)));
        assert_eq!(d.len(), 2);
    }
}
