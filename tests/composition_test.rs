// Split / join / border properties over synthetic sheets
use image::{ImageFormat, Rgba, RgbaImage};
use proptest::prelude::*;

use pnp_cards::config::JoinOptions;
use pnp_cards::progress::Silent;
use pnp_cards::{Border, Card, Deck, GridSpec, Margins};

fn sheet(width: u32, height: u32) -> Card {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 251) as u8, (y % 251) as u8, 128, 255])
    });
    Card::new(image, ImageFormat::Png)
}

fn deck_of(count: usize, width: u32, height: u32) -> Deck {
    Deck::from((0..count).map(|_| sheet(width, height)).collect::<Vec<_>>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn split_then_join_restores_sheet_size(
        rows in 1u32..5,
        cols in 1u32..5,
        separation in 0u32..6,
        cell_w in 1u32..24,
        cell_h in 1u32..24,
    ) {
        let grid = GridSpec::new(rows, cols, separation).unwrap();
        let (width, height) = grid.sheet_size(cell_w, cell_h).unwrap();
        let mut deck = Deck::from(vec![sheet(width, height)]);

        deck.split(&grid, &mut Silent).unwrap();
        prop_assert_eq!(deck.len(), (rows * cols) as usize);
        prop_assert!(deck.iter().all(|c| c.dimensions() == (cell_w, cell_h)));

        deck.join(&grid, &JoinOptions::default(), &mut Silent).unwrap();
        prop_assert_eq!(deck.len(), 1);
        prop_assert_eq!(deck.get(0).unwrap().dimensions(), (width, height));
    }

    #[test]
    fn border_add_remove_is_identity(width in 1u32..40, height in 1u32..40, border in 0u32..12) {
        let mut card = sheet(width, height);
        card.set_border(Border::black(border)).unwrap();
        prop_assert_eq!(card.dimensions(), (width + 2 * border, height + 2 * border));

        card.del_border().unwrap();
        prop_assert_eq!(card.dimensions(), (width, height));
        prop_assert!(card.border().is_none());
    }

    #[test]
    fn zero_crop_keeps_dimensions(width in 1u32..64, height in 1u32..64) {
        let mut card = sheet(width, height);
        card.crop(Margins::default()).unwrap();
        prop_assert_eq!(card.dimensions(), (width, height));
    }
}

#[test]
fn join_pads_five_cards_to_eight() {
    let mut deck = Deck::new();
    for shade in 0..5u8 {
        deck.push(Card::new(
            RgbaImage::from_pixel(8, 8, Rgba([shade * 40, 0, 0, 255])),
            ImageFormat::Png,
        ));
    }

    deck.join(&GridSpec::new(2, 2, 0).unwrap(), &JoinOptions::default(), &mut Silent)
        .unwrap();

    assert_eq!(deck.len(), 2);
    let second = deck.get(1).unwrap().image();
    // 第二页：第 5 张 + 三张重复的第 1 张
    assert_eq!(second.get_pixel(0, 0)[0], 160);
    assert_eq!(second.get_pixel(8, 0)[0], 0);
    assert_eq!(second.get_pixel(0, 8)[0], 0);
    assert_eq!(second.get_pixel(8, 8)[0], 0);
}

#[test]
fn bulk_operations_keep_card_count() {
    let mut deck = deck_of(6, 30, 40);
    deck.borders(&Border::white(4), &mut Silent).unwrap();
    deck.trim(13.0, &mut Silent);
    deck.crop(Margins::new(1, 2, 3, 4), &mut Silent).unwrap();
    assert_eq!(deck.len(), 6);
}

#[test]
fn preview_is_encoded_once_without_mutation() {
    let mut card = sheet(64, 48);
    let config = pnp_cards::config::PreviewConfig::default();

    let first = card.preview(&config);
    let second = card.preview(&config);
    assert_eq!(first.bytes(), second.bytes());
    assert_eq!(card.preview_renders(), 1);

    card.trim(5.0);
    card.preview(&config);
    assert_eq!(card.preview_renders(), 2);
}
