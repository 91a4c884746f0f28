// Print layout planner
use proptest::prelude::*;

use pnp_cards::printer::{CardSize, Orientation, PaperSize, PhysicalSize, plan, plan_fixed};

#[test]
fn poker_on_a4_is_three_by_three_portrait() {
    let layout = plan(CardSize::Poker.size(), PaperSize::A4.size()).unwrap();
    assert_eq!(layout.orientation, Orientation::Portrait);
    assert_eq!(layout.horizontal_count, 3);
    assert_eq!(layout.vertical_count, 3);
    assert_eq!(layout.max_cards, 9);

    let landscape = plan_fixed(CardSize::Poker.size(), PaperSize::A4.size(), Orientation::Landscape).unwrap();
    assert_eq!(landscape.max_cards, 8);
}

#[test]
fn every_preset_pair_plans() {
    for card in CardSize::PRESETS {
        for paper in PaperSize::PRESETS {
            let layout = plan(card.size(), paper.size()).unwrap();
            assert!(layout.margin_horizontal >= 0.0);
            assert!(layout.margin_vertical >= 0.0);
        }
    }
}

proptest! {
    #[test]
    fn planner_invariants(
        card_w in 0.5f64..6.0,
        card_h in 0.5f64..6.0,
        paper_w in 2.0f64..40.0,
        paper_h in 2.0f64..40.0,
    ) {
        let card = PhysicalSize::new(card_w, card_h);
        let paper = PhysicalSize::new(paper_w, paper_h);
        let layout = plan(card, paper).unwrap();
        let portrait = plan_fixed(card, paper, Orientation::Portrait).unwrap();
        let landscape = plan_fixed(card, paper, Orientation::Landscape).unwrap();

        prop_assert_eq!(layout.max_cards, layout.horizontal_count * layout.vertical_count);
        prop_assert_eq!(layout.max_cards, portrait.max_cards.max(landscape.max_cards));
        if portrait.max_cards >= landscape.max_cards {
            prop_assert_eq!(layout.orientation, Orientation::Portrait);
        }

        let used_w = f64::from(layout.horizontal_count) * card_w + 2.0 * layout.margin_horizontal;
        let used_h = f64::from(layout.vertical_count) * card_h + 2.0 * layout.margin_vertical;
        prop_assert!((used_w - layout.paper.width).abs() < 1e-6);
        prop_assert!((used_h - layout.paper.height).abs() < 1e-6);
        prop_assert!(layout.margin_horizontal * 2.0 < card_w + 1e-6);
        prop_assert!(layout.margin_vertical * 2.0 < card_h + 1e-6);
    }

    #[test]
    fn slots_fill_pages_row_major(index in 0usize..500) {
        let layout = plan(CardSize::Mini.size(), PaperSize::Letter.size()).unwrap();
        let slot = layout.slot(index).unwrap();
        let per_page = layout.max_cards as usize;
        let offset = slot.page * per_page
            + slot.row as usize * layout.horizontal_count as usize
            + slot.col as usize;
        prop_assert_eq!(offset, index);
        prop_assert!(slot.col < layout.horizontal_count);
        prop_assert!(slot.row < layout.vertical_count);
    }
}
