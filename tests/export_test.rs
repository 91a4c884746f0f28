// Export pipeline: per-card images, one-per-page PDF, tiled PDF
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use image::{ImageFormat, Rgba, RgbaImage};

use pnp_cards::printer::{CardSize, ExportMode, PaperSize, PhysicalSize, PrintConfig, Printer};
use pnp_cards::progress::{Progress, Silent};
use pnp_cards::{AppError, Card, Deck};

fn unique_temp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock error")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("pnp-cards-export-test-{nanos}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[derive(Default)]
struct Ticks(Vec<(usize, usize)>);

impl Progress for Ticks {
    fn on_progress(&mut self, completed: usize, total: usize) {
        self.0.push((completed, total));
    }
}

fn deck(count: usize, format: ImageFormat) -> Deck {
    Deck::from(
        (0..count)
            .map(|i| {
                Card::new(
                    RgbaImage::from_pixel(25, 35, Rgba([i as u8 * 20, 80, 160, 255])),
                    format,
                )
            })
            .collect::<Vec<_>>(),
    )
}

fn printer(print_path: PathBuf) -> Printer {
    Printer::new(PrintConfig {
        print_path,
        dpi: 72,
        ..PrintConfig::default()
    })
}

#[test]
fn images_are_numbered_from_one() {
    let dir = unique_temp_dir();
    let printer = printer(dir.join("card_"));
    let mut ticks = Ticks::default();

    let summary = printer.export(ExportMode::Images, &deck(3, ImageFormat::Png), &mut ticks).unwrap();

    assert_eq!(summary.cards, 3);
    assert_eq!(summary.files[0], dir.join("card_1.png"));
    assert_eq!(summary.files[2], dir.join("card_3.png"));
    assert!(summary.files.iter().all(|f| f.exists()));
    assert_eq!(ticks.0, vec![(1, 3), (2, 3), (3, 3)]);

    let reloaded = image::open(dir.join("card_2.png")).unwrap();
    assert_eq!((reloaded.width(), reloaded.height()), (25, 35));
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn image_extension_follows_card_format() {
    let dir = unique_temp_dir();
    let summary = printer(dir.join("scan"))
        .print_images(&deck(1, ImageFormat::Jpeg), &mut Silent)
        .unwrap();
    assert_eq!(summary.files, vec![dir.join("scan1.jpg")]);
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn tiled_pdf_breaks_pages_when_full() {
    let dir = unique_temp_dir();
    let path = dir.join("out").join("deck.pdf");
    let mut ticks = Ticks::default();

    let summary = printer(path.clone())
        .export(ExportMode::Pdf, &deck(10, ImageFormat::Png), &mut ticks)
        .unwrap();

    let layout = summary.layout.expect("tiled export has a layout");
    assert_eq!(layout.max_cards, 9);
    assert_eq!(summary.pages, 2);
    assert_eq!(ticks.0.len(), 10);

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn grid_pdf_puts_one_card_per_page() {
    let dir = unique_temp_dir();
    let path = dir.join("grid.pdf");

    let mut big = deck(2, ImageFormat::Png);
    big.push(Card::new(RgbaImage::from_pixel(2000, 3000, Rgba([0, 0, 0, 255])), ImageFormat::Png));

    let summary = printer(path.clone()).print_grid(&big, &mut Silent).unwrap();
    assert_eq!(summary.pages, 3);
    assert!(fs::read(&path).unwrap().starts_with(b"%PDF"));
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn card_larger_than_paper_is_rejected() {
    let dir = unique_temp_dir();
    let printer = Printer::new(PrintConfig {
        card_size: CardSize::Custom(PhysicalSize::new(9.0, 9.0)),
        paper_size: PaperSize::A6,
        print_path: dir.join("never.pdf"),
        ..PrintConfig::default()
    });

    let err = printer.print_pdf(&deck(1, ImageFormat::Png), &mut Silent).unwrap_err();
    assert!(matches!(err, AppError::InvalidGeometry(_)));
    assert!(!dir.join("never.pdf").exists());
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn write_failure_propagates() {
    let dir = unique_temp_dir();
    let blocker = dir.join("blocker");
    fs::write(&blocker, b"file, not a directory").unwrap();

    let err = printer(blocker.join("card"))
        .print_images(&deck(1, ImageFormat::Png), &mut Silent)
        .unwrap_err();
    assert!(err.is_io_failure());
    let _ = fs::remove_dir_all(dir);
}
