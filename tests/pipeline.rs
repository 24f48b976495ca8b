// tests/pipeline.rs

//! End-to-end checks of the library pipeline: palette file → variants →
//! table → file on disk.

use std::fs;
use std::path::PathBuf;

use palette_lut::lut::{self, BuildOptions, Strategy, DEFAULT_EXCLUDE_COUNT};
use palette_lut::table_io::{self, CheckOutcome};
use palette_lut::{expand, source, Rgb, DEFAULT_MULTIPLIERS};
use tempfile::tempdir;

fn bundled_palette() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("palettes")
        .join("map_colors.json")
}

#[test_log::test]
fn bundled_palette_fits_in_one_byte() {
    let base = source::load(&bundled_palette()).unwrap();
    assert_eq!(base.len(), 62);
    assert_eq!(base[0], Rgb::new(0, 0, 0));
    assert_eq!(base[1], Rgb::new(0x7F, 0xB2, 0x38));

    let variants = expand(&base, &DEFAULT_MULTIPLIERS);
    assert_eq!(variants.len(), 248);
    assert!(variants.len() <= lut::MAX_VARIANTS);
}

#[test_log::test]
fn bundled_palette_reference_points() {
    let base = source::load(&bundled_palette()).unwrap();
    let variants = expand(&base, &DEFAULT_MULTIPLIERS);
    let nearest = |color: Rgb| lut::nearest(&variants, DEFAULT_EXCLUDE_COUNT, color).unwrap();

    // Exact base colors map to their full-brightness variant.
    assert_eq!(nearest(Rgb::new(0x7F, 0xB2, 0x38)), 6);
    assert_eq!(nearest(Rgb::new(255, 255, 255)), 8 * 4 + 2);
    // Pure black falls to the darkened black entry (29 * 4 + 3).
    assert_eq!(nearest(Rgb::new(0, 0, 0)), 119);

    for color in [Rgb::new(0, 0, 0), Rgb::new(1, 2, 3), Rgb::new(250, 5, 5)] {
        assert!(nearest(color) >= 4, "{} resolved to an excluded variant", color);
    }
}

#[test_log::test]
fn repeated_builds_write_identical_files() {
    let dir = tempdir().unwrap();
    let palette_path = dir.path().join("palette.txt");
    fs::write(&palette_path, "#000000 // reserved\n#C7C7C7\n#4040FF\n").unwrap();

    let base = source::load(&palette_path).unwrap();
    let variants = expand(&base, &DEFAULT_MULTIPLIERS);

    let first = dir.path().join("out").join("first.dat");
    let second = dir.path().join("out").join("second.dat");
    let options = BuildOptions::new(DEFAULT_EXCLUDE_COUNT);
    table_io::write_table(&first, &lut::build(&variants, &options).unwrap()).unwrap();
    let sequential = options.with_strategy(Strategy::Sequential);
    let rebuilt = lut::build(&variants, &sequential).unwrap();
    table_io::write_table(&second, &rebuilt).unwrap();

    let a = fs::read(&first).unwrap();
    let b = fs::read(&second).unwrap();
    assert_eq!(a.len(), lut::TABLE_LEN);
    assert!(a == b, "table files differ between runs");
    assert_eq!(
        table_io::check_table(&first, &rebuilt).unwrap(),
        CheckOutcome::Matches
    );

    // Excluded variants of the reserved color never appear.
    assert!(a.iter().all(|&i| (4..12).contains(&i)));
    assert_eq!(a[lut::cube_offset(0xC7, 0xC7, 0xC7)], 6);
    assert_eq!(a[lut::cube_offset(0x40, 0x40, 0xFF)], 10);
}
