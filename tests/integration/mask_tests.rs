//! Mask rasterization integration tests.
//!
//! Tests verify:
//! - Empty tiles follow the emit-empty policy
//! - Holes are cut with one-pixel boundary tolerance
//! - An overlapping polygon fills another polygon's hole
//! - Masks are north-up and independent of ring orientation
//! - Encoded masks decode to two-channel PNGs of the tile size

use image::{ColorType, ImageReader};
use std::io::Cursor;

use tile_masker::geometry::{Extent, PixelSize, Polygon};
use tile_masker::mask::{Mask, MaskEncoder, MaskRasterizer, MASK_FILL};

use super::test_utils::{ring, square, square_with_hole, TEST_RESOLUTION};

/// 256 x 256 px tile at the test resolution.
fn tile() -> Extent {
    Extent::new(0.0, 0.0, 2560.0, 2560.0).unwrap()
}

fn rasterizer() -> MaskRasterizer {
    MaskRasterizer::new(TEST_RESOLUTION, PixelSize::square(256))
}

fn rasterize(polygons: &[Polygon]) -> Mask {
    rasterizer().rasterize(&tile(), polygons).unwrap().unwrap()
}

/// Whether the pixel containing map point `(x, y)` is opaque.
fn opaque_at(mask: &Mask, x: f64, y: f64) -> bool {
    let column = (x / TEST_RESOLUTION) as u32;
    let row = mask.height() - 1 - (y / TEST_RESOLUTION) as u32;
    mask.is_opaque(column, row)
}

// =============================================================================
// Empty Tiles
// =============================================================================

#[test]
fn test_tile_outside_polygons() {
    let far_away = vec![square(10000.0, 10000.0, 12000.0, 12000.0)];

    assert!(rasterizer().rasterize(&tile(), &far_away).unwrap().is_none());

    let mask = rasterizer()
        .with_emit_empty(true)
        .rasterize(&tile(), &far_away)
        .unwrap()
        .unwrap();
    assert_eq!((mask.width(), mask.height()), (256, 256));
    assert_eq!(mask.opaque_count(), 0);
}

#[test]
fn test_polygon_touching_tile_edge_only() {
    let neighbour = vec![square(2560.0, 0.0, 5000.0, 2560.0)];
    assert!(rasterizer().rasterize(&tile(), &neighbour).unwrap().is_none());
}

// =============================================================================
// Holes and Overlaps
// =============================================================================

#[test]
fn test_square_with_hole_footprint() {
    // 150 x 150 px exterior minus a 50 x 50 px hole
    let polygon = square_with_hole((500.0, 500.0, 2000.0, 2000.0), (1000.0, 1000.0, 1500.0, 1500.0));
    let mask = rasterize(&[polygon]);

    let expected = 150 * 150 - 50 * 50;
    let boundary = 4 * 150 + 4 * 50;
    let count = mask.opaque_count() as i64;
    assert!((count - expected).abs() <= boundary, "opaque = {}", count);

    assert!(opaque_at(&mask, 750.0, 750.0));
    assert!(opaque_at(&mask, 1750.0, 1250.0));
    assert!(!opaque_at(&mask, 1250.0, 1250.0));
    assert!(!opaque_at(&mask, 250.0, 250.0));
    assert!(!opaque_at(&mask, 2200.0, 2200.0));
}

#[test]
fn test_overlapping_polygon_fills_hole() {
    let with_hole = square_with_hole((0.0, 0.0, 2000.0, 2000.0), (500.0, 500.0, 1500.0, 1500.0));
    let plug = square(400.0, 400.0, 1600.0, 1600.0);

    for polygons in [vec![with_hole.clone(), plug.clone()], vec![plug, with_hole]] {
        let mask = rasterize(&polygons);
        assert!(opaque_at(&mask, 1000.0, 1000.0));
        assert!(opaque_at(&mask, 600.0, 1400.0));
        assert!(opaque_at(&mask, 100.0, 100.0));
        assert!(!opaque_at(&mask, 2300.0, 2300.0));
    }
}

#[test]
fn test_hole_of_one_polygon_does_not_erase_neighbour() {
    // The second polygon sits entirely inside the first one's hole
    let ring_polygon =
        square_with_hole((200.0, 200.0, 2400.0, 2400.0), (600.0, 600.0, 2000.0, 2000.0));
    let island = square(1000.0, 1000.0, 1600.0, 1600.0);

    let mask = rasterize(&[island, ring_polygon]);
    assert!(opaque_at(&mask, 1300.0, 1300.0));
    assert!(!opaque_at(&mask, 800.0, 800.0));
    assert!(opaque_at(&mask, 400.0, 400.0));
}

// =============================================================================
// Orientation
// =============================================================================

#[test]
fn test_mask_is_north_up() {
    // Polygon covering only the northern quarter of the tile
    let north_strip = square(0.0, 1920.0, 2560.0, 2560.0);
    let mask = rasterize(&[north_strip]);

    assert!(mask.is_opaque(128, 0));
    assert!(mask.is_opaque(128, 60));
    assert!(!mask.is_opaque(128, 70));
    assert!(!mask.is_opaque(128, 255));
    assert_eq!(mask.pixel(128, 0), MASK_FILL);
}

#[test]
fn test_ring_orientation_does_not_matter() {
    let ccw = Polygon::new(
        ring(&[(300.0, 300.0), (1800.0, 300.0), (1800.0, 1800.0), (300.0, 1800.0)]),
        vec![ring(&[(800.0, 800.0), (1200.0, 800.0), (1200.0, 1200.0), (800.0, 1200.0)])],
    );
    let cw = Polygon::new(
        ring(&[(300.0, 300.0), (300.0, 1800.0), (1800.0, 1800.0), (1800.0, 300.0)]),
        vec![ring(&[(800.0, 800.0), (800.0, 1200.0), (1200.0, 1200.0), (1200.0, 800.0)])],
    );

    assert_eq!(rasterize(&[ccw]), rasterize(&[cw]));
}

#[test]
fn test_polygon_crossing_tile_is_clipped() {
    let spill = square(-1000.0, -1000.0, 1280.0, 1280.0);
    let mask = rasterize(&[spill]);

    // South-west quarter of the tile
    assert!(opaque_at(&mask, 10.0, 10.0));
    assert!(opaque_at(&mask, 1200.0, 1200.0));
    assert!(!opaque_at(&mask, 1400.0, 100.0));
    assert!(!opaque_at(&mask, 100.0, 1400.0));
    assert_eq!(mask.opaque_count(), 128 * 128);
}

#[test]
fn test_invalid_polygon_skipped() {
    let broken = Polygon::new(ring(&[(0.0, 0.0), (f64::NAN, 5.0), (10.0, 10.0)]), vec![]);
    let valid = square(0.0, 0.0, 1280.0, 1280.0);

    let mask = rasterize(&[broken, valid]);
    assert_eq!(mask.opaque_count(), 128 * 128);
}

// =============================================================================
// Encoding
// =============================================================================

#[test]
fn test_encoded_mask_decodes() {
    let mask = rasterize(&[square(0.0, 0.0, 1280.0, 2560.0)]);
    let encoded = MaskEncoder::new().encode(&mask).unwrap();

    let decoded = ImageReader::new(Cursor::new(&encoded[..]))
        .with_guessed_format()
        .unwrap()
        .decode()
        .unwrap();
    assert_eq!(decoded.color(), ColorType::La8);
    assert_eq!((decoded.width(), decoded.height()), (256, 256));
    assert_eq!(&decoded.to_luma_alpha8(), mask.as_image());
}
