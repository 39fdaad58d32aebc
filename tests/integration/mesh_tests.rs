//! Mesh generation integration tests.
//!
//! Tests verify:
//! - Tile dimensions and counts on reference canvases
//! - Edge sharing without overlap, and overlap spacing with it
//! - Safety margin and overlap applied together
//! - The tile-extent JSON hand-off reloads bit-identically
//! - Row/column positions follow the enumeration order

use tile_masker::error::ConfigError;
use tile_masker::geometry::{Extent, PixelSize, ResolutionTable};
use tile_masker::io::{load_extents, save_extents, save_qa_geojson};
use tile_masker::mesh::{tile_positions, MeshGenerator, TileNaming, TileSpec};

use super::test_utils::{test_generator, test_spec, TEST_RESOLUTION, TEST_ZOOM};

fn reference_canvas() -> Extent {
    Extent::new(0.0, 0.0, 20000.0, 10000.0).unwrap()
}

// =============================================================================
// Reference Scenario
// =============================================================================

#[test]
fn test_reference_canvas_gives_32_tiles() {
    let tiles = test_generator()
        .generate(&reference_canvas(), &test_spec())
        .unwrap();

    assert_eq!(tiles.len(), 32);
    assert_eq!(tiles[0].to_array(), [0.0, 7440.0, 2560.0, 10000.0]);

    let positions = tile_positions(&tiles);
    let last = positions.last().unwrap();
    assert_eq!((last.row, last.column), (4, 8));
}

#[test]
fn test_tiles_cover_working_area() {
    let tiles = test_generator()
        .generate(&reference_canvas(), &test_spec())
        .unwrap();

    let max_east = tiles.iter().map(|t| t.east).fold(f64::MIN, f64::max);
    let min_south = tiles.iter().map(|t| t.south).fold(f64::MAX, f64::min);
    let min_west = tiles.iter().map(|t| t.west).fold(f64::MAX, f64::min);
    let max_north = tiles.iter().map(|t| t.north).fold(f64::MIN, f64::max);

    // Excess only at the far (east and south) edges
    assert_eq!(min_west, 0.0);
    assert_eq!(max_north, 10000.0);
    assert!(max_east >= 20000.0);
    assert!(min_south <= 0.0);
}

// =============================================================================
// Tile Geometry
// =============================================================================

#[test]
fn test_tile_size_independent_of_overlap() {
    let generator = MeshGenerator::new(ResolutionTable::web_mercator());
    let canvas = Extent::new(144000.0, 6115000.0, 154000.0, 6125000.0).unwrap();

    for overlap in [0.0, 0.1, 0.25, 0.5, 0.9] {
        let spec = TileSpec::new(PixelSize::new(512, 256), 14).with_overlap(overlap);
        let resolution = generator.resolutions().resolution(14).unwrap();
        let tile_width = 512.0 * resolution;
        let tile_height = 256.0 * resolution;

        for tile in generator.generate(&canvas, &spec).unwrap() {
            assert!((tile.width() - tile_width).abs() < 1e-6 * tile_width);
            assert!((tile.height() - tile_height).abs() < 1e-6 * tile_height);
        }
    }
}

#[test]
fn test_no_overlap_shares_edges() {
    let tiles = test_generator()
        .generate(&reference_canvas(), &test_spec())
        .unwrap();

    for row in tiles.chunks(8) {
        for pair in row.windows(2) {
            assert_eq!(pair[0].east, pair[1].west);
            assert_eq!(pair[0].north, pair[1].north);
        }
    }
    for (upper, lower) in tiles.iter().zip(tiles.iter().skip(8)) {
        assert_eq!(upper.south, lower.north);
    }
}

#[test]
fn test_overlap_spacing() {
    let spec = test_spec().with_overlap(0.25);
    let generator = test_generator();
    let layout = generator.layout(&reference_canvas(), &spec).unwrap();
    let tiles = generator.generate(&reference_canvas(), &spec).unwrap();

    let tile_width = 256.0 * TEST_RESOLUTION;
    for row in tiles.chunks(layout.columns) {
        for pair in row.windows(2) {
            assert_eq!(pair[0].east - pair[1].west, 0.25 * tile_width);
        }
    }
}

#[test]
fn test_safety_margin_with_overlap() {
    let spec = test_spec().with_safety_margin(0.1).with_overlap(0.5);
    let tiles = test_generator()
        .generate(&Extent::new(0.0, 0.0, 10000.0, 10000.0).unwrap(), &spec)
        .unwrap();

    // Working area 8000 x 8000 stepped by 1280 from the margin origin
    assert_eq!(tiles.len(), 36);
    assert_eq!(tiles[0].to_array(), [1000.0, 6440.0, 3560.0, 9000.0]);
    assert_eq!(tiles[1].west, 2280.0);
    assert_eq!(tiles[6].north, 7720.0);
    assert!(tiles.iter().all(|t| t.west >= 1000.0 && t.north <= 9000.0));
}

#[test]
fn test_canvas_smaller_than_tile() {
    let canvas = Extent::new(500.0, 500.0, 1500.0, 1000.0).unwrap();
    let tiles = test_generator().generate(&canvas, &test_spec()).unwrap();

    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].west, 500.0);
    assert_eq!(tiles[0].north, 1000.0);
}

#[test]
fn test_multiple_canvases_concatenate() {
    let canvases = [
        reference_canvas(),
        Extent::new(0.0, -20000.0, 5000.0, -15000.0).unwrap(),
    ];
    let tiles = test_generator()
        .generate_all(&canvases, &test_spec())
        .unwrap();

    assert_eq!(tiles.len(), 32 + 4);
    assert_eq!(tiles[32].to_array(), [0.0, -17560.0, 2560.0, -15000.0]);

    // The second canvas starts a new row
    let positions = tile_positions(&tiles);
    assert_eq!((positions[32].row, positions[32].column), (5, 1));
}

// =============================================================================
// Configuration Errors
// =============================================================================

#[test]
fn test_invalid_specs_fail_before_tiling() {
    let generator = test_generator();
    let canvas = reference_canvas();

    assert!(matches!(
        generator.generate(&canvas, &test_spec().with_overlap(1.0)),
        Err(ConfigError::InvalidOverlap(_))
    ));
    assert!(matches!(
        generator.generate(&canvas, &test_spec().with_safety_margin(0.5)),
        Err(ConfigError::InvalidSafetyMargin(_))
    ));
    assert!(matches!(
        generator.generate(&canvas, &TileSpec::new(PixelSize::new(0, 256), TEST_ZOOM)),
        Err(ConfigError::InvalidPixelSize { .. })
    ));
    assert!(matches!(
        generator.generate(&canvas, &TileSpec::new(PixelSize::square(256), 7)),
        Err(ConfigError::UnknownZoomLevel { zoom: 7, .. })
    ));
}

#[test]
fn test_one_bad_canvas_fails_whole_batch() {
    let degenerate = Extent {
        west: 0.0,
        south: 0.0,
        east: 0.0,
        north: 10.0,
    };
    let result = test_generator().generate_all(&[reference_canvas(), degenerate], &test_spec());
    assert!(matches!(result, Err(ConfigError::InvalidExtent { .. })));
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_hand_off_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tile_extents.json");

    let generator = MeshGenerator::new(ResolutionTable::web_mercator());
    let canvas = Extent::new(144000.0, 6115000.0, 154000.0, 6125000.0).unwrap();
    let spec = TileSpec::new(PixelSize::square(256), 17)
        .with_overlap(0.3)
        .with_safety_margin(0.05);
    let tiles = generator.generate(&canvas, &spec).unwrap();
    assert!(tiles.len() > 100);

    save_extents(&path, &tiles).unwrap();
    let reloaded = load_extents(&path).unwrap();

    assert_eq!(reloaded.len(), tiles.len());
    for (a, b) in tiles.iter().zip(&reloaded) {
        for (x, y) in a.to_array().iter().zip(b.to_array()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }
}

#[test]
fn test_qa_geojson_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiles.geojson");
    let tiles = test_generator()
        .generate(&reference_canvas(), &test_spec())
        .unwrap();

    save_qa_geojson(&path, &tiles).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["type"], "FeatureCollection");
    assert_eq!(value["features"].as_array().unwrap().len(), 32);
    assert_eq!(value["features"][9]["properties"]["row"], 2);
    assert_eq!(value["features"][9]["properties"]["column"], 2);
}

// =============================================================================
// Naming
// =============================================================================

#[test]
fn test_names_follow_enumeration_order() {
    let tiles = test_generator()
        .generate(&reference_canvas(), &test_spec())
        .unwrap();
    let positions = tile_positions(&tiles);

    assert_eq!(TileNaming::Index.mask_file_name(&positions[0]), "1_mask.png");
    assert_eq!(TileNaming::Grid.mask_file_name(&positions[0]), "r1_c1_mask.png");
    assert_eq!(TileNaming::Grid.mask_file_name(&positions[8]), "r2_c1_mask.png");
    assert_eq!(TileNaming::Grid.image_file_name(&positions[31]), "r4_c8.png");
}
