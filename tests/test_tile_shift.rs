mod common;

use approx::assert_abs_diff_eq;
use insar_prep::core::{shift_for_antimeridian, shift_tile};
use insar_prep::io::RasterInfo;
use insar_prep::InsarError;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_shift_western_tile() {
    let _ = env_logger::builder().is_test(true).try_init();
    let tiles = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let western = common::write_tile(tiles.path(), 51, -180);

    let shifted = shift_tile(&western, scratch.path()).unwrap();
    assert_eq!(
        shifted,
        scratch.path().join("Copernicus_DSM_COG_10_N51_00_W180_00_DEM.vrt")
    );

    let info = RasterInfo::read_tile(&shifted.to_string_lossy()).unwrap();
    assert_eq!((info.width, info.height), (common::TILE_PIXELS, common::TILE_PIXELS));
    let (ulx, uly) = info.upper_left();
    let (lrx, lry) = info.lower_right();
    assert_abs_diff_eq!(ulx, 180.0, epsilon = 1e-9);
    assert_abs_diff_eq!(uly, 52.0, epsilon = 1e-9);
    assert_abs_diff_eq!(lrx, 181.0, epsilon = 1e-9);
    assert_abs_diff_eq!(lry, 51.0, epsilon = 1e-9);

    // the source tile is left untouched
    let original = RasterInfo::read_tile(&western).unwrap();
    assert_abs_diff_eq!(original.upper_left().0, -180.0, epsilon = 1e-9);
}

#[test]
fn test_shift_for_antimeridian_keeps_order() {
    let tiles = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let input = vec![
        common::write_tile(tiles.path(), 51, 179),
        common::write_tile(tiles.path(), 51, -180),
        common::write_tile(tiles.path(), 52, 179),
        common::write_tile(tiles.path(), 52, -180),
    ];

    let output = shift_for_antimeridian(&input, scratch.path()).unwrap();
    assert_eq!(output.len(), 4);
    assert_eq!(output[0], input[0]);
    assert_eq!(output[2], input[2]);
    assert!(output[1].ends_with("Copernicus_DSM_COG_10_N51_00_W180_00_DEM.vrt"));
    assert!(output[3].ends_with("Copernicus_DSM_COG_10_N52_00_W180_00_DEM.vrt"));

    for shifted in [&output[1], &output[3]] {
        assert!(Path::new(shifted).starts_with(scratch.path()));
        let info = RasterInfo::read_tile(shifted).unwrap();
        assert_abs_diff_eq!(info.upper_left().0, 180.0, epsilon = 1e-9);
    }
}

#[test]
fn test_missing_western_tile() {
    let scratch = TempDir::new().unwrap();
    let missing = "/nonexistent/Copernicus_DSM_COG_10_N51_00_W180_00_DEM.tif".to_string();

    match shift_for_antimeridian(&[missing.clone()], scratch.path()) {
        Err(InsarError::TileRead { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected TileRead, got {:?}", other),
    }
}

#[test]
#[ignore = "requires network access to the Copernicus DEM bucket"]
fn test_shift_remote_tile() {
    let scratch = TempDir::new().unwrap();
    let input = vec![
        "/vsicurl/https://copernicus-dem-30m.s3.eu-central-1.amazonaws.com/\
         Copernicus_DSM_COG_10_N51_00_W180_00_DEM/Copernicus_DSM_COG_10_N51_00_W180_00_DEM.tif"
            .to_string(),
        "/vsicurl/https://copernicus-dem-30m.s3.eu-central-1.amazonaws.com/\
         Copernicus_DSM_COG_10_N51_00_E179_00_DEM/Copernicus_DSM_COG_10_N51_00_E179_00_DEM.tif"
            .to_string(),
    ];

    let output = shift_for_antimeridian(&input, scratch.path()).unwrap();
    assert_eq!(output[1], input[1]);

    let info = RasterInfo::read_tile(&output[0]).unwrap();
    let (ulx, uly) = info.upper_left();
    let (lrx, lry) = info.lower_right();
    assert_abs_diff_eq!(ulx, 179.9997917, epsilon = 1e-6);
    assert_abs_diff_eq!(uly, 52.0001389, epsilon = 1e-6);
    assert_abs_diff_eq!(lrx, 180.9997917, epsilon = 1e-6);
    assert_abs_diff_eq!(lry, 51.0001389, epsilon = 1e-6);
}
