use cropmask::io::{ExportParams, GeoTiffExporter};
use cropmask::types::{BoundingBox, CdlMetadata, GeoTransform, MaskImage, MASK_NODATA};
use gdal::Dataset;

const DEG_PER_30M: f64 = 30.0 / 111_320.0;

fn test_metadata(height: usize, width: usize) -> CdlMetadata {
    CdlMetadata {
        year: 2012,
        width,
        height,
        geo_transform: GeoTransform::from_gdal(&[
            -93.0,
            DEG_PER_30M,
            0.0,
            42.0,
            0.0,
            -DEG_PER_30M,
        ]),
        projection: String::new(),
        epsg: Some(4326),
        nodata: Some(0),
        acquired: None,
    }
}

fn block_mask(height: usize, width: usize) -> MaskImage {
    let mut mask = MaskImage::from_elem((height, width), MASK_NODATA);
    for i in 1..height - 1 {
        for j in 1..width - 1 {
            mask[[i, j]] = 1;
        }
    }
    mask
}

#[test]
fn test_geotiff_roundtrip() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("mask.tif");

    let mask = block_mask(12, 12);
    let metadata = test_metadata(12, 12);

    GeoTiffExporter::new()
        .export_mask(&mask, &metadata, &output)
        .expect("Export failed");

    let dataset = Dataset::open(&output).expect("Failed to open exported GeoTIFF");
    let band = dataset.rasterband(1).expect("Missing band");

    let width = band.x_size();
    let height = band.y_size();
    println!("Exported grid: {}x{}", height, width);
    assert!(width >= 12 && height >= 12);

    assert_eq!(band.no_data_value(), Some(MASK_NODATA as f64));

    let buffer = band
        .read_as::<u8>((0, 0), (width, height), (width, height), None)
        .expect("Failed to read band");
    let ones = buffer.data.iter().filter(|&&v| v == 1).count();
    println!("Foreground pixels after roundtrip: {}", ones);
    assert!(ones > 0, "Mask content lost in export");

    let gt = dataset.geo_transform().expect("Missing geotransform");
    assert!((gt[1] - DEG_PER_30M).abs() < 1e-9, "Pixel scale not honored");
}

#[test]
fn test_export_honors_region_window() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("windowed.tif");

    let mask = block_mask(20, 20);
    let metadata = test_metadata(20, 20);

    // Window covering roughly the left half of the grid
    let region = BoundingBox {
        min_lon: -93.0,
        max_lon: -93.0 + 10.0 * DEG_PER_30M,
        min_lat: 42.0 - 20.0 * DEG_PER_30M,
        max_lat: 42.0,
    };

    GeoTiffExporter::with_params(ExportParams {
        region: Some(region),
        ..ExportParams::default()
    })
    .export_mask(&mask, &metadata, &output)
    .expect("Windowed export failed");

    let dataset = Dataset::open(&output).expect("Failed to open exported GeoTIFF");
    let band = dataset.rasterband(1).expect("Missing band");
    assert!(
        band.x_size() <= 11,
        "Region window not applied: width {}",
        band.x_size()
    );
}

#[test]
fn test_export_rejects_oversized_output() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("too_big.tif");

    let mask = block_mask(12, 12);
    let metadata = test_metadata(12, 12);

    let result = GeoTiffExporter::with_params(ExportParams {
        max_pixels: 16,
        ..ExportParams::default()
    })
    .export_mask(&mask, &metadata, &output);

    assert!(result.is_err(), "maxPixels budget must be enforced");
    assert!(!output.exists(), "Rejected export must not leave a file");
}

#[test]
fn test_export_rejects_disjoint_region() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("disjoint.tif");

    let mask = block_mask(12, 12);
    let metadata = test_metadata(12, 12);

    let result = GeoTiffExporter::with_params(ExportParams {
        region: Some(BoundingBox {
            min_lon: 10.0,
            max_lon: 11.0,
            min_lat: 10.0,
            max_lat: 11.0,
        }),
        ..ExportParams::default()
    })
    .export_mask(&mask, &metadata, &output);

    assert!(result.is_err(), "A region outside the raster must be rejected");
}
