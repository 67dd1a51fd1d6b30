use distalert::core::{BandStacker, StackParams};
use distalert::types::{BandImage, CoordinateSystem, DistError, GeoTransform, RasterBand};
use distalert::{BandReader, GeoTiffWriter};
use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::DriverManager;
use std::path::Path;

const TILE_TRANSFORM: [f64; 6] = [399960.0, 30.0, 0.0, 3800040.0, 0.0, -30.0];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Write raw values with a declared scale factor, the way DIST-ALERT tiles ship
fn write_raw_band(path: &Path, raw: &BandImage, scale: Option<f64>) {
    write_raw_band_with_crs(path, raw, scale, Some(32611));
}

fn write_raw_band_with_crs(path: &Path, raw: &BandImage, scale: Option<f64>, epsg: Option<u32>) {
    let (height, width) = raw.dim();
    let driver = DriverManager::get_driver_by_name("GTiff").expect("GTiff driver");
    let mut dataset = driver
        .create_with_band_type::<f32, _>(path, width as isize, height as isize, 1)
        .expect("Failed to create test GeoTIFF");
    dataset.set_geo_transform(&TILE_TRANSFORM).unwrap();
    if let Some(code) = epsg {
        dataset
            .set_spatial_ref(&SpatialRef::from_epsg(code).unwrap())
            .unwrap();
    }

    let mut rasterband = dataset.rasterband(1).unwrap();
    let buffer = Buffer::new((width, height), raw.iter().cloned().collect());
    rasterband.write((0, 0), (width, height), &buffer).unwrap();
    if let Some(scale) = scale {
        rasterband.set_scale(scale).unwrap();
    }
}

fn ramp(rows: usize, cols: usize, offset: f32) -> BandImage {
    BandImage::from_shape_fn((rows, cols), |(r, c)| offset + (r * cols + c) as f32)
}

#[test]
fn test_stack_applies_declared_scale() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let base = format!("{}/OPERA_L3_DIST-ALERT-HLS_T11SLT_", dir.path().display());

    let status = ramp(6, 8, 0.0);
    let date = ramp(6, 8, 100.0);
    let anomaly = ramp(6, 8, 10.0);
    write_raw_band(Path::new(&format!("{}VEG-DIST-STATUS.tif", base)), &status, None);
    write_raw_band(Path::new(&format!("{}VEG-DIST-DATE.tif", base)), &date, Some(1.0));
    write_raw_band(Path::new(&format!("{}VEG-ANOM-MAX.tif", base)), &anomaly, Some(0.5));

    let params = StackParams::new(base, &["VEG-DIST-STATUS", "VEG-DIST-DATE", "VEG-ANOM-MAX"]);
    let stack = BandStacker::new(params).stack().expect("Failed to stack bands");

    assert_eq!(stack.len(), 3);
    assert_eq!(stack.data().dim(), (3, 6, 8));
    assert_eq!(stack.band_indices(), vec![1, 2, 3]);
    assert_eq!(stack.names(), &["VEG-DIST-STATUS", "VEG-DIST-DATE", "VEG-ANOM-MAX"]);
    assert_eq!(stack.scales(), &[1.0, 1.0, 0.5]);

    assert_eq!(stack.band(1).unwrap(), status.view());
    assert_eq!(stack.band(2).unwrap(), date.view());
    let expected_anomaly = anomaly.mapv(|v| v * 0.5);
    assert_eq!(stack.band_by_name("VEG-ANOM-MAX").unwrap(), expected_anomaly.view());
}

#[test]
fn test_stack_crs_and_axes_from_first_band() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let base = format!("{}/tile_", dir.path().display());

    for name in ["VEG-DIST-STATUS", "VEG-DIST-DATE"] {
        write_raw_band(Path::new(&format!("{}{}.tif", base, name)), &ramp(4, 5, 1.0), None);
    }

    let stack = BandStacker::new(StackParams::new(base, &["VEG-DIST-STATUS", "VEG-DIST-DATE"]))
        .stack()
        .unwrap();

    assert_eq!(stack.coordinate_system(), &CoordinateSystem::Epsg(32611));
    assert_eq!(stack.coordinate_system().to_string(), "EPSG:32611");
    assert_eq!(stack.x(), &[399975.0, 400005.0, 400035.0, 400065.0, 400095.0]);
    assert_eq!(stack.y().len(), 4);
    assert_eq!(stack.y()[0], 3800025.0);
}

#[test]
fn test_missing_band_aborts_stack() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let base = format!("{}/tile_", dir.path().display());
    write_raw_band(Path::new(&format!("{}VEG-DIST-STATUS.tif", base)), &ramp(3, 3, 0.0), None);

    let params = StackParams::new(base, &["VEG-DIST-STATUS", "VEG-DIST-DATE"]);
    let result = BandStacker::new(params).stack();
    assert!(matches!(result, Err(DistError::Gdal(_))));
}

#[test]
fn test_mismatched_band_shape_rejected() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let base = format!("{}/tile_", dir.path().display());
    write_raw_band(Path::new(&format!("{}VEG-DIST-STATUS.tif", base)), &ramp(3, 3, 0.0), None);
    write_raw_band(Path::new(&format!("{}VEG-DIST-DATE.tif", base)), &ramp(4, 3, 0.0), None);

    let params = StackParams::new(base, &["VEG-DIST-STATUS", "VEG-DIST-DATE"]);
    let result = BandStacker::new(params).stack();
    assert!(matches!(result, Err(DistError::ShapeMismatch(_))));
}

#[test]
fn test_writer_round_trip_keeps_scale() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("VEG-ANOM-MAX.tif");

    let mut band = RasterBand::from_array(
        "VEG-ANOM-MAX",
        ramp(5, 5, 0.0).mapv(|v| v * 0.25),
        GeoTransform::from_gdal(TILE_TRANSFORM),
        CoordinateSystem::Epsg(32611),
    );
    band.scale = 0.25;

    GeoTiffWriter::write_band(&band, &path).expect("Failed to write band");
    let read = BandReader::read_band(path.to_str().unwrap(), "VEG-ANOM-MAX")
        .expect("Failed to read band");

    assert_eq!(read.dim(), (5, 5));
    assert_eq!(read.scale, 0.25);
    assert_eq!(read.data, band.data);
    assert!(read.is_coregistered(&band));
}

#[test]
fn test_band_without_projection_is_unspecified() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let base = format!("{}/tile_", dir.path().display());
    for name in ["VEG-DIST-STATUS", "VEG-DIST-DATE"] {
        let path = format!("{}{}.tif", base, name);
        write_raw_band_with_crs(Path::new(&path), &ramp(3, 3, 0.0), None, None);
    }

    let stack = BandStacker::new(StackParams::new(base, &["VEG-DIST-STATUS", "VEG-DIST-DATE"]))
        .stack()
        .expect("A band without projection metadata still stacks");

    assert_eq!(stack.coordinate_system(), &CoordinateSystem::Unspecified);
    assert_eq!(stack.coordinate_system().to_string(), "unspecified");
}

#[test]
fn test_writer_rejects_zero_scale() {
    let dir = tempfile::tempdir().unwrap();
    let mut band = RasterBand::from_array(
        "VEG-ANOM-MAX",
        ramp(2, 2, 1.0),
        GeoTransform::from_gdal(TILE_TRANSFORM),
        CoordinateSystem::Epsg(32611),
    );
    band.scale = 0.0;

    let result = GeoTiffWriter::write_band(&band, dir.path().join("zero_scale.tif"));
    assert!(matches!(result, Err(DistError::Config(_))));
    assert!(!dir.path().join("zero_scale.tif").exists());
}
