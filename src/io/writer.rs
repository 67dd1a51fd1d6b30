use crate::core::extent::ExtentTimeSeries;
use crate::types::{BandImage, CoordinateSystem, DistError, DistResult, GeoTransform, RasterBand};
use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager, Metadata};
use std::path::Path;

/// GeoTIFF export for bands and extent time series
pub struct GeoTiffWriter;

impl GeoTiffWriter {
    /// Save a single band as a float GeoTIFF, keeping its transform, CRS and scale
    pub fn write_band<P: AsRef<Path>>(band: &RasterBand, output_path: P) -> DistResult<()> {
        log::info!("Saving band {} as GeoTIFF: {}", band.name, output_path.as_ref().display());

        if !(band.scale.is_finite() && band.scale != 0.0) {
            return Err(DistError::Config(format!(
                "Band {} has unusable scale factor {}",
                band.name, band.scale
            )));
        }

        let (height, width) = band.dim();
        let mut dataset = Self::create(output_path.as_ref(), width, height, 1)?;
        Self::set_georeference(&mut dataset, &band.geo_transform, &band.coordinate_system)?;

        // Store raw values so readers that apply the scale recover `band.data`
        let raw = if band.scale != 1.0 {
            let factor = band.scale as f32;
            band.data.mapv(|v| v / factor)
        } else {
            band.data.clone()
        };

        let mut rasterband = dataset.rasterband(1)?;
        Self::write_grid(&mut rasterband, &raw)?;
        if band.scale != 1.0 {
            rasterband.set_scale(band.scale)?;
        }
        rasterband.set_metadata_item("BAND_NAME", &band.name, "")?;

        Ok(())
    }

    /// Save an extent time series as a multi-band GeoTIFF, one band per snapshot
    pub fn write_time_series<P: AsRef<Path>>(
        series: &ExtentTimeSeries,
        transform: &GeoTransform,
        crs: &CoordinateSystem,
        output_path: P,
    ) -> DistResult<()> {
        log::info!(
            "Saving {} extent snapshots as GeoTIFF: {}",
            series.len(),
            output_path.as_ref().display()
        );

        let (height, width) = series.dim().ok_or_else(|| {
            DistError::Processing("Cannot write an empty extent time series".to_string())
        })?;

        let mut dataset = Self::create(output_path.as_ref(), width, height, series.len())?;
        Self::set_georeference(&mut dataset, transform, crs)?;

        for (i, snapshot) in series.snapshots().iter().enumerate() {
            let mut rasterband = dataset.rasterband((i + 1) as isize)?;
            Self::write_grid(&mut rasterband, &snapshot.extent)?;
            rasterband.set_no_data_value(Some(f64::NAN))?;
            rasterband.set_metadata_item("DATE", &snapshot.date, "")?;
            rasterband.set_metadata_item("DAY_INDEX", &snapshot.day_index.to_string(), "")?;
            rasterband.set_metadata_item("AREA", &snapshot.area_label, "")?;
            log::debug!("Wrote snapshot {} ({})", snapshot.day_index, snapshot.date);
        }

        Ok(())
    }

    fn create(path: &Path, width: usize, height: usize, bands: usize) -> DistResult<Dataset> {
        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let dataset = driver.create_with_band_type::<f32, _>(
            path,
            width as isize,
            height as isize,
            bands as isize,
        )?;
        Ok(dataset)
    }

    fn set_georeference(
        dataset: &mut Dataset,
        transform: &GeoTransform,
        crs: &CoordinateSystem,
    ) -> DistResult<()> {
        dataset.set_geo_transform(&transform.to_gdal())?;

        match crs {
            CoordinateSystem::Epsg(code) => {
                dataset.set_spatial_ref(&SpatialRef::from_epsg(*code)?)?;
            }
            CoordinateSystem::Wkt(wkt) => {
                dataset.set_spatial_ref(&SpatialRef::from_wkt(wkt)?)?;
            }
            CoordinateSystem::Unspecified => {
                log::warn!("Writing GeoTIFF without a coordinate reference system");
            }
        }
        Ok(())
    }

    fn write_grid(rasterband: &mut gdal::raster::RasterBand, grid: &BandImage) -> DistResult<()> {
        let (height, width) = grid.dim();
        let flat_data: Vec<f32> = grid.iter().cloned().collect();
        let buffer = Buffer::new((width, height), flat_data);
        rasterband.write((0, 0), (width, height), &buffer)?;
        Ok(())
    }
}
