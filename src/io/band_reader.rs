use crate::types::{
    BandImage, CoordinateSystem, DistError, DistResult, GeoTransform, RasterBand,
};
use gdal::Dataset;

/// Single-band GeoTIFF reader for DIST-ALERT tiles
pub struct BandReader;

impl BandReader {
    /// Read band 1 of a GeoTIFF, local or `http(s)://`, multiplied by its scale factor
    pub fn read_band(location: &str, name: &str) -> DistResult<RasterBand> {
        let gdal_path = Self::gdal_path(location);
        log::info!("Reading band {} from: {}", name, gdal_path);

        let dataset = Dataset::open(&gdal_path)?;

        let raster_count = dataset.raster_count();
        if raster_count > 1 {
            log::warn!(
                "{} holds {} bands; only band 1 is read",
                location,
                raster_count
            );
        }

        let (width, height) = dataset.raster_size();
        let geo_transform = GeoTransform::from_gdal(dataset.geo_transform()?);
        let coordinate_system = Self::resolve_crs(&dataset)?;

        log::debug!("Band size: {}x{}", width, height);
        log::debug!("Band geotransform: {:?}", geo_transform);
        log::debug!("Band CRS: {}", coordinate_system);

        let rasterband = dataset.rasterband(1)?;
        let scale = rasterband.scale().unwrap_or(1.0);
        let band_data =
            rasterband.read_as::<f32>((0, 0), (width, height), (width, height), None)?;

        let raw = BandImage::from_shape_vec((height, width), band_data.data)
            .map_err(|e| DistError::Processing(format!("Failed to reshape band data: {}", e)))?;
        let data = Self::apply_scale(raw, scale);

        log::debug!("Applied scale factor {} to {}", scale, name);

        Ok(RasterBand {
            name: name.to_string(),
            data,
            scale,
            coordinate_system,
            y: geo_transform.y_coords(height),
            x: geo_transform.x_coords(width),
            geo_transform,
        })
    }

    /// Map a location onto a path GDAL can open; remote files go through `/vsicurl/`
    pub fn gdal_path(location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            format!("/vsicurl/{}", location)
        } else {
            location.to_string()
        }
    }

    fn apply_scale(data: BandImage, scale: f64) -> BandImage {
        if scale == 1.0 {
            return data;
        }
        let factor = scale as f32;
        data.mapv_into(|v| v * factor)
    }

    /// Resolve an authority code when GDAL can identify one, else keep the WKT.
    /// A file without projection metadata is `Unspecified`; a projection GDAL
    /// cannot parse is an error.
    fn resolve_crs(dataset: &Dataset) -> DistResult<CoordinateSystem> {
        if dataset.projection().trim().is_empty() {
            log::warn!("Band has no projection metadata");
            return Ok(CoordinateSystem::Unspecified);
        }

        let mut srs = dataset.spatial_ref()?;

        if srs.auth_code().is_err() {
            // Only helps when the WKT lacks an AUTHORITY node
            if let Err(e) = srs.auto_identify_epsg() {
                log::debug!("No EPSG code identified for band CRS: {}", e);
            }
        }

        match (srs.auth_name(), srs.auth_code()) {
            (Ok(auth), Ok(code)) if auth.eq_ignore_ascii_case("EPSG") && code > 0 => {
                Ok(CoordinateSystem::Epsg(code as u32))
            }
            _ => Ok(CoordinateSystem::Wkt(srs.to_wkt()?)),
        }
    }
}
