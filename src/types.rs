use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

/// Real-valued raster sample after scale normalization
pub type DistReal = f32;

/// 2D raster grid (row x column)
pub type BandImage = Array2<DistReal>;

/// 3D raster data for stacked bands or time series (band x row x column)
pub type BandCube = Array3<DistReal>;

/// Days since 2020-12-31, the DIST-ALERT native time encoding
pub type DayIndex = i64;

/// Well-known DIST-ALERT band names
pub const VEG_DIST_STATUS: &str = "VEG-DIST-STATUS";
pub const VEG_DIST_DATE: &str = "VEG-DIST-DATE";
pub const VEG_ANOM_MAX: &str = "VEG-ANOM-MAX";
pub const VEG_DIST_CONF: &str = "VEG-DIST-CONF";
pub const VEG_DIST_COUNT: &str = "VEG-DIST-COUNT";
pub const VEG_DIST_DUR: &str = "VEG-DIST-DUR";
pub const VEG_LAST_DATE: &str = "VEG-LAST-DATE";
pub const VEG_IND: &str = "VEG-IND";
pub const VEG_ANOM: &str = "VEG-ANOM";
pub const VEG_HIST: &str = "VEG-HIST";
pub const GEN_DIST_STATUS: &str = "GEN-DIST-STATUS";

/// Coordinate reference system identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// Authority code (e.g., EPSG:32611 for UTM 11N)
    Epsg(u32),
    /// Projection known only by its WKT definition
    Wkt(String),
    /// No projection metadata
    Unspecified,
}

impl std::fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateSystem::Epsg(code) => write!(f, "EPSG:{}", code),
            CoordinateSystem::Wkt(wkt) => write!(f, "{}", wkt),
            CoordinateSystem::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// Geospatial transformation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }

    /// Pixel-centre x coordinates for `cols` columns
    pub fn x_coords(&self, cols: usize) -> Vec<f64> {
        (0..cols)
            .map(|c| self.top_left_x + (c as f64 + 0.5) * self.pixel_width)
            .collect()
    }

    /// Pixel-centre y coordinates for `rows` rows
    pub fn y_coords(&self, rows: usize) -> Vec<f64> {
        (0..rows)
            .map(|r| self.top_left_y + (r as f64 + 0.5) * self.pixel_height)
            .collect()
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::from_gdal([0.0, 1.0, 0.0, 0.0, 0.0, -1.0])
    }
}

/// A single scale-normalized raster band with its spatial metadata
#[derive(Debug, Clone)]
pub struct RasterBand {
    pub name: String,
    pub data: BandImage,
    /// Scale factor the raw values were multiplied by
    pub scale: f64,
    pub coordinate_system: CoordinateSystem,
    pub geo_transform: GeoTransform,
    /// Latitude / northing of each row centre
    pub y: Vec<f64>,
    /// Longitude / easting of each column centre
    pub x: Vec<f64>,
}

impl RasterBand {
    /// Build a band from an in-memory grid, deriving coordinate axes from the transform
    pub fn from_array(
        name: impl Into<String>,
        data: BandImage,
        geo_transform: GeoTransform,
        coordinate_system: CoordinateSystem,
    ) -> Self {
        let (rows, cols) = data.dim();
        Self {
            name: name.into(),
            data,
            scale: 1.0,
            coordinate_system,
            geo_transform,
            y: geo_transform.y_coords(rows),
            x: geo_transform.x_coords(cols),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// True when both bands sit on the same grid axes and projection
    pub fn is_coregistered(&self, other: &RasterBand) -> bool {
        self.dim() == other.dim()
            && self.x == other.x
            && self.y == other.y
            && self.coordinate_system == other.coordinate_system
    }
}

/// Error types for DIST-ALERT processing
#[derive(Debug, thiserror::Error)]
pub enum DistError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Day index {0} is outside the representable calendar range")]
    DateOutOfRange(DayIndex),

    #[error("Processing error: {0}")]
    Processing(String),
}

/// Result type for DIST-ALERT operations
pub type DistResult<T> = Result<T, DistError>;
