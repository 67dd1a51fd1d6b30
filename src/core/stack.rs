use crate::io::BandReader;
use crate::types::{
    BandCube, BandImage, CoordinateSystem, DistError, DistResult, GeoTransform, RasterBand,
};
use ndarray::{ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Band stacking parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackParams {
    /// Common prefix of every band file; the band name and `.tif` are appended
    pub base_path: String,
    /// Bands to load, in stack order
    pub band_names: Vec<String>,
}

impl Default for StackParams {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            band_names: vec![
                crate::types::VEG_DIST_STATUS.to_string(),
                crate::types::VEG_DIST_DATE.to_string(),
                crate::types::VEG_ANOM_MAX.to_string(),
            ],
        }
    }
}

impl StackParams {
    pub fn new(base_path: impl Into<String>, band_names: &[&str]) -> Self {
        Self {
            base_path: base_path.into(),
            band_names: band_names.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// `<base><BAND-NAME>.tif`
    pub fn band_path(&self, band_name: &str) -> String {
        format!("{}{}.tif", self.base_path, band_name)
    }

    pub fn validate(&self) -> DistResult<()> {
        if self.band_names.is_empty() {
            return Err(DistError::Config("No bands requested for stacking".to_string()));
        }
        Ok(())
    }
}

/// Co-registered bands stacked along a leading band axis (band x row x column)
#[derive(Debug, Clone)]
pub struct BandStack {
    data: BandCube,
    names: Vec<String>,
    scales: Vec<f64>,
    coordinate_system: CoordinateSystem,
    geo_transform: GeoTransform,
    y: Vec<f64>,
    x: Vec<f64>,
}

impl BandStack {
    /// Start a stack from its first band
    pub fn from_band(band: RasterBand) -> Self {
        Self {
            data: band.data.insert_axis(Axis(0)),
            names: vec![band.name],
            scales: vec![band.scale],
            coordinate_system: band.coordinate_system,
            geo_transform: band.geo_transform,
            y: band.y,
            x: band.x,
        }
    }

    /// Append a band as the next 1-based index
    pub fn push(mut self, band: RasterBand) -> DistResult<Self> {
        let (rows, cols) = self.grid_dim();
        if band.dim() != (rows, cols) {
            return Err(DistError::ShapeMismatch(format!(
                "band {} is {:?}, stack grid is {:?}",
                band.name,
                band.dim(),
                (rows, cols)
            )));
        }
        if band.x != self.x || band.y != self.y {
            log::warn!("Band {} coordinate axes differ from the stack's", band.name);
        }
        if band.coordinate_system != self.coordinate_system {
            log::warn!(
                "Band {} CRS {} differs from stack CRS {}",
                band.name,
                band.coordinate_system,
                self.coordinate_system
            );
        }

        self.data.push(Axis(0), band.data.view())?;
        self.names.push(band.name);
        self.scales.push(band.scale);
        Ok(self)
    }

    /// Stack in-memory bands in order
    pub fn from_bands<I>(bands: I) -> DistResult<Self>
    where
        I: IntoIterator<Item = RasterBand>,
    {
        Self::try_from_bands(bands.into_iter().map(Ok))
    }

    /// Left fold over band loads: the first seeds the stack, the rest are appended.
    /// The first failed load aborts the fold.
    pub fn try_from_bands<I>(bands: I) -> DistResult<Self>
    where
        I: IntoIterator<Item = DistResult<RasterBand>>,
    {
        let mut bands = bands.into_iter();
        let first = bands
            .next()
            .ok_or_else(|| DistError::Config("Cannot stack an empty band list".to_string()))??;
        bands.try_fold(Self::from_band(first), |stack, band| stack.push(band?))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Row and column counts shared by every band
    pub fn grid_dim(&self) -> (usize, usize) {
        let (_, rows, cols) = self.data.dim();
        (rows, cols)
    }

    pub fn data(&self) -> &BandCube {
        &self.data
    }

    pub fn into_data(self) -> BandCube {
        self.data
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    pub fn coordinate_system(&self) -> &CoordinateSystem {
        &self.coordinate_system
    }

    pub fn geo_transform(&self) -> &GeoTransform {
        &self.geo_transform
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// 1-based band indices, in stack order
    pub fn band_indices(&self) -> Vec<usize> {
        (1..=self.len()).collect()
    }

    /// Band grid by 1-based index
    pub fn band(&self, index: usize) -> Option<ArrayView2<'_, f32>> {
        if index == 0 || index > self.len() {
            return None;
        }
        Some(self.data.index_axis(Axis(0), index - 1))
    }

    /// Band grid by name
    pub fn band_by_name(&self, name: &str) -> Option<ArrayView2<'_, f32>> {
        let position = self.names.iter().position(|n| n == name)?;
        self.band(position + 1)
    }

    /// Copy one band back out with the stack's spatial metadata
    pub fn raster_band(&self, index: usize) -> Option<RasterBand> {
        let data: BandImage = self.band(index)?.to_owned();
        Some(RasterBand {
            name: self.names[index - 1].clone(),
            data,
            scale: self.scales[index - 1],
            coordinate_system: self.coordinate_system.clone(),
            geo_transform: self.geo_transform,
            y: self.y.clone(),
            x: self.x.clone(),
        })
    }
}

/// Loads the bands named by [`StackParams`] and stacks them
pub struct BandStacker {
    params: StackParams,
}

impl BandStacker {
    pub fn new(params: StackParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &StackParams {
        &self.params
    }

    /// Load every band and stack them; any load failure aborts the whole stack
    pub fn stack(&self) -> DistResult<BandStack> {
        self.params.validate()?;

        log::info!(
            "Stacking {} bands from {}",
            self.params.band_names.len(),
            self.params.base_path
        );

        let bands = self
            .params
            .band_names
            .iter()
            .map(|name| BandReader::read_band(&self.params.band_path(name), name));
        let stack = BandStack::try_from_bands(bands)?;

        log::info!(
            "Band stack complete: {} bands of {:?}, CRS {}",
            stack.len(),
            stack.grid_dim(),
            stack.coordinate_system()
        );
        Ok(stack)
    }
}
