//! Wildfire extent time series from DIST-ALERT status, date and anomaly bands
//!
//! Each snapshot keeps the disturbance status of pixels whose maximum anomaly
//! exceeds the threshold and whose disturbance date falls in `(start, day]`.
//! Masked pixels are NaN. The snapshot covers the whole tile while the burned
//! area only counts pixels inside the configured sub-window.

use crate::core::dates::standard_date;
use crate::core::stack::BandStack;
use crate::types::{
    BandCube, BandImage, DayIndex, DistError, DistResult, VEG_ANOM_MAX, VEG_DIST_DATE,
    VEG_DIST_STATUS,
};
use ndarray::{s, ArrayView2, Axis, Zip};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Area of one 30 m HLS pixel in square meters
pub const HLS_PIXEL_AREA_M2: f64 = 900.0;

const M2_PER_KM2: f64 = 1.0e6;

/// Half-open row/column window used for the area count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubWindow {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl SubWindow {
    pub fn new(row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Self {
        Self {
            row_start,
            row_end,
            col_start,
            col_end,
        }
    }

    /// Window covering any grid
    pub fn full() -> Self {
        Self::new(0, usize::MAX, 0, usize::MAX)
    }

    /// Row and column ranges clipped to a grid; inverted bounds give empty ranges
    pub fn clamp(&self, dim: (usize, usize)) -> (Range<usize>, Range<usize>) {
        let (rows, cols) = dim;
        let clip = |start: usize, end: usize, len: usize| {
            let end = end.min(len);
            start.min(end)..end
        };
        (
            clip(self.row_start, self.row_end, rows),
            clip(self.col_start, self.col_end, cols),
        )
    }
}

impl Default for SubWindow {
    fn default() -> Self {
        Self::full()
    }
}

/// Extent time series parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtentParams {
    /// Area-count window
    pub window: SubWindow,
    /// Minimum maximum-anomaly (exclusive) for a pixel to count as disturbed
    pub threshold: f32,
    /// Pixels must be disturbed strictly after this day
    pub start_day: DayIndex,
    /// First day index not produced
    pub end_day: DayIndex,
    /// Days between snapshots
    pub step: usize,
    /// Ground area of one pixel in square meters
    pub pixel_area_m2: f64,
}

impl Default for ExtentParams {
    fn default() -> Self {
        Self {
            window: SubWindow::full(),
            threshold: 50.0,
            start_day: 0,
            end_day: 365,
            step: 1,
            pixel_area_m2: HLS_PIXEL_AREA_M2,
        }
    }
}

impl ExtentParams {
    pub fn validate(&self) -> DistResult<()> {
        if self.step == 0 {
            return Err(DistError::Config("Day step must be positive".to_string()));
        }
        if self.threshold.is_nan() {
            return Err(DistError::Config("Anomaly threshold is NaN".to_string()));
        }
        if !(self.pixel_area_m2.is_finite() && self.pixel_area_m2 > 0.0) {
            return Err(DistError::Config(format!(
                "Pixel area must be positive, got {}",
                self.pixel_area_m2
            )));
        }
        Ok(())
    }

    /// Snapshot days: `start_day..end_day` by `step`, end excluded
    pub fn day_indices(&self) -> Vec<DayIndex> {
        if self.step == 0 {
            return Vec::new();
        }
        (self.start_day..self.end_day).step_by(self.step).collect()
    }
}

/// Names of the three bands the series is built from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistBandNames {
    pub status: String,
    pub date: String,
    pub anomaly: String,
}

impl Default for DistBandNames {
    fn default() -> Self {
        Self {
            status: VEG_DIST_STATUS.to_string(),
            date: VEG_DIST_DATE.to_string(),
            anomaly: VEG_ANOM_MAX.to_string(),
        }
    }
}

/// Mask the status band for one day; excluded pixels are NaN
pub fn extent_mask(
    status: ArrayView2<f32>,
    date: ArrayView2<f32>,
    anomaly: ArrayView2<f32>,
    threshold: f32,
    start_day: DayIndex,
    day: DayIndex,
) -> BandImage {
    let start = start_day as f64;
    let day = day as f64;
    Zip::from(&status)
        .and(&date)
        .and(&anomaly)
        .map_collect(|&s, &d, &a| {
            let d = d as f64;
            if a > threshold && d > start && d <= day {
                s
            } else {
                f32::NAN
            }
        })
}

/// Pixels with a positive value inside the window
pub fn count_burned(extent: ArrayView2<f32>, window: &SubWindow) -> usize {
    let (rows, cols) = window.clamp(extent.dim());
    extent
        .slice(s![rows, cols])
        .iter()
        .filter(|&&v| v > 0.0)
        .count()
}

/// Burned area inside the window in square kilometers
pub fn burned_area_km2(extent: ArrayView2<f32>, window: &SubWindow, pixel_area_m2: f64) -> f64 {
    count_burned(extent, window) as f64 * pixel_area_m2 / M2_PER_KM2
}

/// Area truncated toward zero with its unit
pub fn area_label(area_km2: f64) -> String {
    format!("{} kilometers squared", area_km2.trunc() as i64)
}

/// Masked extent for one day with its date and burned area
#[derive(Debug, Clone)]
pub struct ExtentSnapshot {
    pub day_index: DayIndex,
    /// `MM-DD-YYYY`
    pub date: String,
    pub burned_pixels: usize,
    pub area_km2: f64,
    pub area_label: String,
    pub extent: BandImage,
}

impl ExtentSnapshot {
    fn compute(
        status: ArrayView2<f32>,
        date: ArrayView2<f32>,
        anomaly: ArrayView2<f32>,
        params: &ExtentParams,
        day: DayIndex,
    ) -> DistResult<Self> {
        let extent = extent_mask(status, date, anomaly, params.threshold, params.start_day, day);
        let burned_pixels = count_burned(extent.view(), &params.window);
        let area_km2 = burned_pixels as f64 * params.pixel_area_m2 / M2_PER_KM2;
        let snapshot = Self {
            day_index: day,
            date: standard_date(day)?,
            burned_pixels,
            area_km2,
            area_label: area_label(area_km2),
            extent,
        };
        log::debug!(
            "Day {} ({}): {} burned pixels, {}",
            snapshot.day_index,
            snapshot.date,
            snapshot.burned_pixels,
            snapshot.area_label
        );
        Ok(snapshot)
    }
}

/// Extent snapshots ordered by increasing day index
#[derive(Debug, Clone, Default)]
pub struct ExtentTimeSeries {
    snapshots: Vec<ExtentSnapshot>,
}

impl ExtentTimeSeries {
    /// Build the series from co-registered status, date and anomaly grids
    pub fn build(
        status: ArrayView2<f32>,
        date: ArrayView2<f32>,
        anomaly: ArrayView2<f32>,
        params: &ExtentParams,
    ) -> DistResult<Self> {
        params.validate()?;
        if status.dim() != date.dim() || status.dim() != anomaly.dim() {
            return Err(DistError::ShapeMismatch(format!(
                "status {:?}, date {:?}, anomaly {:?}",
                status.dim(),
                date.dim(),
                anomaly.dim()
            )));
        }

        let days = params.day_indices();
        log::info!(
            "Building extent time series: {} snapshots over days [{}, {}) step {}, threshold {}",
            days.len(),
            params.start_day,
            params.end_day,
            params.step,
            params.threshold
        );

        let snapshots = Self::compute_snapshots(status, date, anomaly, params, days)?;

        if let Some(last) = snapshots.last() {
            log::info!("Extent on {}: {}", last.date, last.area_label);
        }
        Ok(Self { snapshots })
    }

    #[cfg(feature = "parallel")]
    fn compute_snapshots(
        status: ArrayView2<f32>,
        date: ArrayView2<f32>,
        anomaly: ArrayView2<f32>,
        params: &ExtentParams,
        days: Vec<DayIndex>,
    ) -> DistResult<Vec<ExtentSnapshot>> {
        use rayon::prelude::*;

        days.into_par_iter()
            .map(|day| ExtentSnapshot::compute(status, date, anomaly, params, day))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn compute_snapshots(
        status: ArrayView2<f32>,
        date: ArrayView2<f32>,
        anomaly: ArrayView2<f32>,
        params: &ExtentParams,
        days: Vec<DayIndex>,
    ) -> DistResult<Vec<ExtentSnapshot>> {
        days.into_iter()
            .map(|day| ExtentSnapshot::compute(status, date, anomaly, params, day))
            .collect()
    }

    /// Build the series from the named bands of a stack
    pub fn from_stack(
        stack: &BandStack,
        names: &DistBandNames,
        params: &ExtentParams,
    ) -> DistResult<Self> {
        let band = |name: &str| {
            stack
                .band_by_name(name)
                .ok_or_else(|| DistError::Config(format!("Band {} is not in the stack", name)))
        };
        Self::build(band(&names.status)?, band(&names.date)?, band(&names.anomaly)?, params)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[ExtentSnapshot] {
        &self.snapshots
    }

    pub fn snapshot_for_day(&self, day: DayIndex) -> Option<&ExtentSnapshot> {
        self.snapshots
            .binary_search_by_key(&day, |s| s.day_index)
            .ok()
            .map(|i| &self.snapshots[i])
    }

    /// Grid shape shared by the snapshots
    pub fn dim(&self) -> Option<(usize, usize)> {
        self.snapshots.first().map(|s| s.extent.dim())
    }

    pub fn day_indices(&self) -> Vec<DayIndex> {
        self.snapshots.iter().map(|s| s.day_index).collect()
    }

    pub fn dates(&self) -> Vec<String> {
        self.snapshots.iter().map(|s| s.date.clone()).collect()
    }

    pub fn areas_km2(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.area_km2).collect()
    }

    pub fn area_labels(&self) -> Vec<String> {
        self.snapshots.iter().map(|s| s.area_label.clone()).collect()
    }

    /// Snapshots concatenated along a leading time axis (time x row x column)
    pub fn to_cube(&self) -> DistResult<BandCube> {
        if self.snapshots.is_empty() {
            return Ok(BandCube::zeros((0, 0, 0)));
        }
        let views: Vec<ArrayView2<f32>> = self.snapshots.iter().map(|s| s.extent.view()).collect();
        Ok(ndarray::stack(Axis(0), &views)?)
    }
}
