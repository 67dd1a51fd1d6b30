//! distalert: band stacking and wildfire extent time series for HLS DIST-ALERT
//!
//! Loads the single-band GeoTIFFs of a DIST-ALERT tile into a band stack and
//! derives a per-day wildfire extent series with burned-area estimates.

pub mod types;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    BandCube, BandImage, CoordinateSystem, DayIndex, DistError, DistResult, GeoTransform,
    RasterBand,
};

pub use io::{BandReader, GeoTiffWriter};
pub use self::core::{
    standard_date, BandStack, BandStacker, DistBandNames, ExtentParams, ExtentSnapshot,
    ExtentTimeSeries, StackParams, SubWindow,
};

#[cfg(feature = "python")]
mod python {
    use super::*;
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray2};
    use pyo3::exceptions::{PyRuntimeError, PyValueError};
    use pyo3::prelude::*;

    fn to_py_err(e: DistError) -> PyErr {
        match e {
            DistError::Config(_) | DistError::ShapeMismatch(_) | DistError::DateOutOfRange(_) => {
                PyErr::new::<PyValueError, _>(format!("{}", e))
            }
            _ => PyErr::new::<PyRuntimeError, _>(format!("{}", e)),
        }
    }

    /// Python module definition
    #[pymodule]
    fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(stack_bands, m)?)?;
        m.add_function(wrap_pyfunction!(extent_time_series, m)?)?;
        m.add_function(wrap_pyfunction!(py_standard_date, m)?)?;
        Ok(())
    }

    /// Stack `<base><BAND>.tif` files; returns (band x row x col array, CRS)
    #[pyfunction]
    fn stack_bands(
        py: Python<'_>,
        base_path: String,
        band_names: Vec<String>,
    ) -> PyResult<(&PyArray3<f32>, String)> {
        let params = StackParams {
            base_path,
            band_names,
        };
        let stack = BandStacker::new(params).stack().map_err(to_py_err)?;
        let crs = stack.coordinate_system().to_string();
        Ok((stack.into_data().into_pyarray(py), crs))
    }

    /// Extent time series; returns (time x row x col array, dates, area labels)
    #[pyfunction]
    #[pyo3(signature = (
        status, date, anomaly, threshold, start_day, end_day,
        step=1, window=None, pixel_area_m2=900.0
    ))]
    #[allow(clippy::too_many_arguments)]
    fn extent_time_series<'py>(
        py: Python<'py>,
        status: PyReadonlyArray2<'py, f32>,
        date: PyReadonlyArray2<'py, f32>,
        anomaly: PyReadonlyArray2<'py, f32>,
        threshold: f32,
        start_day: i64,
        end_day: i64,
        step: usize,
        window: Option<(usize, usize, usize, usize)>,
        pixel_area_m2: f64,
    ) -> PyResult<(&'py PyArray3<f32>, Vec<String>, Vec<String>)> {
        let params = ExtentParams {
            window: window
                .map(|(r0, r1, c0, c1)| SubWindow::new(r0, r1, c0, c1))
                .unwrap_or_default(),
            threshold,
            start_day,
            end_day,
            step,
            pixel_area_m2,
        };

        let series = ExtentTimeSeries::build(
            status.as_array(),
            date.as_array(),
            anomaly.as_array(),
            &params,
        )
        .map_err(to_py_err)?;
        let cube = series.to_cube().map_err(to_py_err)?;
        Ok((cube.into_pyarray(py), series.dates(), series.area_labels()))
    }

    /// Day index to `MM-DD-YYYY`
    #[pyfunction]
    #[pyo3(name = "standard_date")]
    fn py_standard_date(day: i64) -> PyResult<String> {
        standard_date(day).map_err(to_py_err)
    }
}
