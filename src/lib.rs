//! cropmask: A Fast, Modular CDL Crop Confidence Mask Processor
//!
//! This library builds agreement masks from multi-year USDA Cropland Data
//! Layer rasters: high confidence (crop present in every year), low
//! confidence (crop present in at least one year), occurrence counts and
//! normalized frequency, with optional small-clump removal and GeoTIFF
//! export.

#[cfg(feature = "python")]
use numpy::{IntoPyArray, PyArray2};
#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod types;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    CdlImage, CdlMetadata, CdlStack, CountImage, CropClass, Connectivity, FrequencyImage,
    MaskError, MaskImage, MaskResult, YearRange,
};

pub use io::{CdlDownloader, CdlReader, ExportParams, GeoTiffExporter};

pub use crate::core::{
    AggregateMethod, ClumpFilter, ClumpParams, ConfidenceProcessor, ConfidenceProducts,
    MaskPipeline, PipelineParams,
};

/// Python module definition
#[cfg(feature = "python")]
#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    // Add Python bindings here
    m.add_class::<PyCdlReader>()?;
    m.add_class::<PyCropClass>()?;
    m.add_class::<PyMetadata>()?;
    Ok(())
}

/// Python wrapper for CdlReader
#[cfg(feature = "python")]
#[pyclass(name = "CdlReader")]
struct PyCdlReader {
    inner: CdlReader,
}

#[cfg(feature = "python")]
#[pymethods]
impl PyCdlReader {
    #[new]
    fn new(dir: String) -> PyResult<Self> {
        let reader = CdlReader::new(&dir)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)))?;

        Ok(PyCdlReader { inner: reader })
    }

    fn available_years(&self) -> Vec<i32> {
        self.inner.available_years()
    }

    fn get_metadata(&mut self, year: i32) -> PyResult<PyMetadata> {
        let (_, metadata) = self
            .inner
            .read_year(year)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)))?;

        Ok(PyMetadata { inner: metadata })
    }

    fn read_year<'py>(&mut self, py: Python<'py>, year: i32) -> PyResult<&'py PyArray2<u16>> {
        let (image, _) = self
            .inner
            .read_year(year)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)))?;

        Ok(image.into_pyarray(py))
    }
}

/// Python wrapper for CropClass enum
#[cfg(feature = "python")]
#[pyclass(name = "CropClass")]
#[derive(Clone)]
struct PyCropClass {
    inner: CropClass,
}

#[cfg(feature = "python")]
#[pymethods]
impl PyCropClass {
    #[new]
    fn new(crop: String) -> PyResult<Self> {
        let class = CropClass::from_name(&crop)
            .or_else(|| crop.parse::<u16>().ok().and_then(CropClass::from_code))
            .ok_or_else(|| {
                PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                    "Invalid crop class: {}",
                    crop
                ))
            })?;

        Ok(PyCropClass { inner: class })
    }

    #[getter]
    fn code(&self) -> u16 {
        self.inner.code()
    }

    fn __str__(&self) -> String {
        format!("{}", self.inner)
    }

    fn __repr__(&self) -> String {
        format!("CropClass('{}')", self.inner)
    }
}

/// Python wrapper for CdlMetadata
#[cfg(feature = "python")]
#[pyclass(name = "Metadata")]
struct PyMetadata {
    inner: types::CdlMetadata,
}

#[cfg(feature = "python")]
#[pymethods]
impl PyMetadata {
    #[getter]
    fn year(&self) -> i32 {
        self.inner.year
    }

    #[getter]
    fn width(&self) -> usize {
        self.inner.width
    }

    #[getter]
    fn height(&self) -> usize {
        self.inner.height
    }

    #[getter]
    fn projection(&self) -> String {
        self.inner.projection.clone()
    }

    #[getter]
    fn epsg(&self) -> Option<u32> {
        self.inner.epsg
    }

    #[getter]
    fn nodata(&self) -> Option<u16> {
        self.inner.nodata
    }

    #[getter]
    fn pixel_size(&self) -> (f64, f64) {
        (
            self.inner.geo_transform.pixel_width,
            self.inner.geo_transform.pixel_height,
        )
    }

    #[getter]
    fn bounding_box(&self) -> (f64, f64, f64, f64) {
        let bbox = self
            .inner
            .geo_transform
            .extent(self.inner.height, self.inner.width);
        (bbox.min_lon, bbox.min_lat, bbox.max_lon, bbox.max_lat)
    }

    fn __str__(&self) -> String {
        format!(
            "CdlMetadata(year={}, size={}x{}, epsg={:?})",
            self.inner.year, self.inner.height, self.inner.width, self.inner.epsg
        )
    }
}
