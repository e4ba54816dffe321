use crate::types::{
    BoundingBox, CdlMetadata, CountImage, FrequencyImage, MaskError, MaskImage, MaskResult,
    COUNT_NODATA, MASK_NODATA,
};
use gdal::raster::{Buffer, GdalType};
use gdal::spatial_ref::{CoordTransform, SpatialRef};
use gdal::{Dataset, DriverManager, Metadata};
use ndarray::Array2;
use std::path::Path;

/// Nominal meters per degree at the equator, for geographic pixel scales
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Export parameters for the result raster
#[derive(Debug, Clone)]
pub struct ExportParams {
    /// Output coordinate reference system (EPSG code)
    pub epsg: u32,
    /// Output pixel scale in meters
    pub scale_m: f64,
    /// Upper bound on output width x height
    pub max_pixels: u64,
    /// Export region in output CRS coordinates; defaults to the source extent
    pub region: Option<BoundingBox>,
    /// GeoTIFF compression (e.g. "LZW")
    pub compression: Option<String>,
    /// Band description stamped on the output
    pub description: Option<String>,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            epsg: 4326,
            scale_m: 30.0,
            max_pixels: 10_000_000_000_000, // 1e13
            region: None,
            compression: None,
            description: None,
        }
    }
}

/// GeoTIFF exporter with reprojection
pub struct GeoTiffExporter {
    params: ExportParams,
}

impl GeoTiffExporter {
    /// Create an exporter with default parameters
    pub fn new() -> Self {
        Self {
            params: ExportParams::default(),
        }
    }

    /// Create an exporter with custom parameters
    pub fn with_params(params: ExportParams) -> Self {
        Self { params }
    }

    /// Export a binary confidence mask
    pub fn export_mask<P: AsRef<Path>>(
        &self,
        mask: &MaskImage,
        metadata: &CdlMetadata,
        output_path: P,
    ) -> MaskResult<()> {
        self.export_band(mask, metadata, MASK_NODATA, output_path)
    }

    /// Export an occurrence-count raster
    pub fn export_counts<P: AsRef<Path>>(
        &self,
        counts: &CountImage,
        metadata: &CdlMetadata,
        output_path: P,
    ) -> MaskResult<()> {
        self.export_band(counts, metadata, COUNT_NODATA, output_path)
    }

    /// Export a normalized frequency raster
    pub fn export_frequency<P: AsRef<Path>>(
        &self,
        frequency: &FrequencyImage,
        metadata: &CdlMetadata,
        output_path: P,
    ) -> MaskResult<()> {
        self.export_band(frequency, metadata, f32::NAN, output_path)
    }

    /// Export one band: window to the region, reproject, write GTiff
    fn export_band<T: GdalType + Copy + Into<f64>, P: AsRef<Path>>(
        &self,
        data: &Array2<T>,
        metadata: &CdlMetadata,
        nodata: T,
        output_path: P,
    ) -> MaskResult<()> {
        let output_path = output_path.as_ref();
        log::info!(
            "Exporting {}x{} raster to {} (EPSG:{}, {} m)",
            data.dim().0,
            data.dim().1,
            output_path.display(),
            self.params.epsg,
            self.params.scale_m
        );

        let source = array_to_mem_dataset(data, metadata, nodata)?;

        let target_srs = target_spatial_ref(self.params.epsg)?;
        let source_srs = source_spatial_ref(metadata)?;

        // Source extent in output CRS, intersected with the requested region
        let native_extent = metadata
            .geo_transform
            .extent(metadata.height, metadata.width);
        let extent = transform_extent(&native_extent, &source_srs, &target_srs)?;
        let extent = match &self.params.region {
            Some(region) => extent.intersect(region).ok_or_else(|| {
                MaskError::Processing(
                    "Export region does not intersect the raster extent".to_string(),
                )
            })?,
            None => extent,
        };

        let pixel_size = self.pixel_size(&target_srs);
        let (width, height) = grid_dimensions(&extent, pixel_size);
        check_max_pixels(width, height, self.params.max_pixels)?;

        log::debug!(
            "Output grid: {}x{} at {} units/pixel",
            height,
            width,
            pixel_size
        );

        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let mut dataset = driver.create_with_band_type::<T, _>(
            output_path,
            width as isize,
            height as isize,
            1,
        )?;

        dataset.set_geo_transform(&[
            extent.min_lon,
            pixel_size,
            0.0,
            extent.max_lat,
            0.0,
            -pixel_size,
        ])?;
        dataset.set_spatial_ref(&target_srs)?;

        {
            let mut band = dataset.rasterband(1)?;
            band.set_no_data_value(Some(nodata.into()))?;
            // Start from an all-nodata canvas; reproject fills the footprint
            let background = Buffer::new((width, height), vec![nodata; width * height]);
            band.write((0, 0), (width, height), &background)?;
            if let Some(description) = &self.params.description {
                band.set_description(description)?;
            }
        }

        if let Some(compression) = &self.params.compression {
            dataset.set_metadata_item("COMPRESS", compression, "")?;
        }

        // Resampling and projection math stay GDAL's job
        gdal::raster::reproject(&source, &dataset)?;

        log::info!("GeoTIFF export complete: {}", output_path.display());
        Ok(())
    }

    /// Pixel size in output CRS units
    fn pixel_size(&self, target_srs: &SpatialRef) -> f64 {
        if target_srs.is_geographic() {
            self.params.scale_m / METERS_PER_DEGREE
        } else {
            self.params.scale_m
        }
    }
}

impl Default for GeoTiffExporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap an array in an in-memory GDAL dataset carrying the source grid
fn array_to_mem_dataset<T: GdalType + Copy + Into<f64>>(
    data: &Array2<T>,
    metadata: &CdlMetadata,
    nodata: T,
) -> MaskResult<Dataset> {
    let (height, width) = data.dim();
    let driver = DriverManager::get_driver_by_name("MEM")?;
    let mut dataset =
        driver.create_with_band_type::<T, _>("", width as isize, height as isize, 1)?;

    dataset.set_geo_transform(&metadata.geo_transform.to_gdal())?;
    dataset.set_spatial_ref(&source_spatial_ref(metadata)?)?;

    let mut band = dataset.rasterband(1)?;
    band.set_no_data_value(Some(nodata.into()))?;
    let flat: Vec<T> = data.iter().copied().collect();
    let buffer = Buffer::new((width, height), flat);
    band.write((0, 0), (width, height), &buffer)?;
    drop(band);

    Ok(dataset)
}

/// Spatial reference of the source grid (EPSG when known, else WKT)
fn source_spatial_ref(metadata: &CdlMetadata) -> MaskResult<SpatialRef> {
    match metadata.epsg {
        Some(code) => Ok(SpatialRef::from_epsg(code)?),
        None if !metadata.projection.is_empty() => {
            Ok(SpatialRef::from_wkt(&metadata.projection)?)
        }
        None => Err(MaskError::Metadata(
            "Source raster carries no projection".to_string(),
        )),
    }
}

fn target_spatial_ref(epsg: u32) -> MaskResult<SpatialRef> {
    Ok(SpatialRef::from_epsg(epsg)?)
}

/// Reproject extent corners and take the axis-aligned hull
fn transform_extent(
    extent: &BoundingBox,
    source: &SpatialRef,
    target: &SpatialRef,
) -> MaskResult<BoundingBox> {
    if source.auth_code().ok() == target.auth_code().ok() {
        return Ok(extent.clone());
    }

    let transform = CoordTransform::new(source, target)?;
    let mut xs = [
        extent.min_lon,
        extent.min_lon,
        extent.max_lon,
        extent.max_lon,
    ];
    let mut ys = [
        extent.min_lat,
        extent.max_lat,
        extent.min_lat,
        extent.max_lat,
    ];
    let mut zs = [0.0; 4];
    transform.transform_coords(&mut xs, &mut ys, &mut zs)?;

    Ok(BoundingBox {
        min_lon: xs.iter().cloned().fold(f64::INFINITY, f64::min),
        max_lon: xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        min_lat: ys.iter().cloned().fold(f64::INFINITY, f64::min),
        max_lat: ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Output grid dimensions covering the extent at the given pixel size
fn grid_dimensions(extent: &BoundingBox, pixel_size: f64) -> (usize, usize) {
    let width = ((extent.max_lon - extent.min_lon) / pixel_size).ceil().max(1.0) as usize;
    let height = ((extent.max_lat - extent.min_lat) / pixel_size).ceil().max(1.0) as usize;
    (width, height)
}

/// Enforce the export pixel budget
fn check_max_pixels(width: usize, height: usize, max_pixels: u64) -> MaskResult<()> {
    let total = width as u64 * height as u64;
    if total > max_pixels {
        return Err(MaskError::Processing(format!(
            "Export of {}x{} pixels exceeds maxPixels budget of {}",
            width, height, max_pixels
        )));
    }
    Ok(())
}
