use crate::types::{
    CdlImage, CdlMetadata, CdlStack, GeoTransform, MaskError, MaskResult, YearRange,
};
use gdal::Dataset;
use ndarray::Array2;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::ZipArchive;

/// Reader for a directory of yearly CDL rasters.
///
/// Accepts plain GeoTIFFs or the zipped archives USDA distributes, one file
/// per year, with the acquisition year embedded in the file name
/// (e.g. `2009_30m_cdls.tif`, `CDL_2016_clip.zip`).
pub struct CdlReader {
    dir: PathBuf,
    files: BTreeMap<i32, PathBuf>,
    extract_dir: Option<TempDir>,
}

impl CdlReader {
    /// Scan a directory for yearly CDL files
    pub fn new<P: AsRef<Path>>(dir: P) -> MaskResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(MaskError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Directory not found: {}", dir.display()),
            )));
        }

        let mut files = BTreeMap::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n,
                None => continue,
            };
            let lower = name.to_lowercase();
            if !lower.ends_with(".tif") && !lower.ends_with(".tiff") && !lower.ends_with(".zip") {
                continue;
            }
            match parse_year_from_name(name)? {
                Some(year) => {
                    if let Some(previous) = files.insert(year, path.clone()) {
                        return Err(MaskError::InvalidFormat(format!(
                            "Year {} appears in both {} and {}",
                            year,
                            previous.display(),
                            path.display()
                        )));
                    }
                }
                None => log::debug!("Skipping {} (no year in file name)", name),
            }
        }

        log::info!(
            "Found {} CDL years in {}: {:?}",
            files.len(),
            dir.display(),
            files.keys().collect::<Vec<_>>()
        );

        Ok(Self {
            dir,
            files,
            extract_dir: None,
        })
    }

    /// Years available in the scanned directory, ascending
    pub fn available_years(&self) -> Vec<i32> {
        self.files.keys().copied().collect()
    }

    /// Directory this reader was opened on
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read a single year's classified raster and its metadata
    pub fn read_year(&mut self, year: i32) -> MaskResult<(CdlImage, CdlMetadata)> {
        let path = self
            .files
            .get(&year)
            .cloned()
            .ok_or(MaskError::MissingYear(year))?;
        let path = self.resolve_geotiff(&path, year)?;
        read_cdl_geotiff(&path, year)
    }

    /// Read an aligned stack covering the requested year range.
    ///
    /// Every year of the range must be present and share the grid of the
    /// first year; violations are fatal.
    pub fn read_stack(&mut self, range: YearRange) -> MaskResult<CdlStack> {
        log::info!("Reading CDL stack for years {}", range);

        let mut images = Vec::with_capacity(range.count());
        let mut reference: Option<CdlMetadata> = None;

        for year in range.years() {
            let (image, metadata) = self.read_year(year)?;
            match &reference {
                None => reference = Some(metadata),
                Some(first) => {
                    if metadata.height != first.height || metadata.width != first.width {
                        return Err(MaskError::GridMismatch {
                            year,
                            expected_height: first.height,
                            expected_width: first.width,
                            height: metadata.height,
                            width: metadata.width,
                        });
                    }
                    if !metadata.geo_transform.aligned_with(&first.geo_transform) {
                        return Err(MaskError::Metadata(format!(
                            "Year {} is not on the reference grid (geotransform differs)",
                            year
                        )));
                    }
                }
            }
            images.push((year, image));
        }

        let metadata = reference.ok_or_else(|| {
            MaskError::Processing("Year range produced an empty stack".to_string())
        })?;

        Ok(CdlStack { images, metadata })
    }

    /// Resolve a year's file to a readable GeoTIFF, extracting zips
    fn resolve_geotiff(&mut self, path: &Path, year: i32) -> MaskResult<PathBuf> {
        let is_zip = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("zip"))
            .unwrap_or(false);
        if !is_zip {
            return Ok(path.to_path_buf());
        }

        log::debug!("Extracting zipped CDL archive: {}", path.display());
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| MaskError::InvalidFormat(format!("Invalid zip archive: {}", e)))?;

        let tiff_name = (0..archive.len())
            .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
            .find(|n| {
                let lower = n.to_lowercase();
                lower.ends_with(".tif") || lower.ends_with(".tiff")
            })
            .ok_or_else(|| {
                MaskError::InvalidFormat(format!(
                    "No GeoTIFF inside archive {}",
                    path.display()
                ))
            })?;

        if self.extract_dir.is_none() {
            self.extract_dir = Some(TempDir::new()?);
        }
        let extract_dir = self.extract_dir.as_ref().ok_or_else(|| {
            MaskError::Processing("Extraction directory unavailable".to_string())
        })?;
        let out_path = extract_dir.path().join(format!("cdl_{}.tif", year));

        let mut member = archive
            .by_name(&tiff_name)
            .map_err(|e| MaskError::InvalidFormat(format!("Zip read error: {}", e)))?;
        let mut out = File::create(&out_path)?;
        std::io::copy(&mut member, &mut out)?;

        Ok(out_path)
    }
}

/// Read one yearly CDL GeoTIFF into an array plus metadata
pub fn read_cdl_geotiff(path: &Path, year: i32) -> MaskResult<(CdlImage, CdlMetadata)> {
    log::debug!("Opening CDL raster: {}", path.display());
    let dataset = Dataset::open(path)?;
    let band = dataset.rasterband(1)?;

    let width = band.x_size();
    let height = band.y_size();
    if width == 0 || height == 0 {
        return Err(MaskError::InvalidFormat(format!(
            "Empty raster: {}",
            path.display()
        )));
    }

    let nodata = band.no_data_value().map(|v| v as u16);
    let geo_transform = GeoTransform::from_gdal(&dataset.geo_transform()?);
    let epsg = dataset
        .spatial_ref()
        .ok()
        .and_then(|sr| sr.auth_code().ok())
        .map(|c| c as u32);

    let buffer = band.read_as::<u16>((0, 0), (width, height), (width, height), None)?;
    let image = Array2::from_shape_vec((height, width), buffer.data)?;

    let metadata = CdlMetadata {
        year,
        width,
        height,
        geo_transform,
        projection: dataset.projection(),
        epsg,
        nodata,
        acquired: None,
    };

    Ok((image, metadata))
}

/// Extract the acquisition year from a CDL file name.
///
/// Returns None when the name carries no year token and an error when it
/// carries more than one distinct year.
pub fn parse_year_from_name(name: &str) -> MaskResult<Option<i32>> {
    let pattern = Regex::new(r"(19|20)\d{2}")
        .map_err(|e| MaskError::Processing(format!("Regex error: {}", e)))?;

    let mut years: Vec<i32> = pattern
        .find_iter(name)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    years.sort_unstable();
    years.dedup();

    match years.len() {
        0 => Ok(None),
        1 => Ok(Some(years[0])),
        _ => Err(MaskError::InvalidFormat(format!(
            "Ambiguous year in file name '{}': {:?}",
            name, years
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_variants() {
        assert_eq!(parse_year_from_name("2009_30m_cdls.tif").unwrap(), Some(2009));
        assert_eq!(parse_year_from_name("CDL_2016_clip.zip").unwrap(), Some(2016));
        assert_eq!(parse_year_from_name("cdls_1999.tiff").unwrap(), Some(1999));
        assert_eq!(parse_year_from_name("cropland.tif").unwrap(), None);
    }

    #[test]
    fn test_parse_year_repeated_token_is_unambiguous() {
        assert_eq!(
            parse_year_from_name("2012_cdl_2012.tif").unwrap(),
            Some(2012)
        );
    }

    #[test]
    fn test_parse_year_ambiguous_rejected() {
        assert!(parse_year_from_name("cdl_2009_to_2015.tif").is_err());
    }

    #[test]
    fn test_missing_directory_rejected() {
        assert!(CdlReader::new("/nonexistent/cdl/archive").is_err());
    }
}
