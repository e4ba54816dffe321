use crate::types::{MaskError, MaskResult, YearRange};
use std::path::{Path, PathBuf};

/// Default release location for national 30 m CDL archives
const DEFAULT_BASE_URL: &str =
    "https://www.nass.usda.gov/Research_and_Science/Cropland/Release/datasets";

/// Downloader for yearly CDL archives with a local cache.
///
/// Archives already present in the cache are never fetched again.
pub struct CdlDownloader {
    base_url: String,
    cache_dir: PathBuf,
}

impl CdlDownloader {
    /// Create a downloader caching under the platform cache directory
    pub fn new() -> MaskResult<Self> {
        let cache_root = dirs::cache_dir().ok_or_else(|| {
            MaskError::Processing("No platform cache directory available".to_string())
        })?;
        Ok(Self::with_cache_dir(
            DEFAULT_BASE_URL,
            cache_root.join("cropmask").join("cdl"),
        ))
    }

    /// Create a downloader with an explicit base URL and cache directory
    pub fn with_cache_dir<P: AsRef<Path>>(base_url: &str, cache_dir: P) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cache_dir: cache_dir.as_ref().to_path_buf(),
        }
    }

    /// Cache location for a year's archive
    pub fn cached_path(&self, year: i32) -> PathBuf {
        self.cache_dir.join(format!("{}_30m_cdls.zip", year))
    }

    /// Release URL for a year's archive
    pub fn archive_url(&self, year: i32) -> String {
        format!("{}/{}_30m_cdls.zip", self.base_url, year)
    }

    /// Fetch one year's archive, returning the cached file path
    pub fn download_year(&self, year: i32) -> MaskResult<PathBuf> {
        let target = self.cached_path(year);
        if target.exists() {
            log::debug!("Using cached CDL archive: {}", target.display());
            return Ok(target);
        }

        std::fs::create_dir_all(&self.cache_dir)?;

        let url = self.archive_url(year);
        log::info!("Downloading CDL {} from {}", year, url);

        let response = reqwest::blocking::get(&url)
            .map_err(|e| MaskError::Download(format!("HTTP request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(MaskError::Download(format!(
                "HTTP request for CDL {} failed with status: {}",
                year,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| MaskError::Download(format!("Failed to read response bytes: {}", e)))?;
        if !is_zip_content(&bytes) {
            return Err(MaskError::Download(format!(
                "Response for CDL {} is not a zip archive",
                year
            )));
        }

        std::fs::write(&target, &bytes)?;
        log::info!("CDL archive saved to: {}", target.display());
        Ok(target)
    }

    /// Fetch every year in the range, in order
    pub fn download_range(&self, range: YearRange) -> MaskResult<Vec<PathBuf>> {
        range.years().map(|year| self.download_year(year)).collect()
    }
}

/// Check for the zip magic signature
fn is_zip_content(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && bytes[0..4] == [0x50, 0x4B, 0x03, 0x04]
}
