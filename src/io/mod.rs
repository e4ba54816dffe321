//! I/O modules for reading CDL rasters, downloading archives, and exporting results

pub mod cdl_reader;
pub mod download;
pub mod export;

pub use cdl_reader::CdlReader;
pub use download::CdlDownloader;
pub use export::{ExportParams, GeoTiffExporter};
