use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// One year of categorical CDL crop codes
pub type CdlImage = Array2<u16>;

/// Binary crop-presence raster (0 = absent, 1 = present)
pub type MaskImage = Array2<u8>;

/// Per-pixel occurrence counts across the year series
pub type CountImage = Array2<u16>;

/// Normalized occurrence frequency in [0, 1]
pub type FrequencyImage = Array2<f32>;

/// Nodata sentinel for binary masks
pub const MASK_NODATA: u8 = u8::MAX;

/// Nodata sentinel for count rasters
pub const COUNT_NODATA: u16 = u16::MAX;

/// CDL crop classes covered by the confidence-mask workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropClass {
    Corn,
    Cotton,
    Rice,
    Sorghum,
    Soybeans,
    Barley,
    DurumWheat,
    SpringWheat,
    WinterWheat,
    Rye,
    DblSoybeansCotton,
    DblSoybeansOats,
    DblCornSoybeans,
}

impl CropClass {
    /// CDL cropland code for this class
    pub fn code(&self) -> u16 {
        match self {
            CropClass::Corn => 1,
            CropClass::Cotton => 2,
            CropClass::Rice => 3,
            CropClass::Sorghum => 4,
            CropClass::Soybeans => 5,
            CropClass::Barley => 21,
            CropClass::DurumWheat => 22,
            CropClass::SpringWheat => 23,
            CropClass::WinterWheat => 24,
            CropClass::Rye => 27,
            CropClass::DblSoybeansCotton => 239,
            CropClass::DblSoybeansOats => 240,
            CropClass::DblCornSoybeans => 241,
        }
    }

    /// Resolve a CDL cropland code to a known class
    pub fn from_code(code: u16) -> Option<CropClass> {
        match code {
            1 => Some(CropClass::Corn),
            2 => Some(CropClass::Cotton),
            3 => Some(CropClass::Rice),
            4 => Some(CropClass::Sorghum),
            5 => Some(CropClass::Soybeans),
            21 => Some(CropClass::Barley),
            22 => Some(CropClass::DurumWheat),
            23 => Some(CropClass::SpringWheat),
            24 => Some(CropClass::WinterWheat),
            27 => Some(CropClass::Rye),
            239 => Some(CropClass::DblSoybeansCotton),
            240 => Some(CropClass::DblSoybeansOats),
            241 => Some(CropClass::DblCornSoybeans),
            _ => None,
        }
    }

    /// Resolve a human-readable name (case-insensitive)
    pub fn from_name(name: &str) -> Option<CropClass> {
        match name.to_lowercase().as_str() {
            "corn" => Some(CropClass::Corn),
            "cotton" => Some(CropClass::Cotton),
            "rice" => Some(CropClass::Rice),
            "sorghum" => Some(CropClass::Sorghum),
            "soy" | "soybeans" => Some(CropClass::Soybeans),
            "barley" => Some(CropClass::Barley),
            "durum_wheat" | "durum" => Some(CropClass::DurumWheat),
            "spring_wheat" => Some(CropClass::SpringWheat),
            "winter_wheat" => Some(CropClass::WinterWheat),
            "rye" => Some(CropClass::Rye),
            "dbl_soybeans_cotton" => Some(CropClass::DblSoybeansCotton),
            "dbl_soybeans_oats" => Some(CropClass::DblSoybeansOats),
            "dbl_corn_soybeans" => Some(CropClass::DblCornSoybeans),
            _ => None,
        }
    }
}

impl std::fmt::Display for CropClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CropClass::Corn => write!(f, "Corn"),
            CropClass::Cotton => write!(f, "Cotton"),
            CropClass::Rice => write!(f, "Rice"),
            CropClass::Sorghum => write!(f, "Sorghum"),
            CropClass::Soybeans => write!(f, "Soybeans"),
            CropClass::Barley => write!(f, "Barley"),
            CropClass::DurumWheat => write!(f, "Durum Wheat"),
            CropClass::SpringWheat => write!(f, "Spring Wheat"),
            CropClass::WinterWheat => write!(f, "Winter Wheat"),
            CropClass::Rye => write!(f, "Rye"),
            CropClass::DblSoybeansCotton => write!(f, "Dbl Crop Soybeans/Cotton"),
            CropClass::DblSoybeansOats => write!(f, "Dbl Crop Soybeans/Oats"),
            CropClass::DblCornSoybeans => write!(f, "Dbl Crop Corn/Soybeans"),
        }
    }
}

/// Inclusive range of CDL years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> MaskResult<Self> {
        if start > end {
            return Err(MaskError::InvalidFormat(format!(
                "Invalid year range: {} > {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of years in the range
    pub fn count(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    /// Years in ascending order
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }
}

impl std::fmt::Display for YearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Pixel adjacency used for clump labeling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connectivity {
    /// Rook adjacency (N, S, E, W)
    Four,
    /// Queen adjacency (includes diagonals)
    Eight,
}

impl Connectivity {
    /// Neighbor offsets for this adjacency
    pub fn offsets(&self) -> &'static [(isize, isize)] {
        const FOUR: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        const EIGHT: [(isize, isize); 8] = [
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ];
        match self {
            Connectivity::Four => &FOUR,
            Connectivity::Eight => &EIGHT,
        }
    }
}

/// Geospatial bounding box (lon/lat degrees unless stated otherwise)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Intersection of two boxes, None when disjoint
    pub fn intersect(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let min_lon = self.min_lon.max(other.min_lon);
        let max_lon = self.max_lon.min(other.max_lon);
        let min_lat = self.min_lat.max(other.min_lat);
        let max_lat = self.max_lat.min(other.max_lat);
        if min_lon < max_lon && min_lat < max_lat {
            Some(BoundingBox {
                min_lon,
                max_lon,
                min_lat,
                max_lat,
            })
        } else {
            None
        }
    }
}

/// Geospatial transformation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn from_gdal(gt: &[f64; 6]) -> Self {
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

    /// Map extent of a grid with the given dimensions
    pub fn extent(&self, height: usize, width: usize) -> BoundingBox {
        let x0 = self.top_left_x;
        let x1 = self.top_left_x + self.pixel_width * width as f64;
        let y0 = self.top_left_y;
        let y1 = self.top_left_y + self.pixel_height * height as f64;
        BoundingBox {
            min_lon: x0.min(x1),
            max_lon: x0.max(x1),
            min_lat: y0.min(y1),
            max_lat: y0.max(y1),
        }
    }

    /// True when two grids share origin and pixel size within tolerance
    pub fn aligned_with(&self, other: &GeoTransform) -> bool {
        const TOL: f64 = 1e-6;
        (self.top_left_x - other.top_left_x).abs() < TOL
            && (self.top_left_y - other.top_left_y).abs() < TOL
            && (self.pixel_width - other.pixel_width).abs() < TOL
            && (self.pixel_height - other.pixel_height).abs() < TOL
    }
}

/// Metadata for one yearly CDL raster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdlMetadata {
    pub year: i32,
    pub width: usize,
    pub height: usize,
    pub geo_transform: GeoTransform,
    pub projection: String,
    pub epsg: Option<u32>,
    pub nodata: Option<u16>,
    pub acquired: Option<DateTime<Utc>>,
}

/// Aligned multi-year CDL series
#[derive(Debug, Clone)]
pub struct CdlStack {
    /// Per-year images in ascending year order
    pub images: Vec<(i32, CdlImage)>,
    /// Grid metadata shared by every year
    pub metadata: CdlMetadata,
}

impl CdlStack {
    /// Number of years in the stack
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn years(&self) -> Vec<i32> {
        self.images.iter().map(|(y, _)| *y).collect()
    }
}

/// Error types for confidence-mask processing
#[derive(Debug, thiserror::Error)]
pub enum MaskError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Year {0} not found in the CDL series")]
    MissingYear(i32),

    #[error("Grid mismatch for year {year}: expected {expected_height}x{expected_width}, got {height}x{width}")]
    GridMismatch {
        year: i32,
        expected_height: usize,
        expected_width: usize,
        height: usize,
        width: usize,
    },

    #[error("Invalid CDL class code: {0}")]
    InvalidClass(u16),

    #[error("Download error: {0}")]
    Download(String),
}

/// Result type for confidence-mask operations
pub type MaskResult<T> = Result<T, MaskError>;
