use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "cropmask")]
#[command(about = "Build crop confidence masks from multi-year CDL rasters")]
#[command(version)]
pub struct Args {
    /// Directory of yearly CDL GeoTIFFs (or zipped archives)
    #[arg(short, long, value_name = "DIR")]
    pub input: String,

    /// Output GeoTIFF path
    #[arg(short, long, value_name = "FILE")]
    pub output: String,

    /// Crop class, by name (e.g. corn, soybeans) or CDL code
    #[arg(short, long, value_name = "CROP")]
    pub crop: String,

    /// First year of the series
    #[arg(long, value_name = "YEAR")]
    pub start_year: i32,

    /// Last year of the series (inclusive)
    #[arg(long, value_name = "YEAR")]
    pub end_year: i32,

    /// Reduction across years: and (high confidence), or (low confidence), sum
    #[arg(short, long, value_name = "METHOD", default_value = "and")]
    pub method: String,

    /// Remove connected clumps smaller than this many pixels
    #[arg(long, value_name = "PIXELS")]
    pub min_clump: Option<usize>,

    /// Use 8-connectivity for clump labeling (default: 4)
    #[arg(long)]
    pub eight_connected: bool,

    /// Export region as min_lon,min_lat,max_lon,max_lat (output CRS)
    #[arg(long, value_name = "BBOX")]
    pub region: Option<String>,

    /// Output coordinate reference system
    #[arg(long, value_name = "EPSG", default_value_t = 4326)]
    pub epsg: u32,

    /// Output pixel scale in meters
    #[arg(long, value_name = "METERS", default_value_t = 30.0)]
    pub scale: f64,

    /// Also write the normalized frequency raster
    #[arg(long)]
    pub frequency: bool,

    /// Number of threads (default: all available)
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
