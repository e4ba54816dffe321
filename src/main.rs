use anyhow::{bail, Context};
use clap::Parser;
use env_logger::Env;
use log::info;

mod cli;

use cli::Args;
use cropmask::core::{AggregateMethod, ClumpParams, MaskPipeline, PipelineParams};
use cropmask::io::ExportParams;
use cropmask::types::{BoundingBox, Connectivity, CropClass, YearRange};
use cropmask::CdlReader;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logger
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    info!("=== CDL Confidence Mask Builder ===");

    // Set thread pool size if specified
    if let Some(n_threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build_global()
            .context("Failed to build thread pool")?;
        info!("Using {} threads", n_threads);
    }

    let class_code = parse_crop(&args.crop)?;
    let method = parse_method(&args.method)?;
    let years = YearRange::new(args.start_year, args.end_year)?;
    let region = args.region.as_deref().map(parse_region).transpose()?;

    let connectivity = if args.eight_connected {
        Connectivity::Eight
    } else {
        Connectivity::Four
    };
    let clump = args.min_clump.map(|min_pixels| ClumpParams {
        min_pixels,
        max_count: min_pixels,
        connectivity,
    });

    info!(
        "Class code {} over {}, {} reduction",
        class_code, years, method
    );

    let params = PipelineParams {
        class_code,
        years,
        method,
        clump,
        export: ExportParams {
            epsg: args.epsg,
            scale_m: args.scale,
            region,
            ..ExportParams::default()
        },
        write_frequency: args.frequency,
    };

    let mut reader = CdlReader::new(&args.input)?;
    let written = MaskPipeline::new(params).run(&mut reader, &args.output)?;
    for path in &written {
        info!("Wrote {}", path.display());
    }

    info!("=== Done! ===");
    Ok(())
}

/// Resolve a crop argument: a known name or a raw CDL code
fn parse_crop(crop: &str) -> anyhow::Result<u16> {
    if let Some(class) = CropClass::from_name(crop) {
        return Ok(class.code());
    }
    let code: u16 = crop
        .parse()
        .with_context(|| format!("Unknown crop class: {}", crop))?;
    if code == 0 {
        bail!("CDL code 0 is background, not a crop class");
    }
    if CropClass::from_code(code).is_none() {
        log::warn!("CDL code {} is not a named crop class; using it as-is", code);
    }
    Ok(code)
}

fn parse_method(method: &str) -> anyhow::Result<AggregateMethod> {
    match method.to_lowercase().as_str() {
        "and" => Ok(AggregateMethod::And),
        "or" => Ok(AggregateMethod::Or),
        "sum" => Ok(AggregateMethod::Sum),
        other => bail!("Unknown aggregation method: {} (use and, or, sum)", other),
    }
}

/// Parse "min_lon,min_lat,max_lon,max_lat"
fn parse_region(region: &str) -> anyhow::Result<BoundingBox> {
    let parts: Vec<f64> = region
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .with_context(|| format!("Invalid region: {}", region))?;
    if parts.len() != 4 {
        bail!("Region must have 4 comma-separated values, got {}", parts.len());
    }
    if parts[0] >= parts[2] || parts[1] >= parts[3] {
        bail!("Region min must be strictly below max: {}", region);
    }
    Ok(BoundingBox {
        min_lon: parts[0],
        min_lat: parts[1],
        max_lon: parts[2],
        max_lat: parts[3],
    })
}
