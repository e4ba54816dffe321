use crate::core::aggregate::AggregateMethod;
use crate::core::clump::{ClumpFilter, ClumpParams};
use crate::core::confidence::{self, ConfidenceProcessor, ConfidenceProducts};
use crate::io::cdl_reader::CdlReader;
use crate::io::export::{ExportParams, GeoTiffExporter};
use crate::types::{CdlStack, MaskResult, YearRange};
use std::path::{Path, PathBuf};

/// End-to-end pipeline parameters
#[derive(Debug, Clone)]
pub struct PipelineParams {
    /// CDL cropland code under test
    pub class_code: u16,
    /// Inclusive year window
    pub years: YearRange,
    /// Reduction written to the output raster
    pub method: AggregateMethod,
    /// Clump filtering, applied to the reduced mask when set
    pub clump: Option<ClumpParams>,
    /// Export parameters
    pub export: ExportParams,
    /// Also write the normalized frequency raster (suffix `_freq`)
    pub write_frequency: bool,
}

/// Confidence mask pipeline: load, binarize, reduce, filter, export.
pub struct MaskPipeline {
    params: PipelineParams,
}

impl MaskPipeline {
    pub fn new(params: PipelineParams) -> Self {
        Self { params }
    }

    /// Run the pipeline and write the result raster(s).
    ///
    /// Returns the paths written, main output first.
    pub fn run<P: AsRef<Path>>(
        &self,
        reader: &mut CdlReader,
        output_path: P,
    ) -> MaskResult<Vec<PathBuf>> {
        let output_path = output_path.as_ref().to_path_buf();
        log::info!(
            "Confidence pipeline: class {} over {} ({} reduction)",
            self.params.class_code,
            self.params.years,
            self.params.method
        );

        // Stage 1: aligned multi-year stack
        let stack = reader.read_stack(self.params.years)?;

        // Stage 2: per-year presence + reductions
        let products = ConfidenceProcessor::with_code(self.params.class_code).compute(&stack)?;

        // Stage 3: zero masking, optional clump filtering, export
        let exporter = GeoTiffExporter::with_params(self.params.export.clone());
        self.export_result(&exporter, &stack, &products, &output_path)?;
        let mut written = vec![output_path.clone()];

        if self.params.write_frequency {
            let freq_path = frequency_path(&output_path);
            exporter.export_frequency(&products.frequency, &stack.metadata, &freq_path)?;
            written.push(freq_path);
        }

        log::info!("Pipeline complete: {}", output_path.display());
        Ok(written)
    }

    fn export_result(
        &self,
        exporter: &GeoTiffExporter,
        stack: &CdlStack,
        products: &ConfidenceProducts,
        output_path: &Path,
    ) -> MaskResult<()> {
        match self.params.method {
            AggregateMethod::Sum => {
                if self.params.clump.is_some() {
                    log::warn!("Clump filtering applies to binary masks; ignored for sum output");
                }
                let counts = confidence::mask_positive_counts(&products.occurrence);
                exporter.export_counts(&counts, &stack.metadata, output_path)
            }
            AggregateMethod::And | AggregateMethod::Or => {
                let reduced = match self.params.method {
                    AggregateMethod::And => &products.high,
                    _ => &products.low,
                };
                let masked = confidence::mask_positive(reduced);
                let result = match &self.params.clump {
                    Some(clump_params) => {
                        ClumpFilter::with_params(clump_params.clone()).apply(&masked)?
                    }
                    None => masked,
                };
                exporter.export_mask(&result, &stack.metadata, output_path)
            }
        }
    }
}

fn frequency_path(main: &Path) -> PathBuf {
    let stem = main
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("cropmask");
    let ext = main.extension().and_then(|e| e.to_str()).unwrap_or("tif");
    main.with_file_name(format!("{}_freq.{}", stem, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_path_suffix() {
        let path = frequency_path(Path::new("/out/corn_hc.tif"));
        assert_eq!(path, Path::new("/out/corn_hc_freq.tif"));
    }
}
