use crate::core::aggregate;
use crate::core::binary;
use crate::types::{
    CdlStack, CountImage, CropClass, FrequencyImage, MaskError, MaskImage, MaskResult,
    COUNT_NODATA, MASK_NODATA,
};

/// Confidence mask parameters
#[derive(Debug, Clone)]
pub struct ConfidenceParams {
    /// CDL cropland code under test
    pub class_code: u16,
}

impl ConfidenceParams {
    pub fn for_class(class: CropClass) -> Self {
        Self {
            class_code: class.code(),
        }
    }
}

/// Agreement products derived from one multi-year stack
#[derive(Debug, Clone)]
pub struct ConfidenceProducts {
    /// Crop present in every year (AND)
    pub high: MaskImage,
    /// Crop present in at least one year (OR)
    pub low: MaskImage,
    /// Years of presence per pixel (SUM)
    pub occurrence: CountImage,
    /// Occurrence divided by series length, in [0, 1]
    pub frequency: FrequencyImage,
    /// Number of years reduced
    pub n_years: usize,
}

/// Confidence mask processor
pub struct ConfidenceProcessor {
    params: ConfidenceParams,
}

impl ConfidenceProcessor {
    /// Create a processor for a known crop class
    pub fn new(class: CropClass) -> Self {
        Self {
            params: ConfidenceParams::for_class(class),
        }
    }

    /// Create a processor for a raw CDL code
    pub fn with_code(class_code: u16) -> Self {
        Self {
            params: ConfidenceParams { class_code },
        }
    }

    /// Compute high/low/occurrence/frequency products for the stack
    pub fn compute(&self, stack: &CdlStack) -> MaskResult<ConfidenceProducts> {
        if stack.is_empty() {
            return Err(MaskError::Processing(
                "Cannot compute confidence products over an empty stack".to_string(),
            ));
        }
        log::info!(
            "Computing confidence products for class {} over years {:?}",
            self.params.class_code,
            stack.years()
        );

        let masks = binary::presence_stack(stack, self.params.class_code)?;
        let n_years = masks.len();

        let high = aggregate::reduce_and(&masks)?;
        let low = aggregate::reduce_or(&masks)?;
        let occurrence = aggregate::reduce_sum(&masks)?;
        let frequency = aggregate::normalized_frequency(&occurrence, n_years)?;

        log::info!(
            "Confidence products ready: {} high-confidence pixels, {} low-confidence pixels",
            high.iter().filter(|&&v| v == 1).count(),
            low.iter().filter(|&&v| v == 1).count()
        );

        Ok(ConfidenceProducts {
            high,
            low,
            occurrence,
            frequency,
            n_years,
        })
    }
}

/// Keep only positive mask pixels; zeros become nodata.
///
/// Equivalent of masking an aggregate with itself to drop the zeros.
pub fn mask_positive(mask: &MaskImage) -> MaskImage {
    mask.mapv(|v| if v == 1 { 1 } else { MASK_NODATA })
}

/// Keep only positive counts; zeros become nodata.
pub fn mask_positive_counts(counts: &CountImage) -> CountImage {
    counts.mapv(|c| if c == COUNT_NODATA || c == 0 { COUNT_NODATA } else { c })
}
