use crate::types::{
    CountImage, FrequencyImage, MaskError, MaskImage, MaskResult, COUNT_NODATA, MASK_NODATA,
};

/// Reduction applied across the per-year presence masks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateMethod {
    /// Crop present in every year (high confidence)
    And,
    /// Crop present in at least one year (low confidence)
    Or,
    /// Number of years the crop was present
    Sum,
}

impl std::fmt::Display for AggregateMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateMethod::And => write!(f, "and"),
            AggregateMethod::Or => write!(f, "or"),
            AggregateMethod::Sum => write!(f, "sum"),
        }
    }
}

/// Validate that the stack is non-empty and all masks share one grid
fn validate_stack(masks: &[MaskImage]) -> MaskResult<(usize, usize)> {
    let first = masks
        .first()
        .ok_or_else(|| MaskError::Processing("Empty mask stack".to_string()))?;
    let dim = first.dim();
    for (i, mask) in masks.iter().enumerate() {
        if mask.dim() != dim {
            return Err(MaskError::Processing(format!(
                "Mask {} has dimensions {:?}, expected {:?}",
                i,
                mask.dim(),
                dim
            )));
        }
    }
    Ok(dim)
}

/// Logical AND across the year stack.
///
/// A pixel is 1 when every year with valid data is 1, 0 when any valid year
/// is 0, and nodata only when no year has valid data there (masked inputs
/// are skipped per pixel, the way collection reducers treat masked bands).
pub fn reduce_and(masks: &[MaskImage]) -> MaskResult<MaskImage> {
    let (height, width) = validate_stack(masks)?;
    log::debug!("AND-reducing {} masks ({}x{})", masks.len(), height, width);

    let mut out = MaskImage::zeros((height, width));
    for i in 0..height {
        for j in 0..width {
            let mut any_valid = false;
            let mut all_true = true;
            for mask in masks {
                match mask[[i, j]] {
                    MASK_NODATA => continue,
                    0 => {
                        any_valid = true;
                        all_true = false;
                    }
                    _ => any_valid = true,
                }
            }
            out[[i, j]] = if !any_valid {
                MASK_NODATA
            } else {
                (all_true) as u8
            };
        }
    }
    Ok(out)
}

/// Logical OR across the year stack.
///
/// A pixel is 1 when any year with valid data is 1.
pub fn reduce_or(masks: &[MaskImage]) -> MaskResult<MaskImage> {
    let (height, width) = validate_stack(masks)?;
    log::debug!("OR-reducing {} masks ({}x{})", masks.len(), height, width);

    let mut out = MaskImage::zeros((height, width));
    for i in 0..height {
        for j in 0..width {
            let mut any_valid = false;
            let mut any_true = false;
            for mask in masks {
                match mask[[i, j]] {
                    MASK_NODATA => continue,
                    0 => any_valid = true,
                    _ => {
                        any_valid = true;
                        any_true = true;
                    }
                }
            }
            out[[i, j]] = if !any_valid {
                MASK_NODATA
            } else {
                any_true as u8
            };
        }
    }
    Ok(out)
}

/// Occurrence count across the year stack.
///
/// Selects a row-parallel path for large grids when the `parallel` feature
/// is enabled.
pub fn reduce_sum(masks: &[MaskImage]) -> MaskResult<CountImage> {
    let (height, width) = validate_stack(masks)?;
    let total_pixels = height * width;
    log::debug!("SUM-reducing {} masks ({}x{})", masks.len(), height, width);

    if total_pixels > 1_000_000 {
        reduce_sum_parallel(masks, height, width)
    } else {
        reduce_sum_rows(masks, height, width)
    }
}

fn sum_pixel(masks: &[MaskImage], i: usize, j: usize) -> u16 {
    let mut any_valid = false;
    let mut count: u16 = 0;
    for mask in masks {
        match mask[[i, j]] {
            MASK_NODATA => continue,
            0 => any_valid = true,
            _ => {
                any_valid = true;
                count += 1;
            }
        }
    }
    if any_valid {
        count
    } else {
        COUNT_NODATA
    }
}

fn reduce_sum_rows(masks: &[MaskImage], height: usize, width: usize) -> MaskResult<CountImage> {
    let mut out = CountImage::zeros((height, width));
    for i in 0..height {
        for j in 0..width {
            out[[i, j]] = sum_pixel(masks, i, j);
        }
    }
    Ok(out)
}

#[cfg(feature = "parallel")]
fn reduce_sum_parallel(masks: &[MaskImage], height: usize, width: usize) -> MaskResult<CountImage> {
    use rayon::prelude::*;

    log::debug!("Using row-parallel SUM reduction");

    let flat: Vec<u16> = (0..height)
        .into_par_iter()
        .flat_map_iter(|i| (0..width).map(move |j| sum_pixel(masks, i, j)))
        .collect();

    Ok(CountImage::from_shape_vec((height, width), flat)?)
}

#[cfg(not(feature = "parallel"))]
fn reduce_sum_parallel(masks: &[MaskImage], height: usize, width: usize) -> MaskResult<CountImage> {
    reduce_sum_rows(masks, height, width)
}

/// Divide occurrence counts by the series length, yielding [0, 1].
///
/// Nodata counts map to NaN.
pub fn normalized_frequency(counts: &CountImage, n_years: usize) -> MaskResult<FrequencyImage> {
    if n_years == 0 {
        return Err(MaskError::Processing(
            "Cannot normalize by a zero-year series".to_string(),
        ));
    }
    let divisor = n_years as f32;
    Ok(counts.mapv(|c| {
        if c == COUNT_NODATA {
            f32::NAN
        } else {
            c as f32 / divisor
        }
    }))
}
