use crate::types::{
    Connectivity, CountImage, MaskImage, MaskResult, COUNT_NODATA, MASK_NODATA,
};
use ndarray::Array2;
use std::collections::VecDeque;

/// Clump filtering parameters
#[derive(Debug, Clone)]
pub struct ClumpParams {
    /// Smallest component (in pixels) that survives filtering
    pub min_pixels: usize,
    /// Cap on the per-pixel neighbor count (counting stops here)
    pub max_count: usize,
    /// Pixel adjacency
    pub connectivity: Connectivity,
}

impl Default for ClumpParams {
    fn default() -> Self {
        Self {
            min_pixels: 8,
            max_count: 8,
            connectivity: Connectivity::Four,
        }
    }
}

/// Label connected components of a binary mask.
///
/// Foreground pixels (value 1) are grouped by the requested adjacency.
/// Returns labels (1-indexed, 0 = background or nodata) and the pixel
/// count of each component, where `sizes[label - 1]` is the size of
/// `label`.
pub fn label_components(
    mask: &MaskImage,
    connectivity: Connectivity,
) -> (Array2<u32>, Vec<usize>) {
    let (height, width) = mask.dim();
    let mut labels = Array2::<u32>::zeros((height, width));
    let mut sizes: Vec<usize> = Vec::new();
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    let offsets = connectivity.offsets();

    for row in 0..height {
        for col in 0..width {
            if mask[[row, col]] != 1 || labels[[row, col]] != 0 {
                continue;
            }

            // Flood-fill a new component from this seed
            let label = sizes.len() as u32 + 1;
            let mut size = 0usize;
            labels[[row, col]] = label;
            queue.push_back((row, col));

            while let Some((r, c)) = queue.pop_front() {
                size += 1;
                for &(dr, dc) in offsets {
                    let nr = r as isize + dr;
                    let nc = c as isize + dc;
                    if nr < 0 || nc < 0 || nr >= height as isize || nc >= width as isize {
                        continue;
                    }
                    let (nr, nc) = (nr as usize, nc as usize);
                    if mask[[nr, nc]] == 1 && labels[[nr, nc]] == 0 {
                        labels[[nr, nc]] = label;
                        queue.push_back((nr, nc));
                    }
                }
            }

            sizes.push(size);
        }
    }

    (labels, sizes)
}

/// Per-pixel connected pixel count, capped at `max_count`.
///
/// Foreground pixels report the size of their component (saturating at the
/// cap); background and nodata pixels are nodata in the output.
pub fn connected_pixel_count(mask: &MaskImage, params: &ClumpParams) -> CountImage {
    let (labels, sizes) = label_components(mask, params.connectivity);
    let cap = params.max_count;

    let mut counts = CountImage::from_elem(mask.dim(), COUNT_NODATA);
    for ((i, j), &label) in labels.indexed_iter() {
        if label > 0 {
            let size = sizes[label as usize - 1].min(cap);
            counts[[i, j]] = size as u16;
        }
    }
    counts
}

/// Connected-component filter for binary confidence masks
pub struct ClumpFilter {
    params: ClumpParams,
}

impl ClumpFilter {
    /// Create a clump filter with default parameters
    pub fn new() -> Self {
        Self {
            params: ClumpParams::default(),
        }
    }

    /// Create a clump filter with custom parameters
    pub fn with_params(params: ClumpParams) -> Self {
        Self { params }
    }

    /// Remove components smaller than `min_pixels`.
    ///
    /// Surviving foreground pixels stay 1; pixels of removed components
    /// become nodata, as do background and nodata inputs.
    pub fn apply(&self, mask: &MaskImage) -> MaskResult<MaskImage> {
        log::info!(
            "Clump filtering with min size {} ({:?} connectivity)",
            self.params.min_pixels,
            self.params.connectivity
        );

        let (labels, sizes) = label_components(mask, self.params.connectivity);
        let removed = sizes
            .iter()
            .filter(|&&s| s < self.params.min_pixels)
            .count();
        log::debug!(
            "{} components found, {} below minimum size",
            sizes.len(),
            removed
        );

        let mut out = MaskImage::from_elem(mask.dim(), MASK_NODATA);
        for ((i, j), &label) in labels.indexed_iter() {
            if label > 0 && sizes[label as usize - 1] >= self.params.min_pixels {
                out[[i, j]] = 1;
            }
        }
        Ok(out)
    }
}

impl Default for ClumpFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_label_components_four_connected() {
        // Two components: a 3-pixel L and an isolated pixel
        let mask = array![
            [1u8, 1, 0, 0],
            [1, 0, 0, 1],
            [0, 0, 0, 0]
        ];
        let (labels, sizes) = label_components(&mask, Connectivity::Four);
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes[0], 3);
        assert_eq!(sizes[1], 1);
        assert_eq!(labels[[0, 0]], labels[[1, 0]]);
        assert_ne!(labels[[0, 0]], labels[[1, 3]]);
    }

    #[test]
    fn test_diagonal_joins_only_under_eight_connectivity() {
        let mask = array![
            [1u8, 0],
            [0, 1]
        ];
        let (_, sizes4) = label_components(&mask, Connectivity::Four);
        assert_eq!(sizes4.len(), 2);

        let (_, sizes8) = label_components(&mask, Connectivity::Eight);
        assert_eq!(sizes8.len(), 1);
        assert_eq!(sizes8[0], 2);
    }

    #[test]
    fn test_small_components_removed_large_preserved() {
        // 4-pixel block on the left, 2-pixel bar on the right
        let mask = array![
            [1u8, 1, 0, 1],
            [1, 1, 0, 1],
            [0, 0, 0, 0]
        ];
        let filter = ClumpFilter::with_params(ClumpParams {
            min_pixels: 3,
            ..ClumpParams::default()
        });
        let out = filter.apply(&mask).unwrap();

        for (i, j) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            assert_eq!(out[[i, j]], 1, "large component pixel removed");
        }
        assert_eq!(out[[0, 3]], MASK_NODATA);
        assert_eq!(out[[1, 3]], MASK_NODATA);
        assert_eq!(out[[2, 2]], MASK_NODATA);
    }

    #[test]
    fn test_connected_pixel_count_caps_at_max() {
        let mask = array![[1u8, 1, 1, 1, 1]];
        let params = ClumpParams {
            max_count: 3,
            ..ClumpParams::default()
        };
        let counts = connected_pixel_count(&mask, &params);
        assert!(counts.iter().all(|&c| c == 3));
    }

    #[test]
    fn test_nodata_is_background_for_labeling() {
        let mask = array![[1u8, MASK_NODATA, 1]];
        let (_, sizes) = label_components(&mask, Connectivity::Four);
        assert_eq!(sizes.len(), 2);
    }
}
