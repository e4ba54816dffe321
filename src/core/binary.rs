use crate::types::{CdlImage, CdlStack, MaskImage, MaskResult, MASK_NODATA};
use ndarray::Zip;

/// Binarize one year of CDL codes against a target class.
///
/// Pixels equal to `class_code` become 1, other coded pixels become 0, and
/// pixels carrying the raster's nodata code stay undefined in the output.
pub fn class_presence(image: &CdlImage, class_code: u16, nodata: Option<u16>) -> MaskImage {
    let mut mask = MaskImage::zeros(image.dim());
    Zip::from(&mut mask).and(image).for_each(|m, &code| {
        *m = match nodata {
            Some(nd) if code == nd => MASK_NODATA,
            _ => (code == class_code) as u8,
        };
    });
    mask
}

/// Binarize every year of a stack against a target class.
///
/// Returns one presence mask per year, in the stack's year order.
pub fn presence_stack(stack: &CdlStack, class_code: u16) -> MaskResult<Vec<MaskImage>> {
    log::debug!(
        "Binarizing {} years against class code {}",
        stack.len(),
        class_code
    );

    let nodata = stack.metadata.nodata;
    let masks = stack
        .images
        .iter()
        .map(|(year, image)| {
            let mask = class_presence(image, class_code, nodata);
            let present = mask.iter().filter(|&&v| v == 1).count();
            log::debug!("Year {}: {} pixels match class {}", year, present, class_code);
            mask
        })
        .collect();

    Ok(masks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_class_presence_basic() {
        let image = array![[1u16, 5, 1], [0, 1, 23]];
        let mask = class_presence(&image, 1, None);
        assert_eq!(mask, array![[1u8, 0, 1], [0, 1, 0]]);
    }

    #[test]
    fn test_class_presence_nodata_propagates() {
        let image = array![[1u16, 0, 5], [0, 1, 1]];
        let mask = class_presence(&image, 1, Some(0));
        assert_eq!(mask[[0, 0]], 1);
        assert_eq!(mask[[0, 1]], MASK_NODATA);
        assert_eq!(mask[[0, 2]], 0);
        assert_eq!(mask[[1, 0]], MASK_NODATA);
    }

    #[test]
    fn test_class_absent_everywhere() {
        let image = array![[1u16, 5], [23, 24]];
        let mask = class_presence(&image, 61, None);
        assert!(mask.iter().all(|&v| v == 0));
    }
}
