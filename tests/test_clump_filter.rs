use cropmask::core::{connected_pixel_count, label_components, ClumpFilter, ClumpParams};
use cropmask::types::{Connectivity, MaskImage, COUNT_NODATA, MASK_NODATA};

/// Mask with three 4-connected components: 12 pixels, 5 pixels, 2 pixels
fn three_component_mask() -> MaskImage {
    let mut mask = MaskImage::zeros((10, 12));
    // 3x4 block
    for i in 1..4 {
        for j in 1..5 {
            mask[[i, j]] = 1;
        }
    }
    // 5-pixel cross
    mask[[6, 8]] = 1;
    mask[[7, 7]] = 1;
    mask[[7, 8]] = 1;
    mask[[7, 9]] = 1;
    mask[[8, 8]] = 1;
    // 2-pixel bar
    mask[[0, 10]] = 1;
    mask[[0, 11]] = 1;
    mask
}

#[test]
fn test_components_found_with_sizes() {
    let mask = three_component_mask();
    let (_, mut sizes) = label_components(&mask, Connectivity::Four);
    sizes.sort_unstable();
    assert_eq!(sizes, vec![2, 5, 12]);
}

#[test]
fn test_filter_removes_small_preserves_large_unchanged() {
    let mask = three_component_mask();
    let filter = ClumpFilter::with_params(ClumpParams {
        min_pixels: 5,
        max_count: 8,
        connectivity: Connectivity::Four,
    });
    let filtered = filter.apply(&mask).expect("Clump filtering failed");

    let mut kept = 0;
    let mut removed = 0;
    for ((i, j), &v) in mask.indexed_iter() {
        if v != 1 {
            assert_eq!(filtered[[i, j]], MASK_NODATA, "Background must stay masked");
            continue;
        }
        match filtered[[i, j]] {
            1 => kept += 1,
            MASK_NODATA => removed += 1,
            other => panic!("Unexpected filtered value {}", other),
        }
    }

    println!("Kept {} pixels, removed {}", kept, removed);
    // 12-pixel block and 5-pixel cross survive whole; 2-pixel bar disappears
    assert_eq!(kept, 17);
    assert_eq!(removed, 2);
}

#[test]
fn test_threshold_exactly_at_component_size_keeps_it() {
    let mask = three_component_mask();
    let at_size = ClumpFilter::with_params(ClumpParams {
        min_pixels: 12,
        max_count: 12,
        connectivity: Connectivity::Four,
    });
    let filtered = at_size.apply(&mask).expect("Clump filtering failed");
    let kept = filtered.iter().filter(|&&v| v == 1).count();
    assert_eq!(kept, 12, "Component at exactly the threshold must survive");
}

#[test]
fn test_eight_connectivity_bridges_diagonals() {
    let mut mask = MaskImage::zeros((4, 4));
    mask[[0, 0]] = 1;
    mask[[1, 1]] = 1;
    mask[[2, 2]] = 1;
    mask[[3, 3]] = 1;

    let four = ClumpFilter::with_params(ClumpParams {
        min_pixels: 4,
        max_count: 8,
        connectivity: Connectivity::Four,
    });
    let all_removed = four.apply(&mask).expect("Clump filtering failed");
    assert_eq!(all_removed.iter().filter(|&&v| v == 1).count(), 0);

    let eight = ClumpFilter::with_params(ClumpParams {
        min_pixels: 4,
        max_count: 8,
        connectivity: Connectivity::Eight,
    });
    let all_kept = eight.apply(&mask).expect("Clump filtering failed");
    assert_eq!(all_kept.iter().filter(|&&v| v == 1).count(), 4);
}

#[test]
fn test_connected_pixel_count_caps_and_masks_background() {
    let mask = three_component_mask();
    let params = ClumpParams {
        min_pixels: 8,
        max_count: 8,
        connectivity: Connectivity::Four,
    };
    let counts = connected_pixel_count(&mask, &params);

    // 12-pixel block saturates at the cap; smaller components report true size
    assert_eq!(counts[[1, 1]], 8);
    assert_eq!(counts[[7, 8]], 5);
    assert_eq!(counts[[0, 10]], 2);
    assert_eq!(counts[[5, 5]], COUNT_NODATA);
}

#[test]
fn test_all_background_mask_yields_no_components() {
    let mask = MaskImage::zeros((6, 6));
    let (_, sizes) = label_components(&mask, Connectivity::Four);
    assert!(sizes.is_empty());

    let filtered = ClumpFilter::new().apply(&mask).expect("Clump filtering failed");
    assert!(filtered.iter().all(|&v| v == MASK_NODATA));
}
