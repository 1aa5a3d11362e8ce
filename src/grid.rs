//! Grid size optimizer: picks the widest mosaic whose estimated length fits the budget.

/// Narrowest grid the optimizer will pick.
pub const MIN_COLS: u32 = 5;
/// Widest grid the optimizer will pick.
pub const MAX_COLS: u32 = 100;
/// Planning headroom kept below the budget for estimation error.
pub const PLANNING_MARGIN: usize = 100;

/// Target mosaic resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub cols: u32,
    pub rows: u32,
    /// Planning estimate only; the rendered text may differ.
    pub estimated_chars: usize,
}

impl GridSpec {
    pub fn new(cols: u32, rows: u32, avg_name_len: f64) -> Self {
        let estimated_chars = estimate(cols, rows, avg_name_len).max(0.0).floor() as usize;
        Self { cols, rows, estimated_chars }
    }
}

/// Rows that keep the image aspect ratio at `cols` columns.
pub fn rows_for(img_w: f64, img_h: f64, cols: u32) -> u32 {
    let rows = (img_h / (img_w / cols as f64)).floor();
    if rows.is_finite() && rows > 0.0 {
        rows.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Estimated output length: one average name per cell plus a newline per row.
pub fn estimate(cols: u32, rows: u32, avg_name_len: f64) -> f64 {
    (cols as f64 * avg_name_len + 1.0) * rows as f64
}

/// Binary search over `[MIN_COLS, MAX_COLS]` for the largest column count whose
/// estimate stays within `budget - PLANNING_MARGIN`.
///
/// Falls back to `MIN_COLS` when nothing fits, so the result is not guaranteed
/// to satisfy the margin.
pub fn optimal_size(img_w: f64, img_h: f64, avg_name_len: f64, budget: usize) -> GridSpec {
    let limit = budget as f64 - PLANNING_MARGIN as f64;

    let mut lo = MIN_COLS;
    let mut hi = MAX_COLS;
    let mut best_cols = MIN_COLS;
    let mut best_rows = rows_for(img_w, img_h, best_cols);

    while lo <= hi {
        let cols = (lo + hi) / 2;
        let rows = rows_for(img_w, img_h, cols);

        if estimate(cols, rows, avg_name_len) <= limit {
            best_cols = cols;
            best_rows = rows;
            lo = cols + 1;
        } else {
            // cols >= MIN_COLS, and MIN_COLS > 0, so this never underflows
            hi = cols - 1;
        }
    }

    GridSpec::new(best_cols, best_rows, avg_name_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_landscape_3000x2000() {
        let spec = optimal_size(3000.0, 2000.0, 2.0, 3000);
        assert_eq!((spec.cols, spec.rows), (46, 30));
        assert!(estimate(spec.cols, spec.rows, 2.0) <= 2900.0);

        for cols in spec.cols + 1..=MAX_COLS {
            let rows = rows_for(3000.0, 2000.0, cols);
            assert!(estimate(cols, rows, 2.0) > 2900.0, "cols {cols} also fits");
        }
    }

    #[test]
    fn test_wide_image_hits_ceiling() {
        // 1 row per 100 columns: everything fits
        let spec = optimal_size(1000.0, 10.0, 2.0, 3000);
        assert_eq!(spec.cols, MAX_COLS);
        assert_eq!(spec.rows, 1);
        assert_eq!(spec.estimated_chars, 201);
    }

    #[test]
    fn test_tiny_budget_falls_back_to_floor() {
        let spec = optimal_size(100.0, 100.0, 2.0, 50);
        assert_eq!(spec.cols, MIN_COLS);
        assert_eq!(spec.rows, 5);
        assert_eq!(spec.estimated_chars, 55);
    }

    #[test]
    fn test_very_tall_image_keeps_aspect() {
        let spec = optimal_size(10.0, 1000.0, 1.0, 3000);
        assert_eq!(spec.cols, MIN_COLS);
        assert_eq!(spec.rows, 500);
    }

    #[test]
    fn test_estimate_is_floored() {
        let spec = GridSpec::new(3, 2, 1.5);
        assert_eq!(spec.estimated_chars, 11);
    }

    proptest! {
        #[test]
        fn test_cols_in_range(
            w in 1u32..5000,
            h in 1u32..5000,
            avg in 0.5f64..20.0,
            budget in 0usize..20_000,
        ) {
            let spec = optimal_size(w as f64, h as f64, avg, budget);
            prop_assert!(spec.cols >= MIN_COLS && spec.cols <= MAX_COLS);
            prop_assert_eq!(spec.rows, rows_for(w as f64, h as f64, spec.cols));
        }

        #[test]
        fn test_budget_monotone(
            w in 1u32..5000,
            h in 1u32..5000,
            avg in 0.5f64..20.0,
            budget in 0usize..10_000,
            extra in 0usize..10_000,
        ) {
            let small = optimal_size(w as f64, h as f64, avg, budget);
            let large = optimal_size(w as f64, h as f64, avg, budget + extra);
            prop_assert!(large.cols >= small.cols);
        }
    }
}
