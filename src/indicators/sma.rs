// =============================================================================
// Simple Moving Average (SMA) — trailing, warm-up truncated
// =============================================================================
//
// SMA_t = mean(x[t-period+1 ..= t])
//
// During warm-up (t < period - 1) the window shrinks to the values actually
// available, so the first element equals x[0], the second the mean of x[0..=1],
// and so on. Missing or non-finite inputs are skipped rather than counted as
// zero.
// =============================================================================

/// Compute the trailing SMA series for `values` and look-back `period`.
///
/// The returned vector has the same length as `values`.
///
/// # Edge cases
/// - `period == 0` => every element `None`
/// - a window with no present values => `None` for that element
pub fn trailing_sma(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            let lo = (i + 1).saturating_sub(period);
            window_mean(&values[lo..=i])
        })
        .collect()
}

/// Mean of the present, finite values in `window`, or `None` if there are none.
pub fn window_mean(window: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = window
        .iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0_usize), |(s, n), &v| (s + v, n + 1));

    if count == 0 {
        return None;
    }
    let mean = sum / count as f64;
    mean.is_finite().then_some(mean)
}
