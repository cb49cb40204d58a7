// =============================================================================
// Relative Strength Index (RSI) — rolling simple averages
// =============================================================================
//
// Step 1: diff_t = close_t - close_{t-1}; diff_0 = 0 (no prior close).
//         A change touching a missing close counts as no change.
// Step 2: gain_t = max(diff_t, 0), loss_t = max(-diff_t, 0).
// Step 3: avg_gain / avg_loss = trailing mean over `period` samples,
//         truncated during warm-up (same windowing as the SMA).
// Step 4: RS  = avg_gain / avg_loss
//         RSI = 100 - 100 / (1 + RS)
//
// A zero average loss leaves RSI undefined. It is reported as `None`, not
// clamped to 100, so "no losses" stays distinguishable from "overbought".
// =============================================================================

use super::sma::trailing_sma;

/// Compute the RSI series for date-ordered `closes` and look-back `period`.
///
/// The returned vector has the same length as `closes`.
///
/// # Edge cases
/// - `period == 0` => every element `None`
/// - average loss of zero (flat or rising window) => `None`
pub fn rolling_rsi(closes: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    let (gains, losses): (Vec<Option<f64>>, Vec<Option<f64>>) = price_changes(closes)
        .into_iter()
        .map(|d| (Some(d.max(0.0)), Some((-d).max(0.0))))
        .unzip();

    let avg_gains = trailing_sma(&gains, period);
    let avg_losses = trailing_sma(&losses, period);

    avg_gains
        .into_iter()
        .zip(avg_losses)
        .map(|(g, l)| rsi_from_averages(g?, l?))
        .collect()
}

/// Bar-to-bar close changes. The first element is always zero.
fn price_changes(closes: &[Option<f64>]) -> Vec<f64> {
    let mut diffs = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return diffs;
    }
    diffs.push(0.0);
    diffs.extend(closes.windows(2).map(|w| match (w[0], w[1]) {
        (Some(prev), Some(cur)) => cur - prev,
        _ => 0.0,
    }));
    diffs
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Returns `None` when the average loss is zero or the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return None;
    }
    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - 100.0 / (1.0 + rs);
    rsi.is_finite().then_some(rsi)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn some(xs: &[f64]) -> Vec<Option<f64>> {
        xs.iter().copied().map(Some).collect()
    }

    #[test]
    fn rsi_empty_input() {
        assert!(rolling_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert_eq!(rolling_rsi(&some(&[1.0, 2.0]), 0), vec![None, None]);
    }

    #[test]
    fn rsi_first_element_has_no_losses() {
        let series = rolling_rsi(&some(&[10.0, 9.0]), 14);
        assert_eq!(series[0], None);
        // gains [0, 0], losses [0, 1] => RS = 0 => RSI = 0
        assert_eq!(series[1], Some(0.0));
    }

    #[test]
    fn rsi_all_gains_is_undefined() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        for v in rolling_rsi(&some(&closes), 14) {
            assert!(v.is_none(), "expected None, got {v:?}");
        }
    }

    #[test]
    fn rsi_flat_market_is_undefined() {
        for v in rolling_rsi(&some(&[100.0; 20]), 14) {
            assert!(v.is_none());
        }
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let series = rolling_rsi(&some(&closes), 14);
        assert!(series[0].is_none());
        for v in &series[1..] {
            let v = v.expect("losses present");
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_losses_leave_window_after_period() {
        // One drop, then 14 rises: the drop falls out of the 14-sample window.
        let mut closes = vec![10.0, 9.0];
        closes.extend((0..14).map(|i| 10.0 + i as f64));
        let series = rolling_rsi(&some(&closes), 14);
        assert!(series[14].is_some());
        assert!(series[15].is_none());
    }

    #[test]
    fn rsi_range_check() {
        let closes = [
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for v in rolling_rsi(&some(&closes), 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_gap_counts_as_no_change() {
        let closes = vec![Some(10.0), None, Some(8.0)];
        let series = rolling_rsi(&closes, 14);
        // Neither 10 -> None nor None -> 8 is a move, so no losses yet.
        assert!(series.iter().all(Option::is_none));
    }
}
