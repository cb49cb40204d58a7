// =============================================================================
// Indicator Engine — per-symbol windowed enrichment
// =============================================================================
//
// Partition rows by symbol, order each partition by date, and attach
// MA-5 / MA-20 / MA-60 and RSI-14 to every row. Pure: the input slice is only
// read, and the output has exactly one enriched row per input row.
//
// Ordering guarantees:
//   - Partitions come out in ascending symbol order.
//   - Within a partition rows are in ascending date order; rows sharing a
//     date keep their input order (stable sort).
// =============================================================================

use std::collections::BTreeMap;

use crate::indicators::rsi::rolling_rsi;
use crate::indicators::sma::trailing_sma;
use crate::types::{EnrichedPriceRow, PriceRow};

pub const MA_SHORT: usize = 5;
pub const MA_MEDIUM: usize = 20;
pub const MA_LONG: usize = 60;
pub const RSI_PERIOD: usize = 14;

/// Enrich every row of `rows` with its symbol's trailing indicators.
pub fn enrich(rows: &[PriceRow]) -> Vec<EnrichedPriceRow> {
    let mut partitions: BTreeMap<&str, Vec<&PriceRow>> = BTreeMap::new();
    for row in rows {
        partitions.entry(row.symbol.as_str()).or_default().push(row);
    }

    let mut out = Vec::with_capacity(rows.len());
    for (_, mut partition) in partitions {
        partition.sort_by_key(|r| r.date);
        enrich_partition(&partition, &mut out);
    }
    out
}

/// Enrich one date-ordered, single-symbol partition into `out`.
fn enrich_partition(partition: &[&PriceRow], out: &mut Vec<EnrichedPriceRow>) {
    // NaN closes are gaps, same as empty cells.
    let closes: Vec<Option<f64>> = partition
        .iter()
        .map(|r| r.close.filter(|c| c.is_finite()))
        .collect();

    let ma_5 = trailing_sma(&closes, MA_SHORT);
    let ma_20 = trailing_sma(&closes, MA_MEDIUM);
    let ma_60 = trailing_sma(&closes, MA_LONG);
    let rsi_14 = rolling_rsi(&closes, RSI_PERIOD);

    for (i, row) in partition.iter().enumerate() {
        // A row without a close has nothing to annotate.
        let enriched = if closes[i].is_none() {
            EnrichedPriceRow::from_row(row, None, None, None, None)
        } else {
            EnrichedPriceRow::from_row(row, ma_5[i], ma_20[i], ma_60[i], rsi_14[i])
        };
        out.push(enriched);
    }
}

/// Number of rows whose `(symbol, date)` key repeats an earlier row.
pub fn count_duplicate_keys(rows: &[PriceRow]) -> usize {
    let mut seen = std::collections::HashSet::with_capacity(rows.len());
    rows.iter()
        .filter(|r| !seen.insert((r.symbol.as_str(), r.date)))
        .count()
}
