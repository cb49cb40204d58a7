// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free trailing-window indicators over a single symbol's
// date-ordered closes. Every series function returns one `Option<f64>` per
// input element so callers can line values back up with their rows; `None`
// marks a value that is undefined (empty window, zero denominator).

pub mod rsi;
pub mod sma;
