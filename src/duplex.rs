//! Back-page reordering for double-sided printing.
//!
//! A back page shows the same card slice as its front page. When the sheet is
//! turned over, each back has to land behind its own front, so the slice is
//! re-laid onto the grid according to the flip axis. Positions past the end of
//! a partially filled page are skipped rather than padded.

use crate::model::FlipDirection;

/// One card of a reordered back page: `source` indexes the page's card slice,
/// `slot` is the row-major grid position it should be drawn at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub slot: usize,
    pub source: usize,
}

/// Reorder a page of `len` cards laid out on a `cols` x `rows` grid.
/// Output is sorted by target slot.
pub fn back_page_order(
    len: usize,
    cols: usize,
    rows: usize,
    flip: FlipDirection,
) -> Vec<Placement> {
    match flip {
        FlipDirection::LongEdge => mirror_columns(len, cols, rows),
        FlipDirection::ShortEdge => reverse_row_blocks(len, cols, rows),
    }
}

/// Convenience wrapper that applies `back_page_order` to a slice.
pub fn reorder_back<T: Clone>(items: &[T], cols: usize, rows: usize, flip: FlipDirection) -> Vec<T> {
    back_page_order(items.len(), cols, rows, flip)
        .into_iter()
        .map(|p| items[p.source].clone())
        .collect()
}

/// Long-edge flip: walk each column and send the card at row `r` to row
/// `rows - 1 - r`.
fn mirror_columns(len: usize, cols: usize, rows: usize) -> Vec<Placement> {
    if cols == 0 || rows == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(len.min(cols.saturating_mul(rows)));
    for col in 0..cols {
        for row in 0..rows {
            let source = row * cols + col;
            if source >= len {
                break; // rest of this column is empty
            }
            let target_row = rows - 1 - row;
            out.push(Placement { slot: target_row * cols + col, source });
        }
    }
    out.sort_by_key(|p| p.slot);
    out
}

/// Short-edge flip: read the grid bottom-to-top, left-to-right.
fn reverse_row_blocks(len: usize, cols: usize, rows: usize) -> Vec<Placement> {
    if cols == 0 || rows == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(len.min(cols.saturating_mul(rows)));
    for target_row in 0..rows {
        let source_row = rows - 1 - target_row;
        for col in 0..cols {
            let source = source_row * cols + col;
            if source < len {
                out.push(Placement { slot: target_row * cols + col, source });
            }
        }
    }
    out
}
