use crate::error::Error;
use crate::model::{FlipDirection, Margins, PrintConfig, Spacing};

/// Grid geometry derived from a `PrintConfig`. All lengths are millimeters
/// already multiplied by the quality factor (`scale`); the counts do not
/// depend on it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    pub cards_per_row: usize,
    pub cards_per_column: usize,
    pub cards_per_page: usize,
    pub card_width: f32,
    pub card_height: f32,
    pub page_width: f32,
    pub page_height: f32,
    pub printable_width: f32,
    pub printable_height: f32,
    pub margins: Margins,
    pub spacing: Spacing,
    pub flip_direction: FlipDirection,
    pub scale: f32,
}

/// Slack granted to a row that fills the printable area exactly. The inputs
/// are f32, so an exact fit can land a few ulps short of the next integer.
const FIT_TOLERANCE_MM: f64 = 1e-3;

/// Upper bound on cards along one axis, so the page capacity cannot overflow
/// for configurations that never went through `PrintConfig::validate`.
pub const MAX_CARDS_PER_AXIS: usize = 10_000;

/// How many `pitch`-sized cells fit in `available`; zero when nothing fits or
/// the pitch is degenerate.
fn fit_count(available: f64, pitch: f64) -> usize {
    if !(pitch > 0.0) || !(available > 0.0) {
        return 0;
    }
    let n = ((available + FIT_TOLERANCE_MM) / pitch).floor();
    if n >= MAX_CARDS_PER_AXIS as f64 {
        MAX_CARDS_PER_AXIS
    } else {
        n as usize
    }
}

impl Layout {
    pub fn compute(config: &PrintConfig) -> Layout {
        let card = config.card_dimensions();
        let m = config.margins;
        let sp = config.spacing;

        let printable_width = config.paper.width - m.left - m.right;
        let printable_height = config.paper.height - m.top - m.bottom;

        let cards_per_row = fit_count(
            f64::from(config.paper.width) - f64::from(m.left) - f64::from(m.right),
            f64::from(card.width) + f64::from(sp.horizontal),
        );
        let cards_per_column = fit_count(
            f64::from(config.paper.height) - f64::from(m.top) - f64::from(m.bottom),
            f64::from(card.height) + f64::from(sp.vertical),
        );

        let k = config.quality.0;
        Layout {
            cards_per_row,
            cards_per_column,
            cards_per_page: cards_per_row.saturating_mul(cards_per_column),
            card_width: card.width * k,
            card_height: card.height * k,
            page_width: config.paper.width * k,
            page_height: config.paper.height * k,
            printable_width: printable_width * k,
            printable_height: printable_height * k,
            margins: m.scaled(k),
            spacing: sp.scaled(k),
            flip_direction: config.flip_direction,
            scale: k,
        }
    }

    /// `Err(NothingFits)` when a page cannot hold a single card.
    pub fn ensure_capacity(&self) -> Result<(), Error> {
        if self.cards_per_page > 0 {
            return Ok(());
        }
        let k = if self.scale > 0.0 { self.scale } else { 1.0 };
        Err(Error::NothingFits {
            printable_width: self.printable_width / k,
            printable_height: self.printable_height / k,
            card_width: self.card_width / k,
            card_height: self.card_height / k,
        })
    }

    /// Top-left corner of grid slot `slot` (row-major), measured from the
    /// top-left corner of the page.
    pub fn slot_origin(&self, slot: usize) -> (f32, f32) {
        let cols = self.cards_per_row.max(1);
        let (row, col) = (slot / cols, slot % cols);
        let x = self.margins.left + col as f32 * (self.card_width + self.spacing.horizontal);
        let y = self.margins.top + row as f32 * (self.card_height + self.spacing.vertical);
        (x, y)
    }
}
