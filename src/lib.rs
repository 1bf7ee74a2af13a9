mod api;
mod duplex;
mod error;
mod layout;
mod model;
mod paginate;
mod pdf;
mod render;
mod store;
mod units;

pub use api::{CardsClient, IdsRequest, UpdateRequest};
pub use duplex::{Placement, back_page_order, reorder_back};
pub use error::Error;
pub use layout::{Layout, MAX_CARDS_PER_AXIS};
pub use model::{
    Card, CardSize, ConfigEditor, Dimensions, DisplayMode, Face, FlipDirection, Margins,
    PaperSize, PrintConfig, Quality, Spacing, parse_cards,
};
pub use paginate::{Page, Pagination, PlacedCard};
pub use pdf::{ExportReport, Exporter, SkippedCard};
pub use render::{CardRenderer, DEFAULT_IMAGE_TIMEOUT, ImageRenderer, RenderSurface};
pub use store::{HandoffStore, PRINT_CARDS_KEY};
pub use units::{PT_PER_MM, PX_PER_MM, mm_to_pt, mm_to_px, pt_to_mm, px_to_mm};

use std::path::Path;
use std::time::Instant;

/// Read a card list from a JSON file (`{"cards": [...]}` or a bare array).
pub fn load_cards(path: &Path) -> Result<Vec<Card>, Error> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
        ),
        _ => Error::Io(e),
    })?;
    parse_cards(&bytes)
}

/// Export `cards` to a PDF file at `output`. The `exporter` is shared by all
/// callers, so an export started while another is running is refused with
/// `Error::ExportInProgress`.
pub fn export_cards_to_pdf(
    exporter: &Exporter,
    cards: &[Card],
    config: &PrintConfig,
    renderer: &mut dyn CardRenderer,
    output: &Path,
    on_progress: &mut dyn FnMut(u8),
) -> Result<ExportReport, Error> {
    let t0 = Instant::now();

    let (bytes, report) = exporter.export(cards, config, renderer, on_progress)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_render.as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(report)
}
