mod embed;

use std::sync::atomic::{AtomicBool, Ordering};

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref};

use crate::error::Error;
use crate::layout::Layout;
use crate::model::{Card, Face, PrintConfig};
use crate::paginate::Pagination;
use crate::render::{CardRenderer, RenderSurface};
use crate::units::{mm_to_pt, mm_to_px_rounded};

use embed::embed_bitmap;

/// A card left out of the document because its face could not be rendered.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedCard {
    pub page: usize,
    pub card_id: String,
    pub face: Face,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExportReport {
    pub page_count: usize,
    pub placed: usize,
    pub skipped: Vec<SkippedCard>,
}

/// Runs PDF exports, refusing to start one while another is in flight.
#[derive(Debug, Default)]
pub struct Exporter {
    exporting: AtomicBool,
}

/// Clears the exporting flag on every exit path.
struct ExportingGuard<'a>(&'a AtomicBool);

impl Drop for ExportingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Exporter {
    pub const fn new() -> Self {
        Exporter { exporting: AtomicBool::new(false) }
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::Acquire)
    }

    /// Lay out `cards` per `config`, render every placed card through
    /// `renderer` and assemble the pages into a PDF.
    ///
    /// Cards are processed one at a time in page order, then slot order.
    /// A card that fails to render is logged and skipped; the export goes on.
    /// `on_progress` receives the rounded percentage of cards processed after
    /// each card.
    pub fn export(
        &self,
        cards: &[Card],
        config: &PrintConfig,
        renderer: &mut dyn CardRenderer,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<(Vec<u8>, ExportReport), Error> {
        if self
            .exporting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::ExportInProgress);
        }
        let _guard = ExportingGuard(&self.exporting);

        config.validate()?;
        let layout = Layout::compute(config);
        layout.ensure_capacity()?;
        render_pdf(cards, config, &layout, renderer, on_progress)
    }
}

fn render_pdf(
    cards: &[Card],
    config: &PrintConfig,
    layout: &Layout,
    renderer: &mut dyn CardRenderer,
    on_progress: &mut dyn FnMut(u8),
) -> Result<(Vec<u8>, ExportReport), Error> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();

    let pagination = Pagination::new(cards, layout, config.display_mode);
    let pages: Vec<_> = pagination.pages().collect();
    let total_cards: usize = pages.iter().map(|p| p.len()).sum();
    if pages.is_empty() {
        log::warn!("No cards to export; writing an empty document");
    }

    let (surface_w, surface_h) =
        (mm_to_px_rounded(layout.card_width), mm_to_px_rounded(layout.card_height));
    if u64::from(surface_w) * u64::from(surface_h) > RenderSurface::MAX_PIXELS {
        return Err(Error::InvalidConfig(format!(
            "card bitmap of {surface_w}x{surface_h} px is too large; lower the quality or card size"
        )));
    }
    let mut surface = RenderSurface::new(surface_w, surface_h);

    let page_h_pt = mm_to_pt(layout.page_height);
    let card_w_pt = mm_to_pt(layout.card_width);
    let card_h_pt = mm_to_pt(layout.card_height);

    let mut report = ExportReport { page_count: pages.len(), ..Default::default() };
    let mut all_contents: Vec<Content> = Vec::with_capacity(pages.len());
    let mut page_xobjects: Vec<Vec<(String, Ref)>> = Vec::with_capacity(pages.len());
    let mut processed = 0usize;
    let mut last_pct = 0u8;

    for page in &pages {
        let mut content = Content::new();
        let mut xobjects: Vec<(String, Ref)> = Vec::new();

        for placed in &page.cards {
            match renderer.render(placed.card, placed.face, &mut surface) {
                Ok(()) => {
                    let xobj_ref = embed_bitmap(&mut pdf, &mut alloc, surface.canvas());
                    let name = format!("Im{}", xobjects.len() + 1);
                    let (x_mm, y_mm) = layout.slot_origin(placed.slot);
                    let x = mm_to_pt(x_mm);
                    let y = page_h_pt - mm_to_pt(y_mm) - card_h_pt;
                    content.save_state();
                    content.transform([card_w_pt, 0.0, 0.0, card_h_pt, x, y]);
                    content.x_object(Name(name.as_bytes()));
                    content.restore_state();
                    xobjects.push((name, xobj_ref));
                    report.placed += 1;
                }
                Err(e) => {
                    log::warn!(
                        "Skipping card '{}' ({:?}) on page {}: {e}",
                        placed.card.id,
                        placed.face,
                        page.index + 1
                    );
                    report.skipped.push(SkippedCard {
                        page: page.index,
                        card_id: placed.card.id.clone(),
                        face: placed.face,
                        reason: e.to_string(),
                    });
                }
            }

            processed += 1;
            let pct = ((processed * 100) as f64 / total_cards as f64).round() as u8;
            last_pct = last_pct.max(pct);
            on_progress(last_pct);
        }

        log::debug!(
            "Page {}/{} ({}): {} card(s)",
            page.index + 1,
            pages.len(),
            if page.is_back { "back" } else { "front" },
            page.len()
        );
        all_contents.push(content);
        page_xobjects.push(xobjects);
    }

    drop(surface);
    let t_render = t0.elapsed();

    let n = all_contents.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, c) in all_contents.into_iter().enumerate() {
        let raw = c.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    let media_box = Rect::new(0.0, 0.0, mm_to_pt(layout.page_width), page_h_pt);
    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(media_box)
            .parent(pages_id)
            .contents(content_ids[i]);
        if !page_xobjects[i].is_empty() {
            let mut resources = page.resources();
            let mut xobjects = resources.x_objects();
            for (name, xobj_ref) in &page_xobjects[i] {
                xobjects.pair(Name(name.as_bytes()), *xobj_ref);
            }
        }
    }

    let t_assembly = t0.elapsed();
    log::info!(
        "Export phases: render={:.1}ms, assembly={:.1}ms ({} page(s), {} placed, {} skipped)",
        t_render.as_secs_f64() * 1000.0,
        (t_assembly - t_render).as_secs_f64() * 1000.0,
        n,
        report.placed,
        report.skipped.len(),
    );

    Ok((pdf.finish(), report))
}
