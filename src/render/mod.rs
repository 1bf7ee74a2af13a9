mod artwork;

use std::path::PathBuf;
use std::time::Duration;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::error::Error;
use crate::model::{Card, Face};

pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Offscreen bitmap one card at a time is drawn onto. An export creates a
/// single surface and lends it to the renderer by `&mut`, so two cards can
/// never occupy it at once.
pub struct RenderSurface {
    canvas: RgbaImage,
}

impl RenderSurface {
    /// Largest bitmap an export will allocate (256 MiB of RGBA).
    pub const MAX_PIXELS: u64 = 64 * 1024 * 1024;

    pub fn new(width: u32, height: u32) -> Self {
        log::debug!("Render surface allocated: {width}x{height}px");
        RenderSurface { canvas: RgbaImage::new(width.max(1), height.max(1)) }
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn clear(&mut self, color: Rgba<u8>) {
        for p in self.canvas.pixels_mut() {
            *p = color;
        }
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut RgbaImage {
        &mut self.canvas
    }
}

impl Drop for RenderSurface {
    fn drop(&mut self) {
        log::debug!(
            "Render surface released: {}x{}px",
            self.canvas.width(),
            self.canvas.height()
        );
    }
}

/// Draws one face of one card onto the surface. Implementations only see the
/// surface they are handed; pagination and PDF assembly never touch pixels.
pub trait CardRenderer {
    fn render(&mut self, card: &Card, face: Face, surface: &mut RenderSurface) -> Result<(), Error>;
}

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const FRONT_TINT: Rgba<u8> = Rgba([236, 239, 244, 255]);
const BACK_TINT: Rgba<u8> = Rgba([72, 86, 112, 255]);
const BORDER: Rgba<u8> = Rgba([40, 40, 40, 255]);

/// Renders card artwork from the `image` / `backimage` fields (file paths,
/// http(s) URLs, or base64 data URLs), scaled to cover the card. A face with
/// no artwork becomes a tinted placeholder panel.
pub struct ImageRenderer {
    loader: artwork::ArtworkLoader,
}

impl ImageRenderer {
    /// `base_dir` resolves relative artwork paths; `timeout` bounds each
    /// remote fetch.
    pub fn new(base_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        ImageRenderer { loader: artwork::ArtworkLoader::new(base_dir.into(), timeout) }
    }
}

impl Default for ImageRenderer {
    fn default() -> Self {
        ImageRenderer::new(".", DEFAULT_IMAGE_TIMEOUT)
    }
}

impl CardRenderer for ImageRenderer {
    fn render(&mut self, card: &Card, face: Face, surface: &mut RenderSurface) -> Result<(), Error> {
        let (w, h) = (surface.width(), surface.height());
        match card.artwork(face) {
            Some(reference) => {
                let img = self.loader.load(reference)?;
                let filled = img.resize_to_fill(w, h, FilterType::Triangle).to_rgba8();
                surface.clear(WHITE);
                imageops::overlay(surface.canvas_mut(), &filled, 0, 0);
            }
            None => {
                let tint = match face {
                    Face::Front => FRONT_TINT,
                    Face::Back => BACK_TINT,
                };
                surface.clear(tint);
                draw_border(surface.canvas_mut(), (w.min(h) / 60).max(1));
            }
        }
        Ok(())
    }
}

fn draw_border(canvas: &mut RgbaImage, thickness: u32) {
    let (w, h) = canvas.dimensions();
    for (x, y, p) in canvas.enumerate_pixels_mut() {
        if x < thickness || y < thickness || x + thickness >= w || y + thickness >= h {
            *p = BORDER;
        }
    }
}
