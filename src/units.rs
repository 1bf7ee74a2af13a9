/// Pixels per millimeter at the 96 DPI CSS reference resolution.
pub const PX_PER_MM: f32 = 3.779_527_6;

/// PDF points per millimeter (72 points per inch).
pub const PT_PER_MM: f32 = 72.0 / 25.4;

pub fn mm_to_px(mm: f32) -> f32 {
    mm * PX_PER_MM
}

pub fn px_to_mm(px: f32) -> f32 {
    px / PX_PER_MM
}

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

pub fn pt_to_mm(pt: f32) -> f32 {
    pt / PT_PER_MM
}

/// Whole-pixel size of a bitmap covering `mm` at 96 DPI, never smaller than 1.
pub fn mm_to_px_rounded(mm: f32) -> u32 {
    mm_to_px(mm).round().max(1.0) as u32
}
