use image::RgbaImage;
use pdf_writer::{Filter, Pdf, Ref};

/// Write `bitmap` as a Flate-compressed RGB image XObject, with a soft mask
/// when any pixel is not fully opaque. Returns the XObject ref.
pub(super) fn embed_bitmap(
    pdf: &mut Pdf,
    alloc: &mut dyn FnMut() -> Ref,
    bitmap: &RgbaImage,
) -> Ref {
    let xobj_ref = alloc();
    let (w, h) = (bitmap.width(), bitmap.height());
    let has_alpha = bitmap.pixels().any(|p| p.0[3] < 255);

    let rgb_data: Vec<u8> = bitmap
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();
    let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

    let smask_ref = if has_alpha {
        let alpha_data: Vec<u8> = bitmap.pixels().map(|p| p.0[3]).collect();
        let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
        let mask_ref = alloc();
        let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(w as i32);
        mask.height(h as i32);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        Some(mask_ref)
    } else {
        None
    };

    let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
    xobj.filter(Filter::FlateDecode);
    xobj.width(w as i32);
    xobj.height(h as i32);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    if let Some(mask_ref) = smask_ref {
        xobj.s_mask(mask_ref);
    }
    xobj_ref
}
