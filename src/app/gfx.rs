// src/app/gfx.rs
use eframe::egui::{self as eg, ColorImage, TextureHandle};
use image::imageops::FilterType;
use image::GenericImageView;

use crate::app::cache::TargetSize;

/// Decode encoded image bytes and shrink them to fit inside `size`, keeping
/// the aspect ratio. Small images are never upscaled. (Any thread.)
pub fn decode_and_fit(bytes: &[u8], size: TargetSize) -> Result<ColorImage, String> {
    if bytes.is_empty() {
        return Err("empty image body".into());
    }
    let img = image::load_from_memory(bytes).map_err(|e| format!("decode: {e}"))?;
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(format!("degenerate image {w}x{h}"));
    }

    let max_w = size.width.max(1);
    let max_h = size.height.max(1);
    let fitted = if w > max_w || h > max_h {
        img.resize(max_w, max_h, FilterType::Lanczos3)
    } else {
        img
    };

    let (fw, fh) = fitted.dimensions();
    let rgba = fitted.to_rgba8();
    Ok(ColorImage::from_rgba_unmultiplied(
        [fw as usize, fh as usize],
        rgba.as_raw(),
    ))
}

/// Upload a decoded poster to a GPU texture. (UI thread only)
pub fn upload_poster(ctx: &eg::Context, image: &ColorImage, name: &str) -> TextureHandle {
    ctx.load_texture(name.to_string(), image.clone(), eg::TextureOptions::LINEAR)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    pub(crate) fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba([200, 40, 40, 255]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn shrinks_preserving_aspect() {
        let img = decode_and_fit(&png_bytes(300, 450), TargetSize::new(140, 200)).unwrap();
        // 300x450 is 2:3; limited by height 200 would need width 133.
        assert_eq!(img.size, [133, 200]);
    }

    #[test]
    fn never_upscales() {
        let img = decode_and_fit(&png_bytes(20, 30), TargetSize::new(140, 200)).unwrap();
        assert_eq!(img.size, [20, 30]);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(decode_and_fit(b"not an image", TargetSize::new(140, 200)).is_err());
        assert!(decode_and_fit(&[], TargetSize::new(140, 200)).is_err());
    }
}
