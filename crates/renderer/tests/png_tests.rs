//! Tests for PNG encoding, checked by decoding with the `image` crate.

use renderer::png::create_png;

// ============================================================================
// Helper functions
// ============================================================================

/// A horizontal red-to-blue ramp with a transparent right column.
fn ramp_pixels(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for _ in 0..height {
        for x in 0..width {
            let t = (x * 255 / (width - 1)) as u8;
            let alpha = if x == width - 1 { 0 } else { 255 };
            pixels.extend_from_slice(&[255 - t, 0, t, alpha]);
        }
    }
    pixels
}

// ============================================================================
// Encoding
// ============================================================================

#[test]
fn test_png_decodes_to_same_pixels() {
    let (w, h) = (37, 11);
    let pixels = ramp_pixels(w, h);

    let png = create_png(&pixels, w, h).unwrap();
    assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);

    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (w as u32, h as u32));
    assert_eq!(img.into_raw(), pixels);
}

#[test]
fn test_single_pixel() {
    let png = create_png(&[1, 2, 3, 4], 1, 1).unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [1, 2, 3, 4]);
}

#[test]
fn test_uniform_image_compresses() {
    let (w, h) = (256, 256);
    let pixels = vec![255u8; w * h * 4];
    let png = create_png(&pixels, w, h).unwrap();
    assert!(png.len() < pixels.len() / 50);
}
