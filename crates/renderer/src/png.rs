//! PNG encoding for RGBA image data.
//!
//! Plots are truecolor with antialiased edges, so only the RGBA (color
//! type 6) encoder is provided. Scanlines are stored unfiltered and
//! compressed with zlib.

use std::io::Write;

use crate::error::{RenderError, RenderResult};

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Create a PNG image from RGBA pixel data.
///
/// # Arguments
/// - `pixels`: RGBA pixel data (4 bytes per pixel, row-major)
/// - `width`: Image width in pixels
/// - `height`: Image height in pixels
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidSize {
            width: width as u32,
            height: height as u32,
        });
    }
    if pixels.len() != width * height * 4 {
        return Err(RenderError::Encode(format!(
            "expected {} bytes for {}x{} RGBA, got {}",
            width * height * 4,
            width,
            height,
            pixels.len()
        )));
    }

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(6); // color type (RGBA)
    ihdr.push(0); // compression method
    ihdr.push(0); // filter method
    ihdr.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr);

    let idat = deflate_scanlines(pixels, width, height)
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))?;
    write_chunk(&mut png, b"IDAT", &idat);

    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Append a chunk: length, type, data, CRC over type and data.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

fn deflate_scanlines(pixels: &[u8], width: usize, height: usize) -> std::io::Result<Vec<u8>> {
    let stride = width * 4;
    let mut raw = Vec::with_capacity(height * (1 + stride));
    for row in pixels.chunks_exact(stride) {
        raw.push(0); // filter type: none
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&raw)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_layout() {
        let mut out = Vec::new();
        write_chunk(&mut out, b"IEND", &[]);
        assert_eq!(&out[0..4], &[0, 0, 0, 0]);
        assert_eq!(&out[4..8], b"IEND");
        // Well-known CRC of an empty IEND chunk.
        assert_eq!(&out[8..12], &[0xAE, 0x42, 0x60, 0x82]);
    }

    #[test]
    fn test_rejects_wrong_buffer_length() {
        assert!(matches!(
            create_png(&[0; 15], 2, 2),
            Err(RenderError::Encode(_))
        ));
        assert!(matches!(
            create_png(&[], 0, 2),
            Err(RenderError::InvalidSize { .. })
        ));
    }
}
