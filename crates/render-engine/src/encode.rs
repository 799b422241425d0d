//! Image file encoders for indexed subtitle bitmaps.

use std::io::Cursor;

use burnsub_common::config::TiffCompression;
use burnsub_common::error::{BurnError, BurnResult};
use tiff::encoder::compression::{Deflate, Lzw, Packbits, Uncompressed};
use tiff::encoder::{colortype, TiffEncoder};

use crate::quantize::{IndexedBitmap, Palette};

/// Alpha for each palette index; only the background is transparent.
const PALETTE_ALPHA: [u8; 4] = [255, 255, 255, 0];

/// Encode as an 8-bit indexed PNG with a four-entry palette.
pub fn encode_png(bitmap: &IndexedBitmap, palette: &Palette) -> BurnResult<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, bitmap.width(), bitmap.height());
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_palette(palette.rgb_bytes());
        encoder.set_trns(PALETTE_ALPHA.to_vec());
        encoder.set_compression(png::Compression::Best);

        let mut writer = encoder
            .write_header()
            .map_err(|e| BurnError::encode(format!("PNG header: {e}")))?;
        writer
            .write_image_data(bitmap.pixels())
            .map_err(|e| BurnError::encode(format!("PNG data: {e}")))?;
        writer
            .finish()
            .map_err(|e| BurnError::encode(format!("PNG finish: {e}")))?;
    }
    Ok(out)
}

/// Encode as an RGB TIFF expanded from the palette.
pub fn encode_tiff(
    bitmap: &IndexedBitmap,
    palette: &Palette,
    method: TiffCompression,
) -> BurnResult<Vec<u8>> {
    let rgb = bitmap.to_rgb(palette);
    let (width, height) = (bitmap.width(), bitmap.height());
    let data = rgb.as_raw();

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut encoder =
            TiffEncoder::new(&mut cursor).map_err(|e| BurnError::encode(format!("TIFF: {e}")))?;
        let written = match method {
            TiffCompression::None => encoder.write_image_with_compression::<colortype::RGB8, _>(
                width,
                height,
                Uncompressed,
                data,
            ),
            TiffCompression::Lzw => encoder.write_image_with_compression::<colortype::RGB8, _>(
                width,
                height,
                Lzw,
                data,
            ),
            TiffCompression::Deflate => encoder
                .write_image_with_compression::<colortype::RGB8, _>(
                    width,
                    height,
                    Deflate::default(),
                    data,
                ),
            TiffCompression::Packbits => encoder
                .write_image_with_compression::<colortype::RGB8, _>(
                    width,
                    height,
                    Packbits,
                    data,
                ),
        };
        written.map_err(|e| BurnError::encode(format!("TIFF: {e}")))?;
    }
    Ok(cursor.into_inner())
}
