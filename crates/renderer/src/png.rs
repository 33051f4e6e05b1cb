//! PNG encoding for RGBA figure buffers.
//!
//! Two encodings are produced:
//! - **Indexed PNG (color type 3)** when the figure uses at most 256 colors,
//!   which is the common case for classed precipitation maps.
//! - **RGBA PNG (color type 6)** otherwise.

use precip_common::{PrecipError, PrecipResult};
use std::collections::HashMap;
use std::io::Write;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

type Palette = Vec<[u8; 4]>;

/// Encode RGBA pixels, choosing indexed output when the palette fits.
pub fn encode_png(pixels: &[u8], width: usize, height: usize) -> PrecipResult<Vec<u8>> {
    check_buffer(pixels, width, height)?;
    match extract_palette(pixels) {
        Some((palette, indices)) => encode_indexed(width, height, &palette, &indices),
        None => encode_rgba(pixels, width, height),
    }
}

fn check_buffer(pixels: &[u8], width: usize, height: usize) -> PrecipResult<()> {
    if width == 0 || height == 0 {
        return Err(PrecipError::Render(format!(
            "cannot encode an empty {}x{} image",
            width, height
        )));
    }
    if pixels.len() != width * height * 4 {
        return Err(PrecipError::Render(format!(
            "{} bytes for a {}x{} RGBA image",
            pixels.len(),
            width,
            height
        )));
    }
    Ok(())
}

/// Palette and per-pixel indices, `None` past 256 distinct colors.
fn extract_palette(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let mut lookup: HashMap<[u8; 4], u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let key = [px[0], px[1], px[2], px[3]];
        let index = match lookup.get(&key) {
            Some(&i) => i,
            None => {
                if palette.len() == MAX_PALETTE_SIZE {
                    return None;
                }
                let i = palette.len() as u8;
                palette.push(key);
                lookup.insert(key, i);
                i
            }
        };
        indices.push(index);
    }
    Some((palette, indices))
}

fn header(width: usize, height: usize, color_type: u8) -> [u8; 13] {
    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&(width as u32).to_be_bytes());
    ihdr[4..8].copy_from_slice(&(height as u32).to_be_bytes());
    ihdr[8] = 8; // bit depth
    ihdr[9] = color_type;
    // compression, filter and interlace methods stay 0
    ihdr
}

fn encode_indexed(
    width: usize,
    height: usize,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> PrecipResult<Vec<u8>> {
    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &header(width, height, 3));

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    write_chunk(&mut png, b"IDAT", &deflate_scanlines(indices, width, height)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> PrecipResult<Vec<u8>> {
    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &header(width, height, 6));
    write_chunk(&mut png, b"IDAT", &deflate_scanlines(pixels, width * 4, height)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Prefix each scanline with filter type 0 and zlib-compress the lot.
fn deflate_scanlines(data: &[u8], row_bytes: usize, height: usize) -> PrecipResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(height * (row_bytes + 1));
    for row in data.chunks_exact(row_bytes).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(&raw)
        .and_then(|_| encoder.finish())
        .map_err(|e| PrecipError::Render(format!("IDAT compression failed: {}", e)))
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}
