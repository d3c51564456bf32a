//! Raster image optimization.
//!
//! The encoder is chosen by file extension, never by sniffing content.
//! Vector images and unknown formats pass through unchanged.
//!
//! PNG is re-encoded at best compression, which can occasionally grow a
//! file another optimizer already squeezed. WebP is only re-encoded when
//! the source is lossless; the encoder has no lossy mode, so lossy sources
//! are copied.

use anyhow::{Context, Result};
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{AnimationDecoder, DynamicImage, ImageFormat};
use std::io::Cursor;

/// JPEG quality used when re-encoding.
const JPEG_QUALITY: u8 = 82;

/// GIF quantizer speed, 1 (best) to 30 (fastest).
const GIF_SPEED: i32 = 10;

/// Raster formats that get re-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
}

/// How an image is handled, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAction {
    Reencode(RasterFormat),
    Copy,
}

impl ImageAction {
    pub fn for_extension(ext: Option<&str>) -> Self {
        match ext.map(str::to_ascii_lowercase).as_deref() {
            Some("png") => Self::Reencode(RasterFormat::Png),
            Some("jpg" | "jpeg") => Self::Reencode(RasterFormat::Jpeg),
            Some("gif") => Self::Reencode(RasterFormat::Gif),
            Some("webp") => Self::Reencode(RasterFormat::WebP),
            _ => Self::Copy,
        }
    }
}

/// Re-encode `bytes` according to `action`. `Copy` returns the input, as
/// does a lossy WebP.
pub fn optimize(action: ImageAction, bytes: Vec<u8>) -> Result<Vec<u8>> {
    match action {
        ImageAction::Copy => Ok(bytes),
        ImageAction::Reencode(RasterFormat::WebP) if !is_lossless_webp(&bytes) => Ok(bytes),
        ImageAction::Reencode(format) => reencode(format, &bytes),
    }
}

/// Whether a WebP file stores its image with the lossless (`VP8L`) codec.
///
/// Walks the RIFF chunks, so extended files (`VP8X` header, alpha, metadata)
/// are classified by their image chunk.
pub fn is_lossless_webp(bytes: &[u8]) -> bool {
    if bytes.len() < 12 || &bytes[..4] != b"RIFF" || &bytes[8..12] != b"WEBP" {
        return false;
    }
    let mut offset = 12;
    while offset + 8 <= bytes.len() {
        let fourcc = &bytes[offset..offset + 4];
        match fourcc {
            b"VP8L" => return true,
            b"VP8 " => return false,
            _ => {}
        }
        let size = u32::from_le_bytes([
            bytes[offset + 4],
            bytes[offset + 5],
            bytes[offset + 6],
            bytes[offset + 7],
        ]) as usize;
        // Chunks are padded to an even length
        offset += 8 + size + (size & 1);
    }
    false
}

fn reencode(format: RasterFormat, bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(bytes.len());
    match format {
        RasterFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive);
            decode(bytes, ImageFormat::Png)?.write_with_encoder(encoder)?;
        }
        RasterFormat::Jpeg => {
            let rgb = decode(bytes, ImageFormat::Jpeg)?.to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
            DynamicImage::ImageRgb8(rgb).write_with_encoder(encoder)?;
        }
        RasterFormat::Gif => reencode_gif(bytes, &mut out)?,
        RasterFormat::WebP => {
            let rgba = decode(bytes, ImageFormat::WebP)?.to_rgba8();
            let encoder = WebPEncoder::new_lossless(&mut out);
            DynamicImage::ImageRgba8(rgba).write_with_encoder(encoder)?;
        }
    }
    Ok(out)
}

fn decode(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage> {
    image::load_from_memory_with_format(bytes, format)
        .with_context(|| format!("Failed to decode {format:?} image"))
}

/// Re-encode every frame, keeping frame delays; the output loops forever.
fn reencode_gif(bytes: &[u8], out: &mut Vec<u8>) -> Result<()> {
    let frames = GifDecoder::new(Cursor::new(bytes))
        .and_then(|decoder| decoder.into_frames().collect_frames())
        .context("Failed to decode Gif image")?;

    let mut encoder = GifEncoder::new_with_speed(out, GIF_SPEED);
    encoder.set_repeat(Repeat::Infinite)?;
    encoder.encode_frames(frames)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageEncoder, Rgb, RgbImage};

    /// 1×1 GIF89a with a two-color palette, as commonly used for spacers.
    const PIXEL_GIF: [u8; 43] = [
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00,
        0x00, 0x00, 0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00,
        0x3b,
    ];

    fn gradient() -> RgbImage {
        RgbImage::from_fn(32, 32, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 128]))
    }

    fn fast_png(img: &RgbImage) -> Vec<u8> {
        let mut out = Vec::new();
        PngEncoder::new_with_quality(&mut out, CompressionType::Fast, FilterType::NoFilter)
            .write_image(img.as_raw(), img.width(), img.height(), image::ExtendedColorType::Rgb8)
            .unwrap();
        out
    }

    #[test]
    fn test_action_by_extension() {
        let png = ImageAction::Reencode(RasterFormat::Png);
        let jpeg = ImageAction::Reencode(RasterFormat::Jpeg);
        assert_eq!(ImageAction::for_extension(Some("PNG")), png);
        assert_eq!(ImageAction::for_extension(Some("jpeg")), jpeg);
        assert_eq!(ImageAction::for_extension(Some("jpg")), jpeg);
        assert_eq!(
            ImageAction::for_extension(Some("webp")),
            ImageAction::Reencode(RasterFormat::WebP)
        );
        assert_eq!(
            ImageAction::for_extension(Some("gif")),
            ImageAction::Reencode(RasterFormat::Gif)
        );
        assert_eq!(ImageAction::for_extension(Some("svg")), ImageAction::Copy);
        assert_eq!(ImageAction::for_extension(Some("ico")), ImageAction::Copy);
        assert_eq!(ImageAction::for_extension(None), ImageAction::Copy);
    }

    #[test]
    fn test_copy_is_identity() {
        let svg = b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_vec();
        assert_eq!(optimize(ImageAction::Copy, svg.clone()).unwrap(), svg);
    }

    #[test]
    fn test_png_reencoded_losslessly() {
        let img = gradient();
        let source = fast_png(&img);
        let optimized = optimize(ImageAction::Reencode(RasterFormat::Png), source.clone()).unwrap();

        assert_ne!(optimized, source);
        let decoded = image::load_from_memory(&optimized).unwrap().to_rgb8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_jpeg_reencoded() {
        let source = fast_png(&gradient());
        let png = image::load_from_memory(&source).unwrap();
        let mut jpeg = Vec::new();
        png.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();

        let optimized = optimize(ImageAction::Reencode(RasterFormat::Jpeg), jpeg.clone()).unwrap();
        assert_ne!(optimized, jpeg);
        assert_eq!(
            image::guess_format(&optimized).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_gif_reencoded() {
        let source = PIXEL_GIF.to_vec();
        let optimized = optimize(ImageAction::for_extension(Some("gif")), source.clone()).unwrap();
        assert_ne!(optimized, source);

        assert_eq!(image::guess_format(&optimized).unwrap(), ImageFormat::Gif);
        let decoded = image::load_from_memory_with_format(&optimized, ImageFormat::Gif).unwrap();
        assert_eq!(decoded.dimensions(), (1, 1));
    }

    #[test]
    fn test_gif_keeps_frames() {
        let mut source = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut source);
            let frames = [[255u8, 0, 0, 255], [0, 0, 255, 255]].map(|px| {
                image::Frame::new(image::RgbaImage::from_pixel(4, 4, image::Rgba(px)))
            });
            encoder.encode_frames(frames).unwrap();
        }

        let optimized = optimize(ImageAction::Reencode(RasterFormat::Gif), source).unwrap();
        let frames = GifDecoder::new(Cursor::new(&optimized))
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap();
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn test_webp_lossless_detection() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255])));
        let mut lossless = Vec::new();
        img.write_with_encoder(WebPEncoder::new_lossless(&mut lossless)).unwrap();
        assert!(is_lossless_webp(&lossless));

        let mut lossy = b"RIFF\x16\x00\x00\x00WEBPVP8 \x0a\x00\x00\x00".to_vec();
        lossy.extend_from_slice(&[0; 10]);
        assert!(!is_lossless_webp(&lossy));
        assert!(!is_lossless_webp(b"not a webp"));

        let mut extended = b"RIFF\x00\x00\x00\x00WEBPVP8X\x0a\x00\x00\x00".to_vec();
        extended.extend_from_slice(&[0; 10]);
        extended.extend_from_slice(b"VP8L\x00\x00\x00\x00");
        assert!(is_lossless_webp(&extended));
    }

    #[test]
    fn test_lossy_webp_copied() {
        let mut lossy = b"RIFF\x16\x00\x00\x00WEBPVP8 \x0a\x00\x00\x00".to_vec();
        lossy.extend_from_slice(&[7; 10]);
        let out = optimize(ImageAction::Reencode(RasterFormat::WebP), lossy.clone()).unwrap();
        assert_eq!(out, lossy);
    }

    #[test]
    fn test_decode_failure_is_error() {
        assert!(optimize(ImageAction::Reencode(RasterFormat::Png), b"not a png".to_vec()).is_err());
    }
}
