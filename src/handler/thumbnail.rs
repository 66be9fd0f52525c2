use std::io::Cursor;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};

/// Format to re-encode with: the detected source format, or JPEG when the
/// source format could not be determined.
pub fn chosen_format(detected: Option<ImageFormat>) -> ImageFormat {
  detected.unwrap_or(ImageFormat::Jpeg)
}

/// Decodes `data`, resizes it to exactly `width`×`height` and re-encodes it.
/// Aspect ratio is intentionally not preserved; non-square inputs distort.
pub fn render(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
  let reader = ImageReader::new(Cursor::new(data))
    .with_guessed_format()
    .context("failed to probe image format")?;
  let detected = reader.format();
  let img = reader.decode().context("failed to decode image")?;

  let resized = img.resize_exact(width, height, FilterType::Triangle);

  let format = chosen_format(detected);
  // JPEG cannot carry an alpha channel
  let resized = match format {
    ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
    _ => resized,
  };

  let mut buf = Cursor::new(Vec::new());
  resized
    .write_to(&mut buf, format)
    .context("failed to encode thumbnail")?;

  Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::RgbaImage;

  fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
      width,
      height,
      image::Rgba([120, 40, 200, 255]),
    ));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
  }

  #[test]
  fn chosen_format_defaults_to_jpeg() {
    assert_eq!(chosen_format(None), ImageFormat::Jpeg);
    assert_eq!(chosen_format(Some(ImageFormat::Png)), ImageFormat::Png);
    assert_eq!(chosen_format(Some(ImageFormat::WebP)), ImageFormat::WebP);
  }

  #[test]
  fn render_forces_exact_dimensions() {
    let out = render(&png_bytes(800, 600), 200, 200).unwrap();
    let thumb = image::load_from_memory(&out).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (200, 200));

    // extreme aspect ratios distort rather than crop or letterbox
    let out = render(&png_bytes(1000, 10), 200, 200).unwrap();
    let thumb = image::load_from_memory(&out).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (200, 200));
  }

  #[test]
  fn render_keeps_the_detected_format() {
    let out = render(&png_bytes(64, 64), 200, 200).unwrap();
    assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
  }

  #[test]
  fn render_reencodes_jpeg_sources_as_jpeg() {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
      64,
      64,
      image::Rgba([10, 20, 30, 255]),
    ));
    let mut buf = Cursor::new(Vec::new());
    // JPEG input cannot hold alpha to begin with, so encode as RGB
    DynamicImage::ImageRgb8(img.to_rgb8())
      .write_to(&mut buf, ImageFormat::Jpeg)
      .unwrap();

    let out = render(&buf.into_inner(), 200, 200).unwrap();
    assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
  }

  #[test]
  fn render_rejects_garbage_input() {
    let err = render(b"definitely not an image", 200, 200).unwrap_err();
    assert!(err.to_string().contains("failed to decode image"));
  }
}
