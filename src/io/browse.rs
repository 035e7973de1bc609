use crate::types::{So2Error, So2Result};
use image::imageops::FilterType;
use image::{DynamicImage, GrayAlphaImage, LumaA};
use ndarray::Array2;
use std::path::Path;

/// Render a raster as 8-bit grey with black made transparent.
///
/// Values are stretched linearly from 0..max onto 0..255; anything that
/// lands on 0 gets alpha 0.
pub fn render_browse(values: &Array2<f64>) -> GrayAlphaImage {
    let (height, width) = values.dim();
    let max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    GrayAlphaImage::from_fn(width as u32, height as u32, |x, y| {
        let v = values[[y as usize, x as usize]];
        let grey = if max > 0.0 && v.is_finite() {
            ((v / max) * 255.0).round().clamp(0.0, 255.0) as u8
        } else {
            0
        };
        let alpha = if grey == 0 { 0 } else { 255 };
        LumaA([grey, alpha])
    })
}

/// Write the full-size browse and a small browse fitted inside `small_size` x `small_size`.
pub fn write_browse_images<P: AsRef<Path>, Q: AsRef<Path>>(
    values: &Array2<f64>,
    browse_path: P,
    browse_small_path: Q,
    small_size: u32,
) -> So2Result<()> {
    let browse_path = browse_path.as_ref();
    let browse_small_path = browse_small_path.as_ref();

    let browse = render_browse(values);
    browse
        .save(browse_path)
        .map_err(|e| So2Error::Browse(format!("{}: {}", browse_path.display(), e)))?;
    log::info!("Browse written: {}", browse_path.display());

    let small = DynamicImage::ImageLumaA8(browse).resize(small_size, small_size, FilterType::Triangle);
    small
        .save(browse_small_path)
        .map_err(|e| So2Error::Browse(format!("{}: {}", browse_small_path.display(), e)))?;
    log::info!("Small browse written: {}", browse_small_path.display());

    Ok(())
}
