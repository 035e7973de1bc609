use crate::types::{So2Error, So2Result};
use gdal::raster::Buffer;
use gdal::DriverManager;
use ndarray::Array2;
use std::path::Path;

/// Write a single-band Float64 GeoTIFF, replacing any existing file.
pub fn write_float_geotiff<P: AsRef<Path>>(image: &Array2<f64>, output_path: P) -> So2Result<()> {
    let output_path = output_path.as_ref();
    log::info!("Writing GeoTIFF: {}", output_path.display());

    if output_path.exists() {
        std::fs::remove_file(output_path)?;
    }

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let (height, width) = image.dim();
    if width == 0 || height == 0 {
        return Err(So2Error::Processing(format!(
            "Refusing to write empty raster ({} x {})",
            height, width
        )));
    }

    let dataset = driver.create_with_band_type::<f64, _>(
        output_path,
        width as isize,
        height as isize,
        1,
    )?;

    let mut rasterband = dataset.rasterband(1)?;
    let flat_data: Vec<f64> = image.iter().copied().collect();
    let buffer = Buffer::new((width, height), flat_data);
    rasterband.write((0, 0), (width, height), &buffer)?;

    // GDALClose on drop flushes the band to disk
    drop(rasterband);
    drop(dataset);

    log::debug!("GeoTIFF written: {} x {}", height, width);
    Ok(())
}

/// Read back the first band of a GeoTIFF as Float64
pub fn read_float_geotiff<P: AsRef<Path>>(path: P) -> So2Result<Array2<f64>> {
    let dataset = gdal::Dataset::open(path.as_ref())?;
    let (width, height) = dataset.raster_size();
    let rasterband = dataset.rasterband(1)?;
    let buffer = rasterband.read_as::<f64>((0, 0), (width, height), (width, height), None)?;

    Array2::from_shape_vec((height, width), buffer.data)
        .map_err(|e| So2Error::Processing(format!("Failed to reshape GeoTIFF data: {}", e)))
}
