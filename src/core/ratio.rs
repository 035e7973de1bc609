use crate::config::ProductConfig;
use crate::core::band_select::BandSelector;
use crate::core::normalize::normalize;
use crate::io::container::SubdatasetSource;
use crate::types::{DerivedRaster, MaskedBand, So2Error, So2Result};
use ndarray::{Array2, Zip};

/// Combine three masked bands into the SO2 proxy `(low + high) - 2 * mid`.
///
/// A pixel invalid in any input is 0 in the output; every other pixel is
/// clipped to `[0, inf)`.
pub fn composite(low: &MaskedBand, mid: &MaskedBand, high: &MaskedBand) -> So2Result<DerivedRaster> {
    let dim = low.dim();
    for band in [mid, high] {
        if band.dim() != dim {
            return Err(So2Error::Processing(format!(
                "Band {} has shape {:?}, expected {:?} (band {})",
                band.code,
                band.dim(),
                dim,
                low.code
            )));
        }
    }

    let mut invalid = Array2::<bool>::from_elem(dim, false);
    Zip::from(&mut invalid)
        .and(&low.invalid)
        .and(&mid.invalid)
        .and(&high.invalid)
        .for_each(|out, &a, &b, &c| *out = a || b || c);

    let mut values = Array2::<f64>::zeros(dim);
    Zip::from(&mut values)
        .and(&invalid)
        .and(&low.data)
        .and(&mid.data)
        .and(&high.data)
        .for_each(|out, &masked, &l, &m, &h| {
            if !masked {
                *out = ((l + h) - 2.0 * m).max(0.0);
            }
        });

    Ok(DerivedRaster { values, invalid })
}

/// Minimum and maximum of the composited raster
pub fn value_range(raster: &DerivedRaster) -> (f64, f64) {
    raster
        .values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Band selection, scaling and compositing for one container
pub struct RatioProcessor {
    selector: BandSelector,
}

impl RatioProcessor {
    pub fn new(config: &ProductConfig) -> So2Result<Self> {
        Ok(Self {
            selector: BandSelector::new(&config.required_bands)?,
        })
    }

    pub fn process(&self, source: &dyn SubdatasetSource) -> So2Result<DerivedRaster> {
        log::info!("Generating SO2 ratio from {}", source.label());

        let raw = self.selector.select(source)?;
        let bands: Vec<MaskedBand> = raw.iter().map(|b| normalize(b.code, &b.data)).collect();

        let [low, mid, high] = bands.as_slice() else {
            return Err(So2Error::Processing(format!(
                "Expected 3 bands for compositing, got {}",
                bands.len()
            )));
        };

        let raster = composite(low, mid, high)?;
        let (min, max) = value_range(&raster);
        log::info!("minimum: {}, maximum: {}", min, max);

        Ok(raster)
    }
}
