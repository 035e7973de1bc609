use crate::types::{BandCode, MaskedBand};
use ndarray::{Array2, Zip};
use num_traits::ToPrimitive;

/// Radiance scale factor per TIR band (W/m2/sr/um per DN).
///
/// The per-band L1T unit conversion coefficients (0.006882, 0.006780,
/// 0.006590, 0.005693, 0.005225) are not applied to the proxy.
pub const fn scale_factor(code: BandCode) -> f64 {
    match code {
        BandCode::B10 => 0.001,
        BandCode::B11 => 0.001,
        BandCode::B12 => 0.001,
        BandCode::B13 => 0.001,
        BandCode::B14 => 0.001,
    }
}

/// Mask non-positive samples and scale the rest.
///
/// Masked elements are stored as 0.0 so the data array stays fully defined.
pub fn normalize<T>(code: BandCode, raw: &Array2<T>) -> MaskedBand
where
    T: ToPrimitive + Copy,
{
    let scale = scale_factor(code);
    let mut data = Array2::<f64>::zeros(raw.dim());
    let mut invalid = Array2::<bool>::from_elem(raw.dim(), true);

    Zip::from(&mut data)
        .and(&mut invalid)
        .and(raw)
        .for_each(|out, masked, &sample| {
            match sample.to_f64() {
                Some(value) if value > 0.0 => {
                    *out = value * scale;
                    *masked = false;
                }
                // NaN, non-positive and unrepresentable samples stay masked
                _ => {}
            }
        });

    log::debug!(
        "Band {} normalized: {} of {} samples valid",
        code,
        invalid.iter().filter(|&&m| !m).count(),
        invalid.len()
    );

    MaskedBand {
        code,
        data,
        invalid,
    }
}
