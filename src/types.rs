use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Physical radiance samples (row x column)
pub type RadianceImage = Array2<f64>;

/// Element-wise invalidity flags, `true` where a sample carries no defined value
pub type InvalidMask = Array2<bool>;

/// ASTER thermal-infrared band codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BandCode {
    B10,
    B11,
    B12,
    B13,
    B14,
}

impl BandCode {
    pub const ALL: [BandCode; 5] = [
        BandCode::B10,
        BandCode::B11,
        BandCode::B12,
        BandCode::B13,
        BandCode::B14,
    ];

    /// Numeric band number as it appears in sub-dataset names
    pub fn number(self) -> u8 {
        match self {
            BandCode::B10 => 10,
            BandCode::B11 => 11,
            BandCode::B12 => 12,
            BandCode::B13 => 13,
            BandCode::B14 => 14,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|code| code.number() == number)
    }

    /// Parse the one-or-two digit suffix captured from a sub-dataset name.
    pub fn from_digits(digits: &str) -> Option<Self> {
        digits.parse::<u8>().ok().and_then(Self::from_number)
    }
}

impl std::fmt::Display for BandCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// A scaled band with its validity mask
#[derive(Debug, Clone)]
pub struct MaskedBand {
    pub code: BandCode,
    pub data: RadianceImage,
    pub invalid: InvalidMask,
}

impl MaskedBand {
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn valid_count(&self) -> usize {
        self.invalid.iter().filter(|&&masked| !masked).count()
    }
}

/// Composited SO2 proxy raster.
///
/// `values` is fully defined (invalid pixels are zero); `invalid` records which
/// pixels were forced to zero so that statistics can skip them.
#[derive(Debug, Clone)]
pub struct DerivedRaster {
    pub values: Array2<f64>,
    pub invalid: InvalidMask,
}

impl DerivedRaster {
    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Values of all valid pixels, in row-major order
    pub fn valid_values(&self) -> Vec<f64> {
        self.values
            .iter()
            .zip(self.invalid.iter())
            .filter(|(_, &masked)| !masked)
            .map(|(&v, _)| v)
            .collect()
    }
}

/// Canonical product identifier, e.g. `AST_L1T-SO-20190514T034140_20190514T034149-v1.0`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name inside the product directory, e.g. `{id}.met.json`
    pub fn file_name(&self, suffix: &str) -> String {
        format!("{}.{}", self.0, suffix)
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error types for SO2 product generation
#[derive(Debug, thiserror::Error)]
pub enum So2Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("input needs to be {expected}. Input is of type: {actual}")]
    InputTypeMismatch { expected: String, actual: String },

    #[error("missing band(s) {} in container {}", format_bands(.missing), .container)]
    MissingBands {
        container: String,
        missing: Vec<BandCode>,
    },

    #[error("Input discovery error: {0}")]
    InputDiscovery(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Catalog query error: {0}")]
    Catalog(String),

    #[error("Output verification failed: {} was not written", .0.display())]
    OutputVerification(PathBuf),

    #[error("Metadata write error: {0}")]
    MetadataWrite(String),

    #[error("Browse generation error: {0}")]
    Browse(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

fn format_bands(bands: &[BandCode]) -> String {
    bands
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for SO2 operations
pub type So2Result<T> = Result<T, So2Error>;
