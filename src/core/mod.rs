//! Core SO2 product generation modules

pub mod band_select;
pub mod normalize;
pub mod ratio;
pub mod identity;
pub mod metadata;
pub mod product;

// Re-export main types
pub use band_select::{BandSelector, RawBand, BAND_PATTERN};
pub use normalize::{normalize, scale_factor};
pub use ratio::{composite, RatioProcessor};
pub use identity::{derive_product_id, parse_timestamp};
pub use metadata::{DatasetDescriptor, RasterStatistics};
pub use product::{GenerationOutcome, ProductArtifacts, ProductGenerator, ProductRequest};
