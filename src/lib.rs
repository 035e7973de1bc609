//! aster-so2: SO2 proxy products from ASTER L1T thermal-infrared imagery
//!
//! Selects TIR bands 10-12 from an HDF-EOS container, scales and masks them,
//! composites `(B10 + B12) - 2 * B11`, and publishes the result as a
//! deduplicated product keyed on its acquisition time window.

pub mod types;
pub mod config;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    BandCode, DerivedRaster, MaskedBand, ProductId, So2Error, So2Result,
};
pub use config::ProductConfig;

pub use io::{Catalog, CatalogLookup, GdalContainer, HttpCatalog, JobContext, SubdatasetSource};
pub use crate::core::{GenerationOutcome, ProductGenerator, RatioProcessor};
