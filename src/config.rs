//! Product naming and catalog configuration

use crate::types::BandCode;
use serde::{Deserialize, Serialize};

/// Static configuration for the AST_L1T-SO product family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    /// Short name used as the identity prefix
    pub short_name: String,
    /// Product version, also part of the identity and index name
    pub version: String,
    /// The only input product type accepted
    pub input_type: String,
    /// Prefix of the per-product-type catalog index
    pub index_prefix: String,
    /// Bands fed to the compositor as (low, mid, high)
    pub required_bands: [BandCode; 3],
    /// Bounding box edge of the small browse image, in pixels
    pub browse_small_size: u32,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            short_name: "AST_L1T-SO".to_string(),
            version: "v1.0".to_string(),
            input_type: "AST_L1T".to_string(),
            index_prefix: "grq".to_string(),
            required_bands: [BandCode::B10, BandCode::B11, BandCode::B12],
            browse_small_size: 300,
        }
    }
}

impl ProductConfig {
    /// Catalog index holding products of this type, e.g. `grq_v1.0_AST_L1T-SO`
    pub fn index_name(&self) -> String {
        format!("{}_{}_{}", self.index_prefix, self.version, self.short_name)
    }
}
