use crate::io::container::{Subdataset, SubdatasetSource};
use crate::types::{BandCode, RadianceImage, So2Error, So2Result};
use regex::Regex;

/// Sub-dataset names of the ASTER L1T TIR swath, ending in the band number
pub const BAND_PATTERN: &str =
    r"HDF4_EOS:EOS_SWATH:.*(?:ImageData|SurfaceRadianceTIR:Band|TIR_Swath:ImageData)([0-9]{1,2})$";

/// A band read straight from its sub-dataset, before scaling
#[derive(Debug, Clone)]
pub struct RawBand {
    pub code: BandCode,
    pub subdataset: String,
    pub data: RadianceImage,
}

/// Picks the required TIR bands out of a container listing
pub struct BandSelector {
    pattern: Regex,
    required: Vec<BandCode>,
}

impl BandSelector {
    pub fn new(required: &[BandCode]) -> So2Result<Self> {
        let pattern = Regex::new(BAND_PATTERN)
            .map_err(|e| So2Error::Processing(format!("Invalid band pattern: {}", e)))?;
        Ok(Self {
            pattern,
            required: required.to_vec(),
        })
    }

    pub fn required(&self) -> &[BandCode] {
        &self.required
    }

    /// Band code captured from a sub-dataset name, if it is a known TIR band
    pub fn match_name(&self, name: &str) -> Option<BandCode> {
        let captures = self.pattern.captures(name)?;
        BandCode::from_digits(captures.get(1)?.as_str())
    }

    /// Lazily yield `(name, code)` for every listing entry that matches the pattern
    pub fn band_matches<'a>(
        &'a self,
        listing: &'a [Subdataset],
    ) -> impl Iterator<Item = (&'a str, BandCode)> + 'a {
        listing.iter().filter_map(move |sub| {
            self.match_name(&sub.name).map(|code| (sub.name.as_str(), code))
        })
    }

    /// Map every required band to its sub-dataset name, in required order.
    ///
    /// Fails with `MissingBands` naming all absent codes; nothing is read.
    pub fn resolve(&self, label: &str, listing: &[Subdataset]) -> So2Result<Vec<(BandCode, String)>> {
        let mut resolved: Vec<(BandCode, String)> = Vec::with_capacity(self.required.len());

        for (name, code) in self.band_matches(listing) {
            if !self.required.contains(&code) {
                continue;
            }
            if let Some((_, first)) = resolved.iter().find(|(c, _)| *c == code) {
                log::warn!("Band {} already taken from {}, ignoring {}", code, first, name);
                continue;
            }
            resolved.push((code, name.to_string()));
        }

        let missing: Vec<BandCode> = self
            .required
            .iter()
            .copied()
            .filter(|code| !resolved.iter().any(|(c, _)| c == code))
            .collect();
        if !missing.is_empty() {
            return Err(So2Error::MissingBands {
                container: label.to_string(),
                missing,
            });
        }

        resolved.sort_by_key(|(code, _)| self.required.iter().position(|r| r == code));
        Ok(resolved)
    }

    /// Resolve the full required set, then read each band
    pub fn select(&self, source: &dyn SubdatasetSource) -> So2Result<Vec<RawBand>> {
        let listing = source.subdatasets()?;
        let resolved = self.resolve(&source.label(), &listing)?;

        resolved
            .into_iter()
            .map(|(code, subdataset)| {
                log::debug!("loading band {} from {}", code, subdataset);
                let data = source.read_subdataset(&subdataset)?;
                Ok(RawBand {
                    code,
                    subdataset,
                    data,
                })
            })
            .collect()
    }
}
