use crate::types::{RadianceImage, So2Error, So2Result};
use gdal::{Dataset, Metadata};
use ndarray::Array2;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One entry of a container's sub-dataset listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subdataset {
    pub name: String,
    pub description: String,
}

/// A read-only multi-subdataset raster container
pub trait SubdatasetSource {
    /// Human readable label used in logs and errors
    fn label(&self) -> String;

    /// The (name, description) listing, in container order
    fn subdatasets(&self) -> So2Result<Vec<Subdataset>>;

    /// Read the first band of a sub-dataset as raw samples
    fn read_subdataset(&self, name: &str) -> So2Result<RadianceImage>;
}

/// HDF-EOS container opened through GDAL
pub struct GdalContainer {
    path: PathBuf,
    dataset: Dataset,
}

impl GdalContainer {
    pub fn open<P: AsRef<Path>>(path: P) -> So2Result<Self> {
        let path = path.as_ref().to_path_buf();
        log::info!("Loading {}", path.display());

        if !path.exists() {
            return Err(So2Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )));
        }

        let dataset = Dataset::open(&path)?;
        Ok(Self { path, dataset })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SubdatasetSource for GdalContainer {
    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn subdatasets(&self) -> So2Result<Vec<Subdataset>> {
        let entries = self.dataset.metadata_domain("SUBDATASETS").unwrap_or_default();
        Ok(parse_subdataset_metadata(&entries))
    }

    fn read_subdataset(&self, name: &str) -> So2Result<RadianceImage> {
        log::debug!("Reading sub-dataset {}", name);
        let dataset = Dataset::open(Path::new(name))?;
        let (width, height) = dataset.raster_size();
        let rasterband = dataset.rasterband(1)?;
        let buffer = rasterband.read_as::<f64>((0, 0), (width, height), (width, height), None)?;

        Array2::from_shape_vec((height, width), buffer.data)
            .map_err(|e| So2Error::Processing(format!("Failed to reshape {}: {}", name, e)))
    }
}

/// Turn GDAL `SUBDATASET_n_NAME=` / `SUBDATASET_n_DESC=` items into ordered pairs.
pub fn parse_subdataset_metadata(entries: &[String]) -> Vec<Subdataset> {
    let mut names: Vec<(usize, String)> = Vec::new();
    let mut descriptions: HashMap<usize, String> = HashMap::new();

    for entry in entries {
        let Some((key, value)) = entry.split_once('=') else {
            continue;
        };
        let Some(rest) = key.strip_prefix("SUBDATASET_") else {
            continue;
        };
        let Some((index, kind)) = rest.split_once('_') else {
            continue;
        };
        let Ok(index) = index.parse::<usize>() else {
            continue;
        };
        match kind {
            "NAME" => names.push((index, value.to_string())),
            "DESC" => {
                descriptions.insert(index, value.to_string());
            }
            _ => {}
        }
    }

    names.sort_by_key(|(index, _)| *index);
    names
        .into_iter()
        .map(|(index, name)| Subdataset {
            description: descriptions.remove(&index).unwrap_or_default(),
            name,
        })
        .collect()
}

/// In-memory container, for callers that already hold decoded sub-datasets
#[derive(Debug, Default, Clone)]
pub struct MemoryContainer {
    label: String,
    entries: Vec<(Subdataset, RadianceImage)>,
}

impl MemoryContainer {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_subdataset(mut self, name: impl Into<String>, data: RadianceImage) -> Self {
        let name = name.into();
        self.entries.push((
            Subdataset {
                description: format!("[{}x{}] {}", data.nrows(), data.ncols(), name),
                name,
            },
            data,
        ));
        self
    }
}

impl SubdatasetSource for MemoryContainer {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn subdatasets(&self) -> So2Result<Vec<Subdataset>> {
        Ok(self.entries.iter().map(|(sub, _)| sub.clone()).collect())
    }

    fn read_subdataset(&self, name: &str) -> So2Result<RadianceImage> {
        self.entries
            .iter()
            .find(|(sub, _)| sub.name == name)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| So2Error::Processing(format!("No sub-dataset named {}", name)))
    }
}

/// Locate the HDF container inside an input product directory.
///
/// Matching is on the `hdf` extension, case-insensitive. When several files
/// match, the last one in directory order is used.
pub fn find_container_file<P: AsRef<Path>>(input_dir: P) -> So2Result<PathBuf> {
    let input_dir = input_dir.as_ref();
    let entries = std::fs::read_dir(input_dir).map_err(|e| {
        So2Error::InputDiscovery(format!(
            "unable to read input dir {}: {}",
            input_dir.display(),
            e
        ))
    })?;

    let mut found: Option<PathBuf> = None;
    for entry in entries {
        let path = entry?.path();
        let is_hdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("hdf"))
            .unwrap_or(false);
        if is_hdf && path.is_file() {
            if let Some(previous) = &found {
                log::warn!("Multiple hdf files in input dir, ignoring {}", previous.display());
            }
            found = Some(path);
        }
    }

    found.ok_or_else(|| {
        So2Error::InputDiscovery(format!(
            "unable to find input hdf file in dir: {}",
            input_dir.display()
        ))
    })
}
