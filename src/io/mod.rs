//! I/O modules for containers, rasters, the catalog, job context and browse images

pub mod container;
pub mod geotiff;
pub mod catalog;
pub mod context;
pub mod browse;

pub use container::{find_container_file, GdalContainer, MemoryContainer, Subdataset, SubdatasetSource};
pub use geotiff::write_float_geotiff;
pub use catalog::{Catalog, CatalogLookup, HttpCatalog};
pub use context::JobContext;
