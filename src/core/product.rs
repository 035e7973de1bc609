use crate::config::ProductConfig;
use crate::core::identity::derive_product_id;
use crate::core::metadata::{
    build_metadata_record, save_product_records, DatasetDescriptor, RasterStatistics,
};
use crate::core::ratio::RatioProcessor;
use crate::io::browse::write_browse_images;
use crate::io::catalog::{Catalog, CatalogLookup};
use crate::io::container::{find_container_file, GdalContainer, SubdatasetSource};
use crate::io::context::JobContext;
use crate::io::geotiff::write_float_geotiff;
use crate::types::{ProductId, So2Error, So2Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Inputs of one generation attempt
#[derive(Debug, Clone, Copy)]
pub struct ProductRequest<'a> {
    pub input_dir: &'a Path,
    pub starttime: &'a str,
    pub endtime: &'a str,
    pub location: &'a Value,
    pub metadata: &'a Map<String, Value>,
}

impl<'a> From<&'a JobContext> for ProductRequest<'a> {
    fn from(ctx: &'a JobContext) -> Self {
        Self {
            input_dir: &ctx.prod_id,
            starttime: &ctx.starttime,
            endtime: &ctx.endtime,
            location: &ctx.location,
            metadata: &ctx.prod_metadata,
        }
    }
}

/// Files of a generated product, all inside `product_dir`
#[derive(Debug, Clone)]
pub struct ProductArtifacts {
    pub id: ProductId,
    pub product_dir: PathBuf,
    pub raster: PathBuf,
    pub dataset: PathBuf,
    pub metadata: PathBuf,
    pub browse: PathBuf,
    pub browse_small: PathBuf,
    pub statistics: RasterStatistics,
}

#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    /// The catalog already holds the identity; nothing was touched
    AlreadyExists { id: ProductId, count: u64 },
    Generated(ProductArtifacts),
}

/// Idempotent AST_L1T-SO product generation
pub struct ProductGenerator<'c> {
    config: ProductConfig,
    catalog: &'c dyn Catalog,
    output_root: PathBuf,
}

impl<'c> ProductGenerator<'c> {
    pub fn new(config: ProductConfig, catalog: &'c dyn Catalog, output_root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            catalog,
            output_root: output_root.into(),
        }
    }

    pub fn config(&self) -> &ProductConfig {
        &self.config
    }

    pub fn product_id(&self, starttime: &str, endtime: &str) -> So2Result<ProductId> {
        derive_product_id(&self.config, starttime, endtime)
    }

    /// Product directory, named exactly as the identity
    pub fn product_dir(&self, id: &ProductId) -> PathBuf {
        self.output_root.join(id.as_str())
    }

    pub fn lookup(&self, id: &ProductId) -> CatalogLookup {
        self.catalog.lookup(&self.config.index_name(), id)
    }

    /// Validate the job context and generate from the HDF container in `prod_id`
    pub fn run(&self, ctx: &JobContext) -> So2Result<GenerationOutcome> {
        ctx.validate(&self.config)?;
        self.generate_product(ProductRequest::from(ctx), |path| GdalContainer::open(path))
    }

    /// Generate the product unless the catalog already has it.
    ///
    /// `open_container` is only called once the identity is known to be new.
    pub fn generate_product<S, F>(&self, request: ProductRequest<'_>, open_container: F) -> So2Result<GenerationOutcome>
    where
        S: SubdatasetSource,
        F: FnOnce(&Path) -> So2Result<S>,
    {
        let id = self.product_id(request.starttime, request.endtime)?;
        let container_path = find_container_file(request.input_dir)?;
        log::info!("Input container: {}", container_path.display());

        if let CatalogLookup::Found { count } = self.lookup(&id) {
            log::info!("product with id: {} already exists. Exiting.", id);
            return Ok(GenerationOutcome::AlreadyExists { id, count });
        }

        let product_dir = self.product_dir(&id);
        let raster_path = product_dir.join(id.file_name("tif"));
        log::info!("attempting to generate product: {}", raster_path.display());

        // Nothing is written under product_dir until compositing succeeds
        let container = open_container(&container_path)?;
        let raster = RatioProcessor::new(&self.config)?.process(&container)?;

        if !product_dir.exists() {
            std::fs::create_dir_all(&product_dir)?;
        }
        write_float_geotiff(&raster.values, &raster_path)?;
        verify_raster(&raster_path)?;

        let statistics = RasterStatistics::compute(&raster);
        log::info!(
            "Statistics for {}: max {} / p90 {} over {} valid pixels",
            id,
            statistics.max_val,
            statistics.percentile_90,
            statistics.valid_pixels
        );

        let dataset = DatasetDescriptor::new(
            &id,
            request.starttime,
            request.endtime,
            request.location,
            &self.config.version,
        );
        let met = build_metadata_record(request.metadata, &statistics);
        let records = save_product_records(&product_dir, &id, &dataset, &met)?;

        let browse = product_dir.join(id.file_name("browse.png"));
        let browse_small = product_dir.join(id.file_name("browse_small.png"));
        if browse.exists() {
            log::info!("Browse already present, skipping: {}", browse.display());
        } else {
            write_browse_images(
                &raster.values,
                &browse,
                &browse_small,
                self.config.browse_small_size,
            )?;
        }

        Ok(GenerationOutcome::Generated(ProductArtifacts {
            id,
            product_dir,
            raster: raster_path,
            dataset: records.dataset,
            metadata: records.metadata,
            browse,
            browse_small,
            statistics,
        }))
    }
}

fn verify_raster(path: &Path) -> So2Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(So2Error::OutputVerification(path.to_path_buf()))
    }
}
