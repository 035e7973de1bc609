//! Generates an AST_L1T-SO product from the job context in the work directory.
//!
//! Exits 0 when the product was generated or already exists in the catalog,
//! non-zero on any fatal error.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use aster_so2::{GenerationOutcome, HttpCatalog, JobContext, ProductConfig, ProductGenerator};

#[derive(Parser, Debug)]
#[command(name = "so2-generate")]
#[command(about = "Generate the AST_L1T-SO SO2 proxy product if it is not in the catalog")]
struct Args {
    /// Job context file
    #[arg(long, default_value = "_context.json")]
    context: PathBuf,

    /// Catalog (GRQ Elasticsearch) base URL
    #[arg(long, env = "GRQ_ES_URL")]
    catalog_url: String,

    /// Directory in which the product directory is created
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let ctx = JobContext::load(&args.context)
        .with_context(|| format!("unable to parse {} from work directory", args.context.display()))?;

    let catalog = HttpCatalog::new(&args.catalog_url)?;
    let generator = ProductGenerator::new(ProductConfig::default(), &catalog, &args.output_dir);

    match generator.run(&ctx)? {
        GenerationOutcome::AlreadyExists { id, count } => {
            log::info!("{} already in catalog ({} hit(s)), nothing to do", id, count);
        }
        GenerationOutcome::Generated(artifacts) => {
            log::info!(
                "Generated {} in {} (max {}, p90 {})",
                artifacts.id,
                artifacts.product_dir.display(),
                artifacts.statistics.max_val,
                artifacts.statistics.percentile_90
            );
        }
    }

    Ok(())
}
