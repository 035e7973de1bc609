//! Generates the SO2 band ratio from an ASTER L1T HDF file and saves it as GeoTIFF.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use aster_so2::io::write_float_geotiff;
use aster_so2::{GdalContainer, ProductConfig, RatioProcessor};

#[derive(Parser, Debug)]
#[command(name = "so2-ratio")]
#[command(about = "Generates product from input file")]
struct Args {
    /// path of input hdf file
    #[arg(short = 'f', long = "hdf")]
    hdf: PathBuf,

    /// path to output file
    #[arg(short = 'o', long = "out")]
    out: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let container = GdalContainer::open(&args.hdf)
        .with_context(|| format!("failed to open {}", args.hdf.display()))?;
    let raster = RatioProcessor::new(&ProductConfig::default())?.process(&container)?;
    write_float_geotiff(&raster.values, &args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;

    Ok(())
}
