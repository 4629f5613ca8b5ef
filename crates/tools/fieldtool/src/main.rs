mod region_file;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use field::{generate_field_with, ConceptualSpace, FieldConfig};
use region::glam::DVec3;
use region::RegionSet;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fieldtool")]
#[command(about = "Generate color-space voxel fields from region meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an RGBA voxel field and write it as raw bytes
    Generate {
        /// Region JSON files (can specify multiple)
        #[arg(short, long = "region")]
        regions: Vec<PathBuf>,

        /// Samples per axis; overrides the config file
        #[arg(short = 'n', long)]
        resolution: Option<usize>,

        /// TOML field configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output path for the packed RGBA buffer
        #[arg(short, long)]
        output: PathBuf,

        /// Also write the texture descriptor as JSON
        #[arg(long)]
        descriptor: Option<PathBuf>,

        /// Generate on a single thread
        #[arg(long)]
        serial: bool,
    },

    /// Print the bounding box of each region
    Bounds {
        /// Region JSON files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Classify a point of the unit cube against the given regions
    Probe {
        /// Region JSON files (can specify multiple)
        #[arg(short, long = "region")]
        regions: Vec<PathBuf>,

        /// Point in the unit cube
        #[arg(
            short,
            long,
            num_args = 3,
            value_names = ["X", "Y", "Z"],
            allow_negative_numbers = true
        )]
        point: Vec<f64>,

        /// Conceptual-space definition (JSON) used to report axis values
        #[arg(short, long)]
        space: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            regions,
            resolution,
            config,
            output,
            descriptor,
            serial,
        } => {
            let config = load_config(config.as_deref(), resolution, serial)?;
            generate(&regions, &config, &output, descriptor.as_deref())?;
        }
        Commands::Bounds { files } => {
            bounds(&files)?;
        }
        Commands::Probe { regions, point, space } => {
            probe(&regions, &point, space.as_deref())?;
        }
    }

    Ok(())
}

/// Resolve the field configuration: flags override the file, the file overrides defaults
fn load_config(
    path: Option<&Path>,
    resolution: Option<usize>,
    serial: bool,
) -> Result<FieldConfig> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            FieldConfig::from_toml_str(&content)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => FieldConfig::default(),
    };

    if let Some(resolution) = resolution {
        config = config.with_resolution(resolution);
    }
    if serial {
        config = config.with_parallel(false);
    }
    config.validate()?;
    Ok(config)
}

fn load_regions(paths: &[PathBuf]) -> Result<RegionSet> {
    let set = RegionSet::build(region_file::load_all(paths)?);
    for (id, err) in set.rejected() {
        tracing::warn!("Skipping region '{}': {}", id, err);
    }
    Ok(set)
}

fn generate(
    paths: &[PathBuf],
    config: &FieldConfig,
    output: &Path,
    descriptor: Option<&Path>,
) -> Result<()> {
    let set = load_regions(paths)?;
    tracing::info!(
        "Generating {}^3 field over {} region(s)",
        config.resolution,
        set.len()
    );

    let grid = generate_field_with(set.regions(), config)?;

    if let Some(path) = descriptor {
        let json = serde_json::to_string_pretty(&grid.descriptor())?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let opaque = grid.count_alpha(config.opaque_alpha);
    let bytes = grid.into_bytes();
    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(
        "Wrote {} bytes to {} ({} opaque voxels)",
        bytes.len(),
        output.display(),
        opaque
    );
    Ok(())
}

#[derive(Serialize)]
struct RegionBounds<'a> {
    id: &'a str,
    min: [f64; 3],
    max: [f64; 3],
    center: [f64; 3],
    size: [f64; 3],
    triangles: usize,
}

fn bounds(paths: &[PathBuf]) -> Result<()> {
    let set = load_regions(paths)?;

    for loaded in set.regions() {
        let bbox = loaded.bbox();
        let entry = RegionBounds {
            id: loaded.id.as_str(),
            min: bbox.min.to_array(),
            max: bbox.max.to_array(),
            center: bbox.center().to_array(),
            size: bbox.size().to_array(),
            triangles: loaded.region.mesh().len(),
        };
        println!("{}", serde_json::to_string(&entry)?);
    }
    Ok(())
}

fn probe(paths: &[PathBuf], point: &[f64], space: Option<&Path>) -> Result<()> {
    let [x, y, z] = point else {
        bail!("Expected 3 coordinates, got {}", point.len());
    };
    let p = DVec3::new(*x, *y, *z);
    let set = load_regions(paths)?;

    for loaded in set.regions() {
        let result = loaded.region.classify(p);
        println!(
            "{}: {} (crossings {}, rays {}, excluded {})",
            loaded.id,
            if result.inside { "inside" } else { "outside" },
            result.crossings,
            result.attempts,
            result.excluded
        );
    }
    println!("any: {}", set.contains(p));

    if let Some(path) = space {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read space {}", path.display()))?;
        let space = ConceptualSpace::from_json_str(&content)?;
        let values = space.value_at(p)?;
        for (dimension, value) in space.dimensions.iter().zip(values) {
            println!("{} = {}", dimension.name, value);
        }
    }
    Ok(())
}
