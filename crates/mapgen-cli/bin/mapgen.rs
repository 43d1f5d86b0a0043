//! Room layout generator
//!
//! Generates a layout from command-line options and writes it as SVG.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{LevelFilter, info};
use strum::IntoEnumIterator;

use mapgen_cli::{parse_sizes, render_svg};
use mapgen_core::{
    CrossingPolicy, DistanceMetric, LayoutConfig, LayoutRng, RoutingStrategy, UnroutablePolicy,
    generate,
};

/// Procedural room and corridor layouts
#[derive(Parser, Debug)]
#[command(name = "mapgen")]
#[command(author, version, about = "Generate room and corridor layouts as SVG", long_about = None)]
struct Args {
    /// JSON options file; flags given on the command line override it
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Map width
    #[arg(long)]
    width: Option<u32>,

    /// Map height
    #[arg(long)]
    height: Option<u32>,

    /// Number of rooms
    #[arg(short = 'n', long = "rooms")]
    rooms: Option<usize>,

    /// Room size options (e.g., 10x10,20x10)
    #[arg(long)]
    sizes: Option<String>,

    /// Corridor thickness
    #[arg(short = 't', long)]
    thickness: Option<f64>,

    /// Let corridors cross each other
    #[arg(long = "allow-crossing")]
    allow_crossing: bool,

    /// Routing strategy (direct/grid)
    #[arg(long)]
    strategy: Option<String>,

    /// Edge weight metric (euclidean/manhattan)
    #[arg(long)]
    metric: Option<String>,

    /// Extra loop edges as a fraction of the spanning tree
    #[arg(long = "extra-edges")]
    extra_edges: Option<f64>,

    /// Fraction of rooms placed against another room
    #[arg(long)]
    touching: Option<f64>,

    /// Commit the best corridor found instead of restarting
    #[arg(long)]
    force: bool,

    /// Seed (random when omitted)
    #[arg(short = 's', long)]
    seed: Option<u64>,

    /// SVG output file
    #[arg(short = 'o', long, default_value = "layout.svg")]
    output: PathBuf,

    /// Pixels per map unit
    #[arg(long, default_value_t = 8.0)]
    scale: f64,

    /// Print the layout as JSON to stdout
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::from_default_env().filter_level(level).init();

    let config = build_config(&args)?;
    let seed = args.seed.unwrap_or_else(|| LayoutRng::from_entropy().seed());

    let layout = generate(&config, seed)
        .with_context(|| format!("generating layout with seed {}", seed))?;
    info!(
        "seed {}: {} rooms, {} connectors ({} forced)",
        seed,
        layout.rooms().len(),
        layout.connectors().len(),
        layout.forced_connectors().count()
    );

    let svg = render_svg(&layout, args.scale);
    std::fs::write(&args.output, svg)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!("wrote {}", args.output.display());

    if args.json {
        println!("{}", layout.to_json_string()?);
    }
    Ok(())
}

/// Options file (or defaults) overlaid with the command-line flags
fn build_config(args: &Args) -> Result<LayoutConfig> {
    let mut config = match &args.config {
        Some(path) => LayoutConfig::load_from_file(path)
            .with_context(|| format!("loading options from {}", path.display()))?,
        None => LayoutConfig::default(),
    };

    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(rooms) = args.rooms {
        config.room_count = rooms;
    }
    if let Some(sizes) = &args.sizes {
        config.room_sizes = parse_sizes(sizes)?;
    }
    if let Some(thickness) = args.thickness {
        config.corridor_thickness = thickness;
    }
    if args.allow_crossing {
        config.crossing = CrossingPolicy::Allow;
    }
    if let Some(strategy) = &args.strategy {
        config.strategy = parse_option::<RoutingStrategy>("strategy", strategy)?;
    }
    if let Some(metric) = &args.metric {
        config.metric = parse_option::<DistanceMetric>("metric", metric)?;
    }
    if let Some(extra) = args.extra_edges {
        config.extra_edge_fraction = extra;
    }
    if let Some(touching) = args.touching {
        config.touching_fraction = touching;
    }
    if args.force {
        config.unroutable = UnroutablePolicy::ForceBestEffort;
    }

    config.validate()?;
    Ok(config)
}

/// Parse a snake_case option name, listing the valid names on failure
fn parse_option<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr + IntoEnumIterator + AsRef<str>,
{
    T::from_str(&value.to_lowercase()).map_err(|_| {
        let valid: Vec<String> = T::iter().map(|v| v.as_ref().to_string()).collect();
        anyhow!("unknown {} `{}` (expected one of: {})", name, value, valid.join(", "))
    })
}
