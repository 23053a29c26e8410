use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use roadstar::{osm, Point, RouteGraph};

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct ModelLoadError(PathBuf, #[source] osm::Error);

#[derive(Debug, thiserror::Error)]
#[error("no route between the given positions")]
struct NoRouteError;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Unknown,
    Xml,
    XmlGz,
    XmlBz2,
}

impl From<Format> for osm::FileFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Unknown => osm::FileFormat::Unknown,
            Format::Xml => osm::FileFormat::Xml,
            Format::XmlGz => osm::FileFormat::XmlGz,
            Format::XmlBz2 => osm::FileFormat::XmlBz2,
        }
    }
}

#[derive(Parser)]
struct Cli {
    /// The path to the OSM file
    osm_file: PathBuf,

    /// Horizontal start position, in percent of the map extent (0 - 100)
    #[arg(value_parser = parse_percent)]
    start_x: f64,

    /// Vertical start position, in percent of the map extent (0 - 100)
    #[arg(value_parser = parse_percent)]
    start_y: f64,

    /// Horizontal end position, in percent of the map extent (0 - 100)
    #[arg(value_parser = parse_percent)]
    end_x: f64,

    /// Vertical end position, in percent of the map extent (0 - 100)
    #[arg(value_parser = parse_percent)]
    end_y: f64,

    /// Format of the OSM file
    #[arg(long, value_enum, default_value_t = Format::Unknown)]
    format: Format,

    /// Locate the start and end points with a k-d tree
    #[arg(long)]
    kd_tree: bool,

    /// Increase logging verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn parse_percent(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("{s:?} is not a number"))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not between 0 and 100"))
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => log::LevelFilter::Error,
        (false, 0) => log::LevelFilter::Info,
        (false, 1) => log::LevelFilter::Debug,
        (false, _) => log::LevelFilter::Trace,
    };
    colog::default_builder().filter_level(level).init();

    let g = RouteGraph::new(load_model(&cli.osm_file, cli.format.into())?);
    let start = Point::new(cli.start_x * 0.01, cli.start_y * 0.01);
    let end = Point::new(cli.end_x * 0.01, cli.end_y * 0.01);

    let route = if cli.kd_tree {
        let tree = g.kd_tree().ok_or(roadstar::AStarError::NoRoutablePoints)?;
        let start_idx = tree.find_nearest_point(start.x, start.y);
        let end_idx = tree.find_nearest_point(end.x, end.y);
        roadstar::AStar::new(&g).run(start_idx, end_idx)?
    } else {
        roadstar::find_route(&g, start, end)?
    };
    let route = route.ok_or(NoRouteError)?;

    log::info!("Distance: {:.1} meters", route.distance);

    println!("{{");
    println!("  \"type\": \"FeatureCollection\",");
    println!("  \"features\": [");
    println!("    {{");
    println!("      \"type\": \"Feature\",");
    println!("      \"properties\": {{\"distance\": {}}},", route.distance);

    println!("      \"geometry\": {{");
    println!("        \"type\": \"LineString\",");
    println!("        \"coordinates\": [");

    let projection = g.model().projection();
    let mut points = route.points.iter().peekable();
    while let Some(&pt) = points.next() {
        let suffix = if points.peek().is_some() { "," } else { "" };
        match projection {
            Some(p) => {
                let (lat, lon) = p.inverse(pt);
                println!("          [{}, {}]{}", lon, lat, suffix);
            }
            None => println!("          [{}, {}]{}", pt.x, pt.y, suffix),
        }
    }

    println!("        ]");
    println!("      }}");
    println!("    }}");
    println!("  ]");
    println!("}}");

    Ok(())
}

fn load_model<P: AsRef<Path>>(
    path: P,
    file_format: osm::FileFormat,
) -> Result<roadstar::Model, ModelLoadError> {
    let options = osm::Options {
        file_format,
        bbox: [0.0; 4],
    };
    log::info!("Reading OpenStreetMap data from {}", path.as_ref().display());
    osm::load_from_file(&options, path.as_ref())
        .map_err(|e| ModelLoadError(PathBuf::from(path.as_ref()), e))
}
