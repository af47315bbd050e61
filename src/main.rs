use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use geo::{Geometry, Polygon};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;

use geofetch::api::{fetch_features, fetch_overpass, wiki_url};
use geofetch::config::{FileConfig, load_params};
use geofetch::domain::{BoundingBox, FeatureTable, Tag};
use geofetch::geometry::bbox_from_polygon;
use geofetch::licenses::write_report;
use geofetch::osm::build_query;

/// Fetch OpenStreetMap, GeoJSON and Wikidata data
///
/// Examples:
///   # Drinking water points and footways around Grenoble
///   geofetch overpass --bbox 45.15,5.7,45.2,5.75 --tag amenity=drinking_water --tag highway=footway
///
///   # Same, bounding box taken from a GeoJSON polygon
///   geofetch overpass --polygon area.geojson --tag leisure=park -o parks.geojson
///
///   # Any GeoJSON API
///   geofetch features https://api.example.org /v1/stations --param limit=100
///
///   # License report for a conda environment
///   geofetch licenses ~/miniconda3/envs/geo/conda-meta/ LICENSES.md pip_libs.yml
#[derive(Parser, Debug)]
#[command(name = "geofetch")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches geofetch.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch OSM nodes and ways matching any of the tags inside a bounding box
    Overpass {
        /// Bounding box as min_lat,min_lon,max_lat,max_lon
        #[arg(long, allow_hyphen_values = true, required_unless_present = "polygon")]
        bbox: Option<BoundingBox>,

        /// GeoJSON file whose first polygon gives the bounding box
        #[arg(long, conflicts_with = "bbox")]
        polygon: Option<PathBuf>,

        /// OSM tag filter as key=value (repeatable)
        #[arg(short = 't', long = "tag")]
        tags: Vec<Tag>,

        /// Overpass interpreter URL
        #[arg(long)]
        url: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Print the Overpass QL query and exit
        #[arg(long)]
        print_query: bool,

        /// Output GeoJSON file (defaults to stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Fetch a GeoJSON FeatureCollection from {base_url}{sub_url}
    Features {
        base_url: String,
        sub_url: String,

        /// Query parameter as key=value (repeatable)
        #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Output GeoJSON file (defaults to stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Print the Wikipedia URL of a Wikidata item
    Wikidata {
        id: String,

        /// Wiki code of the sitelink (e.g. frwiki, enwiki)
        #[arg(long)]
        wiki: Option<String>,
    },

    /// Write a markdown license report of an environment
    Licenses {
        /// Environment metadata directory (conda-meta)
        env_dir: PathBuf,
        /// Path to .md output file
        output: PathBuf,
        /// Path to YAML pip installed libs
        pip_lib_yaml: PathBuf,
    },

    /// Load a parameter file from a path or URL and print it
    Params { source: String },
}

fn parse_key_val(s: &str) -> Result<(String, String)> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => bail!("expected key=value, got {:?}", s),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logger(args.verbose);

    let file_config = match args.config {
        Some(ref config_path) => {
            if !config_path.exists() {
                bail!("Config file not found: {:?}", config_path);
            }
            FileConfig::from_path(config_path)?
        }
        None => FileConfig::load().unwrap_or_default(),
    };

    match args.command {
        Command::Overpass {
            bbox,
            polygon,
            tags,
            url,
            timeout,
            print_query,
            output,
        } => {
            let bbox = match (bbox, polygon) {
                (Some(bbox), _) => bbox,
                (None, Some(path)) => {
                    let polygon = read_polygon(&path)?;
                    bbox_from_polygon(&polygon)
                        .with_context(|| format!("Polygon in {:?} has no vertices", path))?
                }
                (None, None) => bail!("Must provide either --bbox or --polygon"),
            };

            if print_query {
                println!("{}", build_query(&bbox, &tags));
                return Ok(());
            }

            let mut overpass_config = file_config.overpass;
            if let Some(url) = url {
                overpass_config.url = url;
            }
            if let Some(timeout) = timeout {
                overpass_config.timeout_secs = timeout;
            }
            log::debug!("Bounding box: {}", bbox);

            let spinner = create_spinner("Fetching elements from Overpass...");
            let start = Instant::now();
            let table = fetch_overpass(&bbox, &tags, &overpass_config)
                .context("Failed to fetch data from Overpass API")?;
            spinner.finish_with_message(format!(
                "Fetched {} elements [{:.1}s]",
                table.len(),
                start.elapsed().as_secs_f32()
            ));

            write_table(&table, output.as_deref())
        }
        Command::Features {
            base_url,
            sub_url,
            params,
            output,
        } => {
            let options = file_config.api.request_options();

            let spinner = create_spinner("Fetching features...");
            let start = Instant::now();
            let table = fetch_features(&base_url, &sub_url, &params, &options)
                .context("Failed to fetch features")?;
            spinner.finish_with_message(format!(
                "Fetched {} features [{:.1}s]",
                table.len(),
                start.elapsed().as_secs_f32()
            ));

            write_table(&table, output.as_deref())
        }
        Command::Wikidata { id, wiki } => {
            let mut wikidata_config = file_config.wikidata;
            if let Some(wiki) = wiki {
                wikidata_config.wiki = wiki;
            }

            match wiki_url(Some(id.as_str()), &wikidata_config)? {
                Some(url) => println!("{}", url),
                None => bail!("No Wikidata identifier given"),
            }
            Ok(())
        }
        Command::Licenses {
            env_dir,
            output,
            pip_lib_yaml,
        } => {
            let count = write_report(&env_dir, &output, &pip_lib_yaml)?;
            log::info!("Wrote {} packages to {}", count, output.display());
            Ok(())
        }
        Command::Params { source } => {
            let params = load_params(&source)?;
            println!("{:#?}", params);
            Ok(())
        }
    }
}

fn setup_logger(verbose: bool) {
    use env_logger::{Builder, Env};
    let level = if verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(level)).init();
}

fn read_polygon(path: &Path) -> Result<Polygon<f64>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read polygon file: {:?}", path))?;
    let geojson: geojson::GeoJson = contents
        .parse()
        .with_context(|| format!("Failed to parse GeoJSON: {:?}", path))?;
    let collection = geojson::quick_collection::<f64>(&geojson)
        .with_context(|| format!("Unsupported geometry in {:?}", path))?;

    collection
        .0
        .into_iter()
        .find_map(|geometry| match geometry {
            Geometry::Polygon(polygon) => Some(polygon),
            Geometry::MultiPolygon(multi) => multi.0.into_iter().next(),
            _ => None,
        })
        .with_context(|| format!("No polygon found in {:?}", path))
}

fn write_table(table: &FeatureTable, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(&table.to_geojson())
        .context("Failed to serialize features")?;

    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
            log::info!("Wrote {} features ({}) to {}", table.len(), table.crs(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
