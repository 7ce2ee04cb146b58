use anyhow::{anyhow, Context};
use config::{Config, File};
use isoterra::{
    timed, CameraAngle, GridPoint, Point2, ProjectionConfig, Stage,
    TerrainGrid,
};
use log::{info, LevelFilter};
use serde::Serialize;
use simple_logger::SimpleLogger;
use std::{
    fs,
    path::{Path, PathBuf},
    process,
};
use structopt::StructOpt;
use strum::{Display, EnumString};

/// CLI for inspecting isometric terrain maps: draw order, picking and
/// previews.
#[derive(Debug, StructOpt)]
#[structopt(name = "isoterra")]
struct Opt {
    /// Path to a JSON terrain grid to load. The format is
    /// `{"width": .., "height": .., "tiles": [..]}`, with tiles in row-major
    /// order
    #[structopt(short, long)]
    map: PathBuf,

    /// Path to a config file that defines the projection constants (tile
    /// size and elevation unit). Supported formats: JSON, TOML. Any missing
    /// field uses its default
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// The camera angle to view the map from, named after the corner that's
    /// furthest from the viewer. Options: ul, ur, ll, lr
    #[structopt(short, long, default_value = "ul")]
    angle: CameraAngle,

    /// Format of the printed output. Options: text, json
    #[structopt(short = "f", long, default_value = "text")]
    format: OutputFormat,

    /// The logging level to use. See
    /// https://docs.rs/log/0.4.11/log/enum.LevelFilter.html for options
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Print every tile in the order it should be drawn, back to front
    Order,
    /// Print the tile that appears under a screen point
    Pick {
        /// Screen x coordinate (right is positive)
        #[structopt(short, long, allow_hyphen_values = true)]
        x: f64,
        /// Screen y coordinate (down is positive)
        #[structopt(short, long, allow_hyphen_values = true)]
        y: f64,
    },
    /// Render the map as a 2D SVG
    Svg {
        /// File to write the SVG to
        #[structopt(short, long)]
        output: PathBuf,
    },
}

/// Different formats for printed output
#[derive(Copy, Clone, Debug, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
enum OutputFormat {
    /// One line per item, for humans
    Text,
    /// A single JSON value, for other programs
    Json,
}

/// One entry of the printed draw order
#[derive(Debug, Serialize)]
struct OrderEntry {
    pos: GridPoint,
    elevation: u16,
    /// Corrected screen anchor
    anchor: Point2,
}

/// Result of a pick query
#[derive(Debug, Serialize)]
struct PickResult {
    point: Point2,
    /// Cell the point maps to when elevation is ignored
    seed: GridPoint,
    /// Cell actually drawn under the point, if any
    tile: Option<GridPoint>,
}

fn load_config(config_path: &Path) -> anyhow::Result<ProjectionConfig> {
    let mut settings = Config::new();
    let config_path = config_path.to_str().ok_or_else(|| {
        anyhow!("invalid character in path {:?}", config_path)
    })?;
    settings
        .merge(File::with_name(config_path))
        .context("error reading config file")?;
    settings.try_into().context("error reading config")
}

fn load_map(map_path: &Path) -> anyhow::Result<TerrainGrid> {
    let json = fs::read_to_string(map_path)
        .with_context(|| format!("error reading map file {:?}", map_path))?;
    let grid = TerrainGrid::from_json(&json)
        .with_context(|| format!("error loading map from {:?}", map_path))?;
    info!(
        "Loaded {}x{} map from {:?}",
        grid.width(),
        grid.height(),
        map_path
    );
    Ok(grid)
}

/// Print a value in the requested format. `text` renders the text format.
fn print_output<T: Serialize>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    let output = match format {
        OutputFormat::Text => text(value),
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .context("error serializing output")?,
    };
    println!("{}", output);
    Ok(())
}

/// Run the CLI with some options
fn run(opt: Opt) -> anyhow::Result<()> {
    SimpleLogger::new().with_level(opt.log_level).init()?;

    let config = match &opt.config {
        Some(config_path) => load_config(config_path)?,
        None => ProjectionConfig::default(),
    };
    let grid = load_map(&opt.map)?;
    let stage: Stage<u32> = Stage::new(grid, config)?;
    let angle = opt.angle;

    match opt.command {
        Command::Order => {
            let order = stage
                .iter_tiles(angle)
                .map(|(pos, tile)| -> anyhow::Result<OrderEntry> {
                    Ok(OrderEntry {
                        pos,
                        elevation: tile.elevation(),
                        anchor: stage.corrected_screen_anchor(pos, angle)?,
                    })
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            print_output(opt.format, &order, |order| {
                order
                    .iter()
                    .map(|entry| {
                        format!(
                            "{} elevation={} anchor={}",
                            entry.pos, entry.elevation, entry.anchor
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Command::Pick { x, y } => {
            let point = Point2::new(x, y);
            let result = PickResult {
                point,
                seed: stage.from_screen(point, angle),
                tile: stage.mouse_tile_collision(point, angle),
            };
            print_output(opt.format, &result, |result| match result.tile {
                Some(pos) => pos.to_string(),
                None => "none".into(),
            })?;
        }
        Command::Svg { output } => {
            timed!(
                format!("Rendering SVG and writing to {:?}", &output),
                log::Level::Info,
                {
                    let svg = stage.render_as_svg(angle);
                    fs::write(&output, svg).with_context(|| {
                        format!("error writing to file {:?}", &output)
                    })?;
                }
            );
        }
    }

    Ok(())
}

fn main() {
    let exit_code = match run(Opt::from_args()) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    };
    process::exit(exit_code);
}
