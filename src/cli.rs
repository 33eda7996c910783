use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::render::{RenderOptions, DEFAULT_GAP_THRESHOLD, DEFAULT_STROKE_WIDTH, DEFAULT_ZOOM};

#[derive(Parser, Debug)]
#[command(
    name = "walk",
    author,
    version,
    about = "walk is a CLI to interact with geopositional data"
)]
pub struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// The command table handed to `commands::dispatch`
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extracts coordinates from all .gpx files in a folder
    Extract(ExtractArgs),
    /// Transform each GPX file in a directory into a separate GeoJSON file
    Transform(TransformArgs),
    /// Visualise coordinates parsed from gpx files
    #[command(alias = "visualize")]
    Visualise(VisualiseArgs),
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Folder containing the .gpx files
    #[arg(value_hint = ValueHint::DirPath)]
    pub folder: PathBuf,
}

#[derive(Args, Debug)]
pub struct TransformArgs {
    /// The path of the directory where the GPX files are located
    #[arg(short, long, default_value = ".", env = "WALK_DIR", value_hint = ValueHint::DirPath)]
    pub dir: PathBuf,

    /// The directory to save the output GeoJSON files
    #[arg(short = 'O', long, default_value = ".", env = "WALK_OUTDIR", value_hint = ValueHint::DirPath)]
    pub outdir: PathBuf,
}

#[derive(Args, Debug)]
pub struct VisualiseArgs {
    /// The path of the directory where the GPX files are located
    #[arg(short, long, default_value = "./data", env = "WALK_DIR", value_hint = ValueHint::DirPath)]
    pub dir: PathBuf,

    /// Determines the zoom level of the final projection
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_ZOOM,
        env = "WALK_ZOOM",
        value_parser = clap::value_parser!(u8).range(0..=30)
    )]
    pub zoom: u8,

    /// PNG file to write
    #[arg(short, long, default_value = "output.png", value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Pixel distance above which consecutive points are not joined
    #[arg(long, default_value_t = DEFAULT_GAP_THRESHOLD, env = "WALK_GAP_THRESHOLD")]
    pub gap_threshold: f64,

    /// Line width in pixels
    #[arg(long, default_value_t = DEFAULT_STROKE_WIDTH, env = "WALK_STROKE_WIDTH")]
    pub stroke_width: u32,
}

impl VisualiseArgs {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            zoom: self.zoom,
            gap_threshold: self.gap_threshold,
            stroke_width: self.stroke_width,
        }
    }
}
