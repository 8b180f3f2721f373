//! cubeface CLI: run face detection and sticker classification on still
//! images.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::info;
use serde::Serialize;

use cubeface::core::init_with_level;
use cubeface::detect;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "cubeface")]
#[command(about = "Detect a Rubik's cube face in an image and read its sticker colors")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate the face quad in an image.
    Detect(CliImageArgs),

    /// Locate the face and classify its nine sticker colors.
    Classify(CliImageArgs),
}

#[derive(Debug, Clone, Args)]
struct CliImageArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Path to write the result (JSON). Prints to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Serialize)]
struct DetectReport {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    corners: Option<[[f32; 2]; 4]>,
}

#[derive(Serialize)]
struct ClassifyReport {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    corners: Option<[[f32; 2]; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    colors: Option<[String; 9]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    facelets: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rgb: Option<[[u8; 3]; 9]>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    init_with_level(level)?;

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Classify(args) => run_classify(&args),
    }
}

fn load_rgb(path: &PathBuf) -> CliResult<image::RgbImage> {
    let img = image::open(path)
        .map_err(|e| -> CliError { format!("failed to open {}: {e}", path.display()).into() })?
        .to_rgb8();
    info!("loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img)
}

fn corners_of(quad: &cubeface::Quad) -> [[f32; 2]; 4] {
    quad.corners.map(|p| [p.x, p.y])
}

fn emit<T: Serialize>(report: &T, out: Option<&PathBuf>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    match out {
        Some(path) => {
            std::fs::write(path, &json)?;
            info!("result written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn run_detect(args: &CliImageArgs) -> CliResult<()> {
    let img = load_rgb(&args.image)?;
    let quad = detect::detect_face_default(&img);

    let report = DetectReport {
        found: quad.is_some(),
        corners: quad.as_ref().map(corners_of),
    };
    emit(&report, args.out.as_ref())
}

fn run_classify(args: &CliImageArgs) -> CliResult<()> {
    let img = load_rgb(&args.image)?;
    let readout = detect::classify_face_default(&img);

    let report = match &readout {
        None => ClassifyReport {
            found: false,
            corners: None,
            colors: None,
            facelets: None,
            rgb: None,
        },
        Some(r) => {
            info!("face classified: {:?}", r.colors);
            ClassifyReport {
                found: true,
                corners: Some(corners_of(&r.quad)),
                colors: Some(r.colors.map(|c| format!("{c:?}"))),
                facelets: Some(r.colors.iter().map(|c| c.face_id().letter()).collect()),
                rgb: Some(r.samples.map(|s| s.rgb)),
            }
        }
    };
    emit(&report, args.out.as_ref())
}
