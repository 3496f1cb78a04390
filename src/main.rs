use anyhow::Context;
use std::path::{Path, PathBuf};
use text_watermark as wm;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Tuning {
    /// Json file holding the embedding configuration.
    #[clap(value_parser, long)]
    config: Option<PathBuf>,

    /// Watermark strength, overrides the configuration.
    #[clap(value_parser, long)]
    alpha: Option<f32>,

    /// Font scale, overrides the configuration.
    #[clap(value_parser, long)]
    font_scale: Option<u32>,

    /// Stroke thickness, overrides the configuration.
    #[clap(value_parser, long)]
    thickness: Option<u32>,
}

#[derive(Args)]
struct Embed {
    /// The file to operate on.
    #[clap(action)]
    file: PathBuf,

    /// The text to embed.
    #[clap(action)]
    text: String,

    /// Where to write the result, format follows the extension. Defaults to
    /// <file>_watermarked.png.
    #[clap(value_parser, short, long)]
    output: Option<PathBuf>,

    #[clap(flatten)]
    tuning: Tuning,
}

#[derive(Args)]
struct Compare {
    /// The original file.
    #[clap(action)]
    original: PathBuf,

    /// The file to compare against.
    #[clap(action)]
    other: PathBuf,
}

#[derive(Args)]
struct Check {
    /// The file to operate on.
    #[clap(action)]
    file: PathBuf,

    /// The text to embed.
    #[clap(action)]
    text: String,

    #[clap(flatten)]
    tuning: Tuning,
}

#[derive(Args)]
struct Detect {
    /// The file to operate on.
    #[clap(action)]
    file: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a text watermark into a file.
    Embed(Embed),
    /// Report whether two files hold exactly the same image.
    Compare(Compare),
    /// Embed a watermark and check whether that changed the image.
    Check(Check),
    /// Show the watermark of a file.
    Detect(Detect),
}

impl Tuning {
    fn config(&self) -> anyhow::Result<wm::EmbedConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let data = std::fs::read_to_string(path)
                    .with_context(|| format!("could not read config {path:?}"))?;
                wm::EmbedConfig::from_json(&data)
                    .with_context(|| format!("could not parse config {path:?}"))?
            }
            None => wm::EmbedConfig::default(),
        };
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(font_scale) = self.font_scale {
            config.font_scale = font_scale;
        }
        if let Some(thickness) = self.thickness {
            config.thickness = thickness;
        }
        Ok(config)
    }
}

fn default_output(file: &Path) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_owned());
    file.with_file_name(format!("{stem}_watermarked.png"))
}

fn embed(v: &Embed) -> anyhow::Result<()> {
    let config = v.tuning.config()?;
    let marked = wm::embed_with(&v.file, &v.text, &config)?;
    let output = v.output.clone().unwrap_or_else(|| default_output(&v.file));
    wm::save(&marked, &output)?;
    tracing::info!(?output, "watermark added");
    Ok(())
}

fn compare(v: &Compare) -> anyhow::Result<()> {
    let a = wm::open_rgb(&v.original)?;
    let b = wm::open_rgb(&v.other)?;
    match wm::compare::abs_diff(&a, &b) {
        Some(diff) => {
            let changed = wm::compare::count_nonzero(&diff);
            if changed == 0 {
                println!("unchanged");
            } else {
                println!("changed: {changed} samples differ");
            }
        }
        None => println!(
            "changed: dimensions differ, {:?} vs {:?}",
            a.dimensions(),
            b.dimensions()
        ),
    }
    Ok(())
}

/// Write `marked` to a temporary file in `dir` and compare it with the image at `original`.
///
/// The temporary file is removed on every path, also when writing or comparing fails.
fn unchanged_on_disk(
    original: &Path,
    marked: &image::RgbImage,
    dir: &Path,
    extension: &str,
) -> anyhow::Result<bool> {
    let temp = tempfile::Builder::new()
        .prefix("text_watermark_check_")
        .suffix(&format!(".{extension}"))
        .tempfile_in(dir)
        .with_context(|| format!("could not create a temporary file in {dir:?}"))?;
    wm::save(marked, temp.path())?;
    Ok(wm::unchanged(original, temp.path())?)
}

fn check(v: &Check) -> anyhow::Result<()> {
    let config = v.tuning.config()?;
    let marked = wm::embed_with(&v.file, &v.text, &config)?;

    if unchanged_on_disk(&v.file, &marked, &std::env::temp_dir(), "png")? {
        println!("No changes detected in the image.");
    } else {
        println!("Changes detected in the image.");
    }
    Ok(())
}

fn detect(v: &Detect) -> anyhow::Result<()> {
    let img = wm::detect(&v.file)?;
    println!("{:?}: {}x{}", v.file, img.width(), img.height());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Embed(v) => embed(v),
        Commands::Compare(v) => compare(v),
        Commands::Check(v) => check(v),
        Commands::Detect(v) => detect(v),
    }
}
