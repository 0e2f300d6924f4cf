//! netfield viewer.
//!
//! ```text
//! netfield [--config FILE] [--seed N] [--theme-file FILE]
//! netfield --headless FRAMES --snapshot OUT.png [--width W] [--height H] [--dark]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use netfield::raster::RasterSurface;
use netfield::{FieldConfig, ParticleField, RunOptions, Theme};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    seed: Option<u64>,
    theme_file: Option<PathBuf>,
    headless: Option<u64>,
    snapshot: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    dark: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(flag) = iter.next() {
        let mut value = |name: &str| iter.next().ok_or_else(|| format!("{name} needs a value"));
        match flag.as_str() {
            "--config" => args.config = Some(value("--config")?.into()),
            "--theme-file" => args.theme_file = Some(value("--theme-file")?.into()),
            "--snapshot" => args.snapshot = Some(value("--snapshot")?.into()),
            "--seed" => args.seed = Some(parse_number(&value("--seed")?)?),
            "--headless" => args.headless = Some(parse_number(&value("--headless")?)?),
            "--width" => args.width = Some(parse_number(&value("--width")?)?),
            "--height" => args.height = Some(parse_number(&value("--height")?)?),
            "--dark" => args.dark = true,
            other => return Err(format!("unknown argument '{other}'")),
        }
    }
    Ok(args)
}

fn parse_number<T: std::str::FromStr>(s: &str) -> Result<T, String> {
    s.parse().map_err(|_| format!("'{s}' is not a valid number"))
}

/// Render `frames` ticks off-screen and write the last one as a PNG.
fn snapshot(args: &Args, config: FieldConfig, frames: u64) -> Result<(), Box<dyn std::error::Error>> {
    let path = args.snapshot.clone().ok_or("--headless needs --snapshot")?;
    let surface = RasterSurface::new(args.width.unwrap_or(1280), args.height.unwrap_or(720));
    let mut field = ParticleField::with_seed(surface, config, args.seed.unwrap_or(0))?;

    let theme = Theme::from_dark(args.dark);
    field.set_theme(theme);
    for _ in 0..frames {
        field.tick();
    }

    let background = field.config().palette.background(theme);
    field.context().save_png(&path, background)?;
    log::info!("Wrote frame {} to {}", field.frame(), path.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("netfield: {e}");
            return ExitCode::from(2);
        }
    };

    let config = match &args.config {
        Some(path) => match FieldConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("netfield: {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => FieldConfig::default(),
    };
    if let Err(e) = config.validate() {
        eprintln!("netfield: {e}");
        return ExitCode::FAILURE;
    }

    let result = match args.headless {
        Some(frames) => snapshot(&args, config, frames),
        None => netfield::run(RunOptions {
            config,
            seed: args.seed,
            preference_path: args.theme_file.clone(),
            ..RunOptions::default()
        })
        .map_err(Into::into),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("netfield: {e}");
            ExitCode::FAILURE
        }
    }
}
