//! Umbra CLI - render SDF scenes over images from JSON configurations

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use umbra_core::sdf::Sdf;
use umbra_render::{Raymarcher, RenderConfig};

#[derive(Parser)]
#[command(name = "umbra")]
#[command(about = "Full-screen SDF raymarching over images", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a configuration to an image file
    Render {
        /// Configuration file (uses the demo scene if not provided)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Source image to composite over (output takes its size)
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Output image file (.png)
        #[arg(short, long, default_value = "render.png")]
        output: PathBuf,

        /// Image width
        #[arg(long, default_value = "1280")]
        width: u32,

        /// Image height
        #[arg(long, default_value = "720")]
        height: u32,
    },

    /// Render frames orbiting the camera around its target
    Turntable {
        /// Configuration file (uses the demo scene if not provided)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory for the numbered frames
        #[arg(short, long, default_value = "frames")]
        output_dir: PathBuf,

        /// Number of frames in one full turn
        #[arg(short, long, default_value = "36")]
        frames: u32,

        /// Image width
        #[arg(long, default_value = "640")]
        width: u32,

        /// Image height
        #[arg(long, default_value = "360")]
        height: u32,
    },

    /// Re-render whenever the configuration file changes
    Watch {
        /// Configuration file to watch
        config: PathBuf,

        /// Output image file (.png)
        #[arg(short, long, default_value = "render.png")]
        output: PathBuf,

        /// Image width
        #[arg(long, default_value = "640")]
        width: u32,

        /// Image height
        #[arg(long, default_value = "360")]
        height: u32,
    },

    /// Check a configuration file for errors
    Validate {
        /// Configuration file
        config: PathBuf,
    },

    /// Write the demo configuration
    Demo {
        /// Output file
        #[arg(short, long, default_value = "umbra.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            config,
            source,
            output,
            width,
            height,
        } => {
            run_render(config.as_deref(), source.as_deref(), &output, width, height)?;
        }
        Commands::Turntable {
            config,
            output_dir,
            frames,
            width,
            height,
        } => {
            run_turntable(config.as_deref(), &output_dir, frames, width, height)?;
        }
        Commands::Watch {
            config,
            output,
            width,
            height,
        } => {
            run_watch(&config, &output, width, height)?;
        }
        Commands::Validate { config } => {
            run_validate(&config)?;
        }
        Commands::Demo { output } => {
            generate_demo(&output)?;
        }
    }

    Ok(())
}

/// Load and validate a configuration, or fall back to the demo
fn load_config(path: Option<&Path>) -> Result<(RenderConfig, PathBuf)> {
    let Some(path) = path else {
        return Ok((RenderConfig::demo(), PathBuf::from(".")));
    };

    let config = RenderConfig::load(path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config {}", path.display()))?;

    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((config, base_dir))
}

fn run_render(
    config: Option<&Path>,
    source: Option<&Path>,
    output: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    let (config, base_dir) = load_config(config)?;

    let source = match source {
        Some(path) => Some(
            image::open(path)
                .with_context(|| format!("Failed to open source image {}", path.display()))?
                .into_rgba8(),
        ),
        None => None,
    };
    let (width, height) = source
        .as_ref()
        .map_or((width, height), RgbaImage::dimensions);

    println!(
        "Rendering to {} ({}x{})...",
        output.display(),
        width,
        height
    );

    let params = config.frame_params(width, height, &base_dir)?;
    let raymarcher = Raymarcher::new(params);
    let img = match &source {
        Some(source) => raymarcher.render(source),
        None => raymarcher.render_blank(width, height),
    };

    img.save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!("Saved to: {}", output.display());

    Ok(())
}

fn run_turntable(
    config: Option<&Path>,
    output_dir: &Path,
    frames: u32,
    width: u32,
    height: u32,
) -> Result<()> {
    if frames == 0 {
        anyhow::bail!("Frame count must be at least 1");
    }

    let (config, base_dir) = load_config(config)?;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut camera = config.camera.clone().with_resolution(width, height);
    let mut raymarcher = Raymarcher::new(config.frame_params(width, height, &base_dir)?);
    let step = std::f32::consts::TAU / frames as f32;

    println!("Rendering {} frames to {}...", frames, output_dir.display());

    for frame in 0..frames {
        raymarcher.set_camera(&camera);
        let img = raymarcher.render_blank(width, height);

        let path = output_dir.join(format!("frame_{frame:04}.png"));
        img.save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Frame {}/{} -> {}", frame + 1, frames, path.display());

        camera.orbit(step, 0.0);
    }

    Ok(())
}

fn run_watch(config: &Path, output: &Path, width: u32, height: u32) -> Result<()> {
    use notify::{RecursiveMode, Watcher};
    use std::sync::mpsc::channel;
    use std::time::Duration;

    if !config.exists() {
        anyhow::bail!("Config file not found: {}", config.display());
    }

    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            if event.kind.is_modify() || event.kind.is_create() {
                let _ = tx.send(());
            }
        }
    })?;

    watcher.watch(config, RecursiveMode::NonRecursive)?;

    println!("Watching {}", config.display());
    println!("Press Ctrl+C to stop\n");

    render_and_report(config, output, width, height);

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(()) => {
                // Editors often write in several steps
                while rx.try_recv().is_ok() {}
                render_and_report(config, output, width, height);
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}

fn render_and_report(config: &Path, output: &Path, width: u32, height: u32) {
    println!("\n--- Rendering: {} ---", config.display());

    match run_render(Some(config), None, output, width, height) {
        Ok(()) => println!("OK - {}", output.display()),
        Err(e) => eprintln!("ERROR:\n{:#}", e),
    }
}

fn run_validate(path: &Path) -> Result<()> {
    let config = RenderConfig::load(path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;

    match config.validate() {
        Ok(()) => {
            println!("OK - {} is valid", path.display());
            println!("  entries: {}", config.scene.entries.len());

            let bounds = config.scene.bounds();
            if bounds.is_finite() {
                println!("  bounds:  {} .. {}", bounds.min, bounds.max);
            } else {
                println!("  bounds:  unbounded");
            }

            let stages = [
                ("shadow", config.environment.shadow.is_some()),
                ("ambient occlusion", config.environment.ambient_occlusion.is_some()),
                ("reflection", config.environment.reflection.is_some()),
            ];
            for (name, enabled) in stages {
                println!("  {name}: {}", if enabled { "on" } else { "off" });
            }
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Invalid config {}", path.display())),
    }
}

fn generate_demo(output: &Path) -> Result<()> {
    println!("Writing demo configuration...");

    RenderConfig::demo()
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Saved to: {}", output.display());
    println!("Render it with: umbra render --config {}", output.display());

    Ok(())
}
