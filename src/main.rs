use std::path::PathBuf;
use std::time::Instant;

use anyhow::{ Context, Result };
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use raycast::consts::MAX_RECURSION_DEPTH;
use raycast::config::RenderSettings;
use raycast::scene::Scene;
use raycast::world::World;
use raycast::camera::Rasterizer;
use raycast::parallel::parallel_render;

/// Renders a scene description into a binary PPM image.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Width of the output image, in pixels
    #[clap(value_parser = positive)]
    width: usize,

    /// Height of the output image, in pixels
    #[clap(value_parser = positive)]
    height: usize,

    /// Scene description; `.json` files are read as JSON, anything else as
    /// the line-oriented text format
    #[clap(value_parser)]
    input: PathBuf,

    /// Where to write the PPM image
    #[clap(value_parser)]
    output: PathBuf,

    /// Reflection and refraction rays deeper than this are black
    #[clap(long, value_parser, default_value_t = MAX_RECURSION_DEPTH)]
    max_depth: usize,

    /// Number of render threads (one per core if unset)
    #[clap(long, value_parser = positive)]
    threads: Option<usize>,

    /// Render on the main thread only
    #[clap(long, action)]
    sequential: bool,
}

fn positive(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let settings = RenderSettings::default()
        .with_max_depth(args.max_depth)
        .with_threads(args.threads);

    let start = Instant::now();
    let scene = Scene::load(&args.input)
        .with_context(|| format!("failed to load scene {}", args.input.display()))?;
    info!(objects = scene.objects.len(), lights = scene.lights.len(),
        "loaded {} in {:?}", args.input.display(), start.elapsed());

    let raster = Rasterizer::new(&scene.camera, args.width, args.height);
    let world = World::new(scene, settings);

    let start = Instant::now();
    let canvas = if args.sequential {
        raster.render(&world)
    } else {
        parallel_render(&world, &raster).context("failed to render in parallel")?
    };
    info!("rendered {}x{} pixels in {:?}", args.width, args.height,
        start.elapsed());

    canvas.save(&args.output)
        .with_context(|| format!("failed to write image {}", args.output.display()))?;
    info!("saved render to {}", args.output.display());

    Ok(())
}
