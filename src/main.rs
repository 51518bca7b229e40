use std::convert::TryFrom;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{ error, info };
use tracing_subscriber::EnvFilter;

use letter_raster::canvas::Canvas;
use letter_raster::clip::VisibilityPolicy;
use letter_raster::config;
use letter_raster::consts::{ CANVAS_HEIGHT, CANVAS_WIDTH, OUT_FILE };
use letter_raster::error::{ Error, Result };
use letter_raster::scene::Scene;
use letter_raster::shading::ShadingMode;

/// Renders the extruded letters Д and Н.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Scene description (JSON); the default scene is used when omitted
    #[clap(long, parse(from_os_str))]
    scene: Option<PathBuf>,

    /// Where to write the PPM image
    #[clap(long, parse(from_os_str), default_value = OUT_FILE)]
    out: PathBuf,

    #[clap(long, default_value_t = CANVAS_WIDTH)]
    width: usize,

    #[clap(long, default_value_t = CANVAS_HEIGHT)]
    height: usize,

    /// monotone, gouraud or phong; overrides the scene description
    #[clap(long)]
    shading: Option<ShadingMode>,

    /// Clip faces at the near plane instead of dropping them whole
    #[clap(long)]
    clip: bool,

    /// Print the frame as JSON instead of writing an image
    #[clap(long)]
    json: bool,

    /// Log debug output
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    if args.width == 0 || args.height == 0 {
        return Err(Error::InvalidConfig {
            details: format!("image size must be positive, got {}x{}",
                args.width, args.height),
        });
    }

    let mut scene = match &args.scene {
        Some(path) => Scene::try_from(config::load(path)?)?,
        None => Scene::new(),
    };

    if let Some(mode) = args.shading {
        scene.set_shading_mode(mode);
    }
    if args.clip {
        scene.set_visibility(VisibilityPolicy::Clip);
    }

    if args.json {
        let frame = scene.render_frame(args.width as f64, args.height as f64);
        let stdout = io::stdout();
        serde_json::to_writer_pretty(stdout.lock(), frame)
            .map_err(|source| Error::Json { path: PathBuf::from("<stdout>"), source })?;
        println!();

        return Ok(());
    }

    info!("Rendering {}x{} with {} shading", args.width, args.height,
        scene.shading_mode());

    let mut canvas = Canvas::new(args.width, args.height);
    scene.paint(&mut canvas);
    canvas.save(&args.out)
}
