//! camoverlay - projector overlay for CAM toolpaths

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use tracing::{info, warn};

use camoverlay::{
    init_logging, load_homography, load_step, persist_calibration, run_poll_loop, CalibrationTool,
    CommandSource, Compositor, Config, FetchedStep, Homography, SpoolDirectory, SvgSurface, Vec2,
    BUILD_DATE, VERSION,
};

#[derive(Parser)]
#[command(name = "camoverlay")]
#[command(about = "Projects CAM toolpaths onto the work surface", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (.toml or .json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile one step and write it as SVG
    Render {
        /// Step JSON file
        step: PathBuf,
        /// Homography record or envelope JSON file
        #[arg(long)]
        homography: Option<PathBuf>,
        /// Output SVG file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Poll a spool directory and rewrite the SVG on every applied step
    Watch {
        /// Spool directory (defaults to `spool_dir` from the config)
        #[arg(long)]
        spool: Option<PathBuf>,
        /// Output SVG file
        #[arg(long, default_value = "overlay.svg")]
        out: PathBuf,
    },
    /// Store a homography mapping the calibration box onto measured corners
    Calibrate {
        /// Measured corners as x1,y1,...,x4,y4 in paper order
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        dst: Vec<f64>,
        /// Spool directory (defaults to `spool_dir` from the config)
        #[arg(long)]
        spool: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;
    info!("camoverlay {} (built {})", VERSION, BUILD_DATE);

    let config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            step,
            homography,
            out,
        } => render(&config, &step, homography.as_deref(), out.as_deref()),
        Commands::Watch { spool, out } => {
            let spool = spool_dir(&config, spool)?;
            runtime()?.block_on(watch(&config, spool, out))
        }
        Commands::Calibrate { dst, spool } => {
            let spool = spool_dir(&config, spool)?;
            runtime()?.block_on(calibrate(&config, &dst, spool))
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

fn spool_dir(config: &Config, flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag.or_else(|| config.spool_dir.clone()) {
        Some(dir) => Ok(dir),
        None => bail!("No spool directory: pass --spool or set spool_dir in the config"),
    }
}

fn render(config: &Config, step: &Path, homography: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let step = load_step(step)?;
    let homography = match homography {
        Some(path) => load_homography(path)?,
        None => Homography::identity(),
    };

    let mut surface = SvgSurface::new(config.display.flip_y);
    if let Some(out) = out {
        surface = surface.with_output(out);
    }
    let mut compositor = Compositor::new(surface, config);
    let redrawn = compositor.apply(&FetchedStep { step, homography })?;
    if !redrawn {
        warn!("Step type draws nothing");
        return Ok(());
    }

    match out {
        Some(out) => info!("Wrote {}", out.display()),
        None => print!("{}", compositor.surface().document()),
    }
    Ok(())
}

async fn watch(config: &Config, spool: PathBuf, out: PathBuf) -> Result<()> {
    info!(
        "Watching {} every {}ms, writing {}",
        spool.display(),
        config.polling.interval_ms,
        out.display()
    );
    let source: Arc<dyn CommandSource> = Arc::new(SpoolDirectory::new(spool));
    let surface = SvgSurface::new(config.display.flip_y).with_output(out);
    let compositor = Arc::new(Mutex::new(Compositor::new(surface, config)));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    run_poll_loop(source, compositor, &config.polling, shutdown).await;
    info!("Stopped");
    Ok(())
}

async fn calibrate(config: &Config, dst: &[f64], spool: PathBuf) -> Result<()> {
    if dst.len() != 8 {
        bail!("--dst needs 8 numbers (four x,y corners), got {}", dst.len());
    }
    let mut corners = [Vec2::ZERO; 4];
    for (corner, pair) in corners.iter_mut().zip(dst.chunks_exact(2)) {
        *corner = Vec2::new(pair[0], pair[1]);
    }

    let context = camoverlay::mark_context(config);
    let mut tool = CalibrationTool::new(&context.calibration, config.calibration.hit_tolerance);
    tool.set_corners(corners);
    let record = tool.record();
    Homography::from_record(&record).context("Measured corners do not define a homography")?;

    let source = SpoolDirectory::new(spool);
    persist_calibration(&source, &record).await?;
    println!("{}", record.to_json());
    Ok(())
}
