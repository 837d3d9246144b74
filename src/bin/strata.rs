use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "strata", version)]
struct Cli {
    /// Log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every camera of a project into packed PNGs.
    Render(RenderArgs),
    /// Print the traced connectivity paths of every camera as JSON.
    Paths(PathsArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Project directory.
    #[arg(long)]
    project: PathBuf,

    /// Output directory for `camera_<n>.png`.
    #[arg(long)]
    out: PathBuf,

    /// Render config JSON; defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Drive the render in time slices of this many milliseconds, reporting progress.
    #[arg(long)]
    slice_ms: Option<u64>,

    /// Print a SHA-256 of every packed raster.
    #[arg(long)]
    digest: bool,
}

#[derive(Args, Debug)]
struct PathsArgs {
    /// Project directory.
    #[arg(long)]
    project: PathBuf,

    /// Render config JSON; only the camera window matters here.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Paths(args) => cmd_paths(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_config(path: Option<&Path>) -> anyhow::Result<strata::RenderConfig> {
    let Some(path) = path else {
        return Ok(strata::RenderConfig::default());
    };
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let cfg: strata::RenderConfig = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse config '{}'", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let project = strata::load_project(&args.project)
        .with_context(|| format!("load project '{}'", args.project.display()))?;

    let mut render = strata::LevelRender::new(
        &project.level,
        &project.defs,
        config,
        strata::BuiltinHost,
    )?;
    match args.slice_ms {
        Some(ms) => {
            let slice = Duration::from_millis(ms);
            while !render.state().is_terminal() {
                let units = render.step_for(slice)?;
                let p = render.progress();
                eprintln!(
                    "camera {}/{} {:?} ({units} units)",
                    p.camera + 1,
                    p.cameras,
                    p.state
                );
            }
        }
        None => render.run_to_end()?,
    }

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;
    for cam in render.outputs() {
        let path = args.out.join(format!("camera_{}.png", cam.camera_index));
        cam.raster
            .save(&path)
            .with_context(|| format!("write png '{}'", path.display()))?;
        if args.digest {
            let hash = sha2::Sha256::digest(cam.raster.as_raw());
            println!("{} sha256={hash:x}", path.display());
        }
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_paths(args: PathsArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let project = strata::load_project(&args.project)
        .with_context(|| format!("load project '{}'", args.project.display()))?;

    let per_camera: Vec<_> = project
        .level
        .cameras
        .iter()
        .map(|camera| {
            let sampler = strata::level::sampler::GeoSampler::new(&project.level, camera, &config);
            strata::render::connections::trace_all(&sampler)
        })
        .collect();
    let out = serde_json::to_string_pretty(&per_camera).context("serialize paths")?;
    println!("{out}");
    Ok(())
}
