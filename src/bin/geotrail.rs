use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "geotrail", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the movement animation as a looping GIF.
    Render(RenderArgs),
    /// Write only the base map with location markers.
    Base(BaseArgs),
    /// Print the pixel a coordinate projects to.
    Project(ProjectArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Movement dataset CSV.
    #[arg(long)]
    data: PathBuf,

    /// Background map raster.
    #[arg(long)]
    map: PathBuf,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    /// Optional JSON render config; unset fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the template and intermediate frames (defaults to the output's directory).
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Where to keep the base map with markers (defaults to inside the work dir).
    #[arg(long)]
    template: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct BaseArgs {
    /// Movement dataset CSV.
    #[arg(long)]
    data: PathBuf,

    /// Background map raster.
    #[arg(long)]
    map: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Optional JSON render config.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ProjectArgs {
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Raster width in pixels.
    #[arg(long)]
    width: u32,

    /// Raster height in pixels.
    #[arg(long)]
    height: u32,

    /// Optional JSON render config (for the anchors).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Base(args) => cmd_base(args),
        Command::Project(args) => cmd_project(args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_config(path: Option<&Path>) -> anyhow::Result<geotrail::RenderConfig> {
    match path {
        Some(p) => geotrail::RenderConfig::from_json_file(p)
            .with_context(|| format!("load config '{}'", p.display())),
        None => Ok(geotrail::RenderConfig::default()),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = read_config(args.config.as_deref())?;

    let work_dir = match args.work_dir {
        Some(dir) => dir,
        None => args
            .out
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let mut paths = geotrail::PipelinePaths::in_work_dir(&work_dir, &args.out);
    if let Some(template) = args.template {
        paths.template = template;
    }

    let summary = geotrail::run(&args.data, &args.map, &cfg, &paths)
        .with_context(|| format!("render '{}'", args.data.display()))?;

    eprintln!(
        "wrote {} ({} frames, {} transitions, {} locations)",
        summary.animation.path.display(),
        summary.frames,
        summary.transitions,
        summary.locations
    );
    Ok(())
}

fn cmd_base(args: BaseArgs) -> anyhow::Result<()> {
    let cfg = read_config(args.config.as_deref())?;
    let records = geotrail::load_records(&args.data, &cfg.columns)
        .with_context(|| format!("load dataset '{}'", args.data.display()))?;
    let registry = geotrail::LocationRegistry::build(&records);
    geotrail::build_base(&args.map, &registry, &cfg, &args.out)
        .with_context(|| format!("build base map from '{}'", args.map.display()))?;

    eprintln!("wrote {} ({} markers)", args.out.display(), registry.len());
    Ok(())
}

fn cmd_project(args: ProjectArgs) -> anyhow::Result<()> {
    let cfg = read_config(args.config.as_deref())?;
    cfg.validate()?;
    let p = geotrail::project(
        args.lat,
        args.lon,
        cfg.top_left_anchor,
        cfg.bottom_right_anchor,
        args.width,
        args.height,
    );
    println!("{} {}", p.x, p.y);
    Ok(())
}
