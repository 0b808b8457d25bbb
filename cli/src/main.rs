use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use fieldanim::field::ModelKind;
use fieldanim::pipeline::{self, OutputDirs};
use fieldanim::sequence::ConsoleProgress;
use fieldanim::{animation, Config};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fieldanim", version)]
struct Cli {
    /// JSON config file. Missing keys keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sweep an analytic field over time and animate it.
    Sweep(SweepArgs),
    /// Render `*.data` files, oldest first, and animate them.
    Files(FilesArgs),
    /// Animate frames already on disk, ordered by creation time.
    Assemble(AssembleArgs),
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Directory for the rendered frames.
    #[arg(long, default_value = "imgs")]
    frames_dir: PathBuf,

    /// Directory for the animations.
    #[arg(long, default_value = "gifs")]
    gif_dir: PathBuf,
}

impl OutputArgs {
    fn dirs(&self) -> OutputDirs {
        OutputDirs::new(&self.frames_dir, &self.gif_dir)
    }
}

#[derive(Args, Debug)]
struct SweepArgs {
    #[arg(long, value_enum, default_value_t = ModelChoice::Cone)]
    model: ModelChoice,

    /// Exclusive upper bound of the swept steps. The cone's own
    /// `cone.max_step` config key is not affected.
    #[arg(long)]
    max_step: Option<u64>,

    #[arg(long)]
    stride: Option<u64>,

    /// Samples per axis.
    #[arg(long)]
    size: Option<usize>,

    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args, Debug)]
struct FilesArgs {
    /// Directory holding the `x y value` data files.
    #[arg(long, default_value = "data")]
    input: PathBuf,

    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args, Debug)]
struct AssembleArgs {
    /// Directory holding the rendered frames.
    #[arg(long)]
    frames: PathBuf,

    /// Frame file extension.
    #[arg(long, default_value = "jpg")]
    extension: String,

    #[arg(long, default_value = "gifs")]
    gif_dir: PathBuf,

    #[arg(long, default_value = "frames")]
    prefix: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModelChoice {
    Cone,
    Wave,
    Heart,
}

impl From<ModelChoice> for ModelKind {
    fn from(choice: ModelChoice) -> Self {
        match choice {
            ModelChoice::Cone => ModelKind::Cone,
            ModelChoice::Wave => ModelKind::Wave,
            ModelChoice::Heart => ModelKind::Heart,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let created = match cli.cmd {
        Command::Sweep(args) => cmd_sweep(args, config)?,
        Command::Files(args) => cmd_files(args, config)?,
        Command::Assemble(args) => cmd_assemble(args, config)?,
    };

    let name = created.file_name().unwrap_or(created.as_os_str());
    println!("Created gif: {}", Path::new(name).display());
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            Config::from_json_file(path).with_context(|| format!("load config '{}'", path.display()))
        }
        None => Ok(Config::default()),
    }
}

fn apply_sweep_overrides(args: &SweepArgs, config: &mut Config) {
    if let Some(max_step) = args.max_step {
        config.sweep.max_step = max_step;
    }
    if let Some(stride) = args.stride {
        config.sweep.stride = stride;
    }
    if let Some(size) = args.size {
        config.grid.size = size;
    }
}

fn cmd_sweep(args: SweepArgs, mut config: Config) -> anyhow::Result<PathBuf> {
    apply_sweep_overrides(&args, &mut config);

    let summary = pipeline::run_sweep(
        args.model.into(),
        &config,
        &args.out.dirs(),
        &mut ConsoleProgress::default(),
    )?;
    Ok(summary.animation)
}

fn cmd_files(args: FilesArgs, config: Config) -> anyhow::Result<PathBuf> {
    let summary = pipeline::run_files(
        &args.input,
        &config,
        &args.out.dirs(),
        &mut ConsoleProgress::default(),
    )?;
    if !summary.skipped.is_empty() {
        eprintln!(
            "{} of {} data files skipped",
            summary.skipped.len(),
            summary.skipped.len() + summary.frames.len()
        );
    }
    Ok(summary.animation)
}

fn cmd_assemble(args: AssembleArgs, config: Config) -> anyhow::Result<PathBuf> {
    config.validate()?;
    let frames = animation::discover_frames(&args.frames, &args.extension)?;
    let path = animation::assemble(
        &frames,
        &args.gif_dir,
        config.animation.prefix.as_deref().unwrap_or(&args.prefix),
        &config.animation,
        &mut ConsoleProgress::default(),
    )?;
    Ok(path)
}
