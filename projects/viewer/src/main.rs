use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use engine::{config::ViewerConfig, game::animation::TimeWrapMode};

#[derive(Parser)]
#[command(name = "viewer")]
#[command(about = "Play the skeletal animations of a glTF model")]
struct Cli {
    /// glTF / GLB model to show
    #[arg(default_value = "assets/vanguard.glb")]
    model: PathBuf,

    /// JSON viewer settings, missing fields use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Clip to start with
    #[arg(long)]
    clip: Option<usize>,

    /// Start paused
    #[arg(long)]
    paused: bool,

    /// How time wraps at the end of a clip
    #[arg(long, value_enum)]
    wrap: Option<WrapArg>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum WrapArg {
    Clamp,
    Repeat,
    PingPong,
}

impl From<WrapArg> for TimeWrapMode {
    fn from(arg: WrapArg) -> Self {
        match arg {
            WrapArg::Clamp => TimeWrapMode::Clamp,
            WrapArg::Repeat => TimeWrapMode::Repeat,
            WrapArg::PingPong => TimeWrapMode::PingPong,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load(path).with_context(|| format!("reading config {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    if let Some(clip) = cli.clip {
        config.initial_clip = clip;
    }
    if cli.paused {
        config.play_animation = false;
    }
    if let Some(wrap) = cli.wrap {
        config.time_wrap = wrap.into();
    }

    log::info!("Space: next clip, P: play / pause, Esc: quit");
    engine::run(&cli.model, config).with_context(|| format!("viewing {}", cli.model.display()))?;
    Ok(())
}
