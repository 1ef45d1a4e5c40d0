use clap::{Parser, ValueEnum};
use halo_renderer::tracer::{AreaLighting, GlobalTrace, PathTrace, RayCast, Whitted};
use halo_renderer::World;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Which tracer shades the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracerKind {
    /// First hit only, no recursion
    Raycast,
    /// Direct light from area lights
    Area,
    /// Mirror and glass recursion
    Whitted,
    /// Unbiased path tracing
    Path,
    /// Direct lighting plus path-traced indirect light
    Global,
}

impl TracerKind {
    pub fn install(self, world: &mut World) {
        match self {
            TracerKind::Raycast => world.set_tracer(RayCast),
            TracerKind::Area => world.set_tracer(AreaLighting),
            TracerKind::Whitted => world.set_tracer(Whitted),
            TracerKind::Path => world.set_tracer(PathTrace),
            TracerKind::Global => world.set_tracer(GlobalTrace),
        }
    }
}

/// Render the bring-up scene to a PNG.
#[derive(Debug, Parser)]
#[command(name = "halo")]
#[command(about = "An offline ray tracer")]
pub struct Args {
    /// Output image path
    #[arg(default_value = "halo.png")]
    pub output: PathBuf,

    /// Samples per pixel; multi-jittered materials need a perfect square
    #[arg(long, short = 's', default_value_t = 16)]
    pub samples: usize,

    #[arg(long, value_enum, default_value_t = TracerKind::Area)]
    pub tracer: TracerKind,

    /// Master seed for every sampler in the scene
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    #[arg(long, default_value_t = 400)]
    pub width: u32,

    #[arg(long, default_value_t = 300)]
    pub height: u32,

    /// Render on one thread
    #[arg(long)]
    pub serial: bool,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}
