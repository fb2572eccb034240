// cli.rs - Command-line interface configuration
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use crate::config::Layout;
use crate::demo::Pattern;

#[derive(Parser, Debug, Clone)]
#[command(name = "pixel-windows")]
#[command(about = "Concurrently updated RGBA pixel windows", long_about = None)]
pub struct Cli {
    /// JSON file listing the windows to open
    #[arg(long)]
    pub layout: Option<PathBuf>,

    /// Number of windows to open when no layout is given
    #[arg(long, default_value_t = 2)]
    pub windows: u32,

    /// Frame width in pixels when no layout is given
    #[arg(long, default_value_t = 320)]
    pub width: u32,

    /// Frame height in pixels when no layout is given
    #[arg(long, default_value_t = 240)]
    pub height: u32,

    /// Test pattern when no layout is given
    #[arg(long, value_enum, default_value_t = Pattern::Gradient)]
    pub pattern: Pattern,

    /// Frames each producer thread submits per second
    #[arg(long = "producer-fps", default_value_t = 60)]
    pub producer_fps: u32,

    /// Stop after this many seconds
    #[arg(long)]
    pub duration: Option<f64>,

    /// Render to offscreen surfaces instead of OS windows
    #[arg(long = "headless", default_value = "false")]
    pub headless: bool,

    /// Print relay statistics as JSON on exit
    #[arg(long)]
    pub stats: bool,
}

impl Cli {
    /// Layout from `--layout`, or a uniform one built from the other flags
    pub fn layout(&self) -> Result<Layout> {
        match &self.layout {
            Some(path) => Layout::load(path),
            None => {
                let layout = Layout::uniform(self.windows, self.width, self.height, self.pattern);
                layout.validate()?;
                Ok(layout)
            }
        }
    }

    pub fn producer_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.producer_fps.max(1)))
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
    }
}
