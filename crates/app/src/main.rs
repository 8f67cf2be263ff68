mod input;
mod layout;
mod view;
mod window;

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use clap::{Parser, Subcommand};
use doodle_melody_core::{AppConfig, AudioBackend, Session};
use tracing_subscriber::EnvFilter;

use crate::{input::PointerTracker, layout::Layout, view::Frame, window::DoodleWindow};

fn main() -> doodle_melody_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Draw { config, offline } => run_draw(config.as_deref(), offline),
        Commands::Config { output } => run_config(output.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> doodle_melody_core::Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            AppConfig::load(path)
        }
        None => Ok(AppConfig::default()),
    }
}

fn run_draw(config: Option<&Path>, offline: bool) -> doodle_melody_core::Result<()> {
    let config = load_config(config)?;
    let backend = if offline {
        AudioBackend::offline(&config.audio)
    } else {
        AudioBackend::Device
    };
    let mut session = Session::new(&config, backend)?;
    let layout = Layout::new(&config.canvas, session.palette().len());
    tracing::info!(
        width = config.canvas.width,
        height = config.canvas.height,
        brushes = session.palette().len(),
        ?backend,
        "opening drawing window"
    );

    let mut window = DoodleWindow::open("Doodle Melody", layout.width(), layout.height())?;
    let mut frame = Frame::new(layout.width(), layout.height());
    let mut tracker = PointerTracker::new();
    let mut offline_clock = OfflineClock::new();

    while window.is_open() {
        let mut events = tracker.update(&layout, window.mouse_pos(), window.left_mouse_down());
        events.extend(window.shortcuts(session.palette().len()));

        for event in events {
            if let Err(err) = session.handle(event) {
                tracing::warn!(%err, ?event, "event rejected");
            }
        }

        if offline {
            offline_clock.drain(&session)?;
        }

        view::compose(&mut frame, &session, &layout);
        window.present(&frame)?;
    }

    tracing::info!("window closed");
    Ok(())
}

/// Pulls samples from an offline context at wall-clock pace so scheduled
/// notes advance and finish without an output device.
struct OfflineClock {
    last: Instant,
    scratch: Vec<f32>,
}

impl OfflineClock {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            scratch: Vec::new(),
        }
    }

    fn drain(&mut self, session: &Session) -> doodle_melody_core::Result<()> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_secs_f64();
        self.last = now;

        let Some(context) = session.audio().context() else {
            return Ok(());
        };
        let frames = (elapsed * f64::from(context.sample_rate())).round() as usize;
        self.scratch.clear();
        self.scratch.resize(frames * usize::from(context.channels()), 0.0);
        context.render(&mut self.scratch)
    }
}

fn run_config(output: Option<&Path>) -> doodle_melody_core::Result<()> {
    let json = AppConfig::default().to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(?path, "wrote default configuration");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Draw a line, hear it as a melody", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the drawing window.
    Draw {
        /// Optional JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Render audio into memory at the configured offline sample rate
        /// instead of opening an output device.
        #[arg(long)]
        offline: bool,
    },
    /// Print the default configuration, or write it to a file.
    Config {
        /// Destination file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
