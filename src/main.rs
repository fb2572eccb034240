use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use pixel_windows::cli::Cli;
use pixel_windows::config::Layout;
use pixel_windows::core::HeadlessBackend;
use pixel_windows::demo::spawn_producer;
use pixel_windows::traits::SurfaceBackend;
use pixel_windows::WindowSystem;

/// Stand-in for vsync when nothing is on screen
const HEADLESS_PRESENT_DELAY: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let layout = cli.layout()?;

    if cli.headless {
        let backend = HeadlessBackend::new().with_present_delay(HEADLESS_PRESENT_DELAY);
        run(backend, &cli, &layout)
    } else {
        run_windowed(&cli, &layout)
    }
}

#[cfg(any(target_os = "linux", target_os = "windows", target_os = "macos"))]
fn run_windowed(cli: &Cli, layout: &Layout) -> Result<()> {
    run(pixel_windows::core::WinitBackend::new(), cli, layout)
}

#[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
fn run_windowed(_cli: &Cli, _layout: &Layout) -> Result<()> {
    anyhow::bail!("no windowing backend on this platform, use --headless")
}

fn run<B: SurfaceBackend>(backend: B, cli: &Cli, layout: &Layout) -> Result<()> {
    let mut system = WindowSystem::init(backend).context("failed to initialise window backend")?;
    let cancel = Arc::new(AtomicBool::new(false));

    let mut producers = Vec::with_capacity(layout.windows.len());
    for spec in &layout.windows {
        let id = system
            .create_window(spec.width, spec.height, &spec.title)
            .with_context(|| format!("failed to open window \"{}\"", spec.title))?;
        producers.push(spawn_producer(
            system.submitter(),
            id,
            spec.pattern,
            cli.producer_interval(),
            Arc::clone(&cancel),
        ));
    }

    if let Some(duration) = cli.duration() {
        let cancel = Arc::clone(&cancel);
        thread::spawn(move || {
            thread::sleep(duration);
            cancel.store(true, Ordering::SeqCst);
        });
    }

    system.run_event_loop(&cancel);
    cancel.store(true, Ordering::SeqCst);

    let remaining = system.relay().lock_registry().ids();
    for id in remaining {
        system.destroy_window(id);
    }

    let mut submitted = 0;
    for producer in producers {
        submitted += producer
            .join()
            .map_err(|_| anyhow!("producer thread panicked"))?;
    }
    log::info!("producers submitted {submitted} frame(s)");

    if cli.stats {
        println!("{}", serde_json::to_string_pretty(&system.stats())?);
    }

    Ok(())
}
