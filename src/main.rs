mod animation;
mod config;
mod shutdown;
mod system;
mod tray;
mod utils;

use anyhow::Result;
use clap::Parser;
use log::info;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::animation::icons::IconSequence;
use crate::animation::scheduler::AnimationScheduler;
use crate::config::loader::load_config;
use crate::shutdown::ShutdownCoordinator;
use crate::system::cpu::{CpuSampler, SysinfoProbe};
use crate::system::usage::UsageCell;
use crate::tray::console::{spawn_menu_reader, ConsoleSink};
use crate::tray::PresentationSink;

#[derive(Parser)]
#[command(name = "runcat-tray")]
#[command(version)]
#[command(about = "Status icon that runs faster as CPU load goes up", long_about = None)]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    utils::logger::init();

    let _cli = Cli::parse();
    let config = load_config();

    info!("=== runcat-tray v{} ===", env!("CARGO_PKG_VERSION"));

    // Starting: any failure here aborts before the tray is up
    let icons = IconSequence::load(&config.icons.dir, &config.icons.extension)?;
    let probe = SysinfoProbe::new()?;

    let sink: Arc<dyn PresentationSink> = Arc::new(ConsoleSink::new(&config.tray.title));
    sink.set_tooltip(&config.tray.placeholder_tooltip);

    let usage = Arc::new(UsageCell::new());
    let scheduler = AnimationScheduler::new(icons, usage.clone(), sink.clone());
    scheduler.show_first_frame();

    let sampler = CpuSampler::new(probe, &config.sampler, usage, sink.clone());

    let (quit_tx, quit_rx) = mpsc::channel(1);
    spawn_menu_reader(quit_tx);

    // Running
    let mut coordinator = ShutdownCoordinator::new(sink);
    coordinator.start(tokio::spawn(sampler.run()), tokio::spawn(scheduler.run()));

    let reason = coordinator.run(shutdown::os_signal(), quit_rx).await?;

    info!("Stopped ({})", reason);
    Ok(())
}
