use std::error::Error;
use std::path::PathBuf;

use emuloop::browser::DirectorySelector;
use emuloop::clock::ProcessClock;
use emuloop::config::Config;
use emuloop::display::MonoTermDisplay;
use emuloop::input::TermInput;
use emuloop::lifecycle::{DesktopPlatform, Host, Lifecycle};
use emuloop::machine::{ImageViewer, DEMO_RESOLUTION};
use emuloop::pacer::ExecuteFlag;
use emuloop::sound::SoundCore;

fn main() -> Result<(), Box<dyn Error>> {
    // stdout belongs to the terminal UI and stderr shares its tty, so only
    // warnings get through unless RUST_LOG asks for more
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    tracing::info!("Starting emuloop");

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("using default settings: {}", e);
        Config::default()
    });
    let runtime = config.runtime;
    tracing::debug!(?runtime, "runtime settings");

    // an explicit image on the command line skips the directory scan
    let explicit = std::env::args_os().nth(1).map(PathBuf::from);

    let flag = ExecuteFlag::new();
    let mut platform = DesktopPlatform;
    let mut selector = DirectorySelector::new(
        &config.paths.program_dir,
        &config.paths.program_extension,
        explicit,
    );
    let mut presenter = MonoTermDisplay::new(
        DEMO_RESOLUTION.0,
        DEMO_RESOLUTION.1,
        config.display.frame_limit,
    )?;
    let mut machine = ImageViewer::new();
    let mut input = TermInput::new(flag.clone());
    let mut sound = SoundCore::select(runtime.sound_enabled);

    let host = Host {
        platform: &mut platform,
        selector: &mut selector,
        presenter: &mut presenter,
        machine: &mut machine,
        input: &mut input,
        sound: &mut sound,
    };
    let mut lifecycle = Lifecycle::new(&runtime, host, ProcessClock::new(), flag);
    lifecycle.run()?;
    Ok(())
}
