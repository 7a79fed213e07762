use color_eyre::{eyre::eyre, Result};
use padnav::controller::{GilrsSource, Polling, PollingManager, Suspended};
use padnav::dom::{MemoryDocument, Scene};
use padnav::NavigatorSettings;
use std::time::{Duration, Instant};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

enum Lifecycle {
    Polling(PollingManager<Polling>),
    Suspended(PollingManager<Suspended>),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup()?;

    if !padnav::install() {
        return Ok(());
    }

    let scene_path = std::env::args()
        .nth(1)
        .ok_or_else(|| eyre!("Usage: padnav <scene.toml>"))?;
    let scene = Scene::load(&scene_path).map_err(|e| eyre!("Failed to load scene: {}", e))?;
    let mut document = scene.build()?;
    info!("Scene {} ready", scene_path);

    let settings = NavigatorSettings::load_or_default();
    settings.validate()?;

    let mut source = GilrsSource::create().map_err(|e| eyre!("Failed to open gamepads: {}", e))?;
    let manager = PollingManager::create(settings).start();
    source.attach_connected(manager.registry());

    let mut lifecycle = Lifecycle::Polling(manager);
    let mut ticker = tokio::time::interval(FRAME_INTERVAL);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                lifecycle = run_frame(lifecycle, &mut source, &mut document);
            }
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    let _idle = match lifecycle {
        Lifecycle::Polling(manager) => manager.stop(),
        Lifecycle::Suspended(manager) => manager.stop(),
    };
    info!("Stopped");
    Ok(())
}

// Polls while a controller is tracked and idles otherwise.
fn run_frame(
    lifecycle: Lifecycle,
    source: &mut GilrsSource,
    document: &mut MemoryDocument,
) -> Lifecycle {
    match lifecycle {
        Lifecycle::Polling(mut manager) => {
            source.pump(manager.registry());
            if manager.registry().is_empty() {
                return Lifecycle::Suspended(manager.suspend());
            }
            let frame = manager.poll_frame(document, Instant::now());
            if frame.report != Default::default() {
                debug!("Frame {}: {:?}", manager.frames(), frame.report);
            }
            for event in document.take_events() {
                info!("{:?}", event);
            }
            Lifecycle::Polling(manager)
        }
        Lifecycle::Suspended(manager) => {
            source.pump(manager.registry());
            if manager.registry().is_empty() {
                Lifecycle::Suspended(manager)
            } else {
                Lifecycle::Polling(manager.resume())
            }
        }
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
