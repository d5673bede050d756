use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use passthrough_hal::mock::{MockHidService, MockTvInputService};
use passthrough_hal::{
    BridgeError, HidPassthroughBridge, HidService, VideoInput, VideoPassthroughSwitch,
};
use rfb_session::ServerProfile;
use rvncsession::adapters::{console_services, ConsoleSurface, LoopbackTransport};
use rvncsession::args::Args;
use rvncsession::script::Script;
use rvncsession::{Hardware, LaunchParams, SessionController, ViewerPrefs};
use tracing::{info, warn};

/// Controller timer resolution.
const TICK: Duration = Duration::from_millis(20);

fn init_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "rvncsession={log_level},passthrough_hal=info,platform_input=info,rfb_session=info,rfb_display=info"
                )
                .into()
            }),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {e}"))?;

    Ok(())
}

fn default_prefs_path() -> Option<PathBuf> {
    directories::UserDirs::new().map(|dirs| dirs.home_dir().join(".config/rvncsession/prefs.toml"))
}

fn load_prefs(args: &Args) -> ViewerPrefs {
    let path = match args.prefs.clone().or_else(default_prefs_path) {
        Some(path) if args.prefs.is_some() || path.exists() => path,
        _ => return ViewerPrefs::default(),
    };
    ViewerPrefs::load(&path).unwrap_or_else(|e| {
        warn!("Failed to load preferences from {}: {}", path.display(), e);
        ViewerPrefs::default()
    })
}

fn load_profile_file(args: &Args) -> Option<ServerProfile> {
    let path = args.profile.as_ref()?;
    match ServerProfile::load(path) {
        Ok(profile) => Some(profile),
        Err(e) => {
            warn!("Failed to load profile from {}: {}", path.display(), e);
            None
        }
    }
}

fn hardware(simulate: bool) -> Hardware {
    if !simulate {
        return Hardware::unavailable();
    }
    info!("Using simulated HID and TV input services");
    let hid = MockHidService::new();
    let tv = MockTvInputService::with_inputs(vec![VideoInput::passthrough("hdmi1")]);
    Hardware {
        bridge: HidPassthroughBridge::new(move || -> Result<Box<dyn HidService>, BridgeError> {
            Ok(Box::new(hid.clone()))
        }),
        video: VideoPassthroughSwitch::new(Box::new(tv)),
    }
}

/// Replay the script one step per tick, pumping transport events and timers
/// in between.
async fn run(controller: &mut SessionController, script: Script) {
    let events = controller.state_sender();
    let mut ticker = tokio::time::interval(TICK);
    let mut steps = script.steps.into_iter();
    let mut paused_until: Option<Instant> = None;

    loop {
        ticker.tick().await;
        let now = Instant::now();
        controller.pump();
        controller.on_tick(now);
        if controller.is_terminated() {
            break;
        }
        if paused_until.is_some_and(|until| now < until) {
            continue;
        }
        paused_until = None;

        let Some(step) = steps.next() else { break };
        if let Some(wait) = step.apply(controller, &events) {
            paused_until = Some(now + wait);
        }
    }
    controller.pump();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging first
    init_logging(args.verbose)?;

    info!("Starting rvncsession {}", env!("CARGO_PKG_VERSION"));

    let prefs = load_prefs(&args);
    let params = LaunchParams {
        profile: load_profile_file(&args),
        uri: args.server.clone(),
    };
    let script = match &args.script {
        Some(path) => Script::load(path)
            .with_context(|| format!("Failed to load script {}", path.display()))?,
        None => Script::default(),
    };

    let mut controller = SessionController::new(
        &params,
        prefs,
        Box::new(LoopbackTransport),
        console_services(args.pip_supported),
        hardware(args.simulate_hardware),
    );
    controller.attach_surface(Box::new(ConsoleSurface));

    run(&mut controller, script).await;

    controller.on_terminate();
    info!("Session ended in state {}", controller.state());
    Ok(())
}
