use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rvncsession")]
#[command(about = "Drive a remote-display session controller from a host-event script")]
#[command(version)]
pub struct Args {
    /// Server URI (vnc://host[:port][?ConnectionName=..&ViewOnly=..])
    pub server: Option<String>,

    /// Server profile (TOML); takes precedence over SERVER
    #[arg(long, value_name = "FILE", env = "RVNCSESSION_PROFILE")]
    pub profile: Option<PathBuf>,

    /// Viewer preferences (TOML)
    #[arg(long, value_name = "FILE", env = "RVNCSESSION_PREFS")]
    pub prefs: Option<PathBuf>,

    /// Host-event script to replay (TOML)
    #[arg(long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Use in-memory HID and TV input services instead of none
    #[arg(long)]
    pub simulate_hardware: bool,

    /// Host supports picture-in-picture
    #[arg(long)]
    pub pip_supported: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
