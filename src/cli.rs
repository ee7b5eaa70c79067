use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jobnet")]
#[command(about = "Distribute jobs to workers over a command and broadcast API")]
#[command(version)]
pub struct Args {
    /// Path to a JSON file holding the configuration mapping served by
    /// `get configuration` (default: empty mapping)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Bind address for the server
    #[arg(long, default_value = "0.0.0.0")]
    pub bind_addr: String,

    /// Port to listen on
    #[arg(short, long, default_value = "5555")]
    pub port: u16,

    /// Path to a .env file loaded before startup
    #[arg(long, value_name = "FILE")]
    pub env_file: Option<PathBuf>,
}
