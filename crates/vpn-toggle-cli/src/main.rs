//! vpnctl - toggle and watch the VPN instance from a terminal.
//!
//! This is the entry point for the `vpnctl` binary.

mod app;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use app::App;

/// vpnctl - toggle and watch the VPN instance.
#[derive(Parser, Debug)]
#[command(name = "vpnctl")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the control API.
    #[arg(long, env = "VPN_TOGGLE_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// API key; falls back to the key saved with `set-key`.
    #[arg(long, env = "VPN_TOGGLE_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Directory for the saved status and API key. Nothing is kept between
    /// runs when omitted.
    #[arg(long, env = "VPN_TOGGLE_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Delay between status checks while the VPN is starting or stopping.
    #[arg(long, default_value = "1000", global = true)]
    poll_interval_ms: u64,

    /// Enable debug logging.
    #[arg(long, default_value = "false", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the last known status without contacting the server.
    Show,
    /// Check the status once, following any transition to its end.
    Status,
    /// Start the VPN if it is stopped, otherwise stop it.
    Toggle {
        /// Return as soon as the request is accepted.
        #[arg(long)]
        no_wait: bool,
    },
    /// Cancel polling and check the status immediately.
    Refresh,
    /// Save the API key used by later runs.
    SetKey {
        /// The API key.
        key: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug {
        "info,vpn_toggle=debug,vpnctl=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = app::open_store(args.data_dir.as_deref())?;
    let connect = || {
        App::connect(
            args.endpoint.as_deref(),
            args.api_key.clone(),
            Arc::clone(&store),
            args.poll_interval_ms,
        )
    };

    match &args.command {
        Command::Show => {
            app::show(store.as_ref());
            Ok(())
        }
        Command::SetKey { key } => app::set_key(store.as_ref(), key),
        Command::Status => connect()?.status().await,
        Command::Toggle { no_wait } => connect()?.toggle(!no_wait).await,
        Command::Refresh => connect()?.refresh().await,
    }
}
