//! Command handlers.
//!
//! Each command drives one [`PollingStateMachine`] and prints the views it
//! publishes. Commands that can leave the VPN starting or stopping keep
//! printing until the state settles or the user interrupts.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use vpn_toggle_control::{
    ClientConfig, HttpControlClient, MachineConfig, MachineView, Outcome, PollingStateMachine,
};
use vpn_toggle_core::Credentials;
use vpn_toggle_store::{MemoryStore, RocksStore, SnapshotStore};

use crate::ui;

/// Open the RocksDB store in `data_dir`, or an in-memory one.
pub fn open_store(data_dir: Option<&Path>) -> anyhow::Result<Arc<dyn SnapshotStore>> {
    match data_dir {
        Some(dir) => {
            let store = RocksStore::open(dir)
                .with_context(|| format!("Failed to open data directory {}", dir.display()))?;
            tracing::debug!(path = %dir.display(), "Opened store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::debug!("No data directory, using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Print the cached view.
pub fn show(store: &dyn SnapshotStore) {
    let view = MachineView::from_snapshot(store.load());
    println!("{}", ui::render_view(&view, chrono::Utc::now()));
}

/// Persist a new API key.
pub fn set_key(store: &dyn SnapshotStore, key: &str) -> anyhow::Result<()> {
    let key = key.trim();
    if key.is_empty() {
        bail!("API key must not be empty");
    }
    store.put_api_key(key).context("Failed to save API key")?;
    println!("API key saved");
    Ok(())
}

/// Pick the API key from the command line, falling back to the stored one.
fn resolve_credentials(
    flag: Option<String>,
    store: &dyn SnapshotStore,
) -> anyhow::Result<Credentials> {
    flag.filter(|key| !key.trim().is_empty())
        .or_else(|| store.load_api_key())
        .map(Credentials::new)
        .ok_or_else(|| anyhow!("No API key configured; pass --api-key or run `vpnctl set-key`"))
}

/// A connected state machine.
pub struct App {
    machine: PollingStateMachine,
}

impl App {
    /// Build the HTTP client and state machine.
    pub fn connect(
        endpoint: Option<&str>,
        api_key: Option<String>,
        store: Arc<dyn SnapshotStore>,
        poll_interval_ms: u64,
    ) -> anyhow::Result<Self> {
        let endpoint = endpoint.ok_or_else(|| {
            anyhow!("No endpoint configured; pass --endpoint or set VPN_TOGGLE_ENDPOINT")
        })?;
        let credentials = resolve_credentials(api_key, store.as_ref())?;

        let client = HttpControlClient::new(ClientConfig::new(endpoint), credentials)?;
        let config = MachineConfig::with_poll_interval(Duration::from_millis(poll_interval_ms));

        Ok(Self {
            machine: PollingStateMachine::new(Arc::new(client), store, config),
        })
    }

    /// `status`: one check, then follow any transition.
    pub async fn status(&self) -> anyhow::Result<()> {
        let outcome = self.machine.check_status().await;
        self.report(outcome)?;
        self.follow().await;
        Ok(())
    }

    /// `toggle`: flip the VPN and optionally follow the transition.
    pub async fn toggle(&self, wait: bool) -> anyhow::Result<()> {
        let before = self.machine.state();
        let outcome = self.machine.toggle().await;
        tracing::debug!(from = ?before, outcome = ?outcome, "Toggle finished");
        self.report(outcome)?;
        if wait {
            self.follow().await;
        }
        Ok(())
    }

    /// `refresh`: cancel polling and check once.
    pub async fn refresh(&self) -> anyhow::Result<()> {
        let outcome = self.machine.force_refresh().await;
        self.report(outcome)
    }

    /// Print the current view, turning a failed operation into an error.
    fn report(&self, outcome: Outcome) -> anyhow::Result<()> {
        let view = self.machine.view();
        println!("{}", ui::render_view(&view, chrono::Utc::now()));
        match outcome {
            Outcome::Completed => Ok(()),
            Outcome::Failed => Err(anyhow!(view
                .last_error
                .unwrap_or_else(|| "request failed".to_string()))),
            Outcome::Busy => bail!("Another request is already in flight"),
            Outcome::Discarded => bail!("Shut down before the response arrived"),
        }
    }

    /// Print state changes until the state is terminal.
    async fn follow(&self) {
        let mut rx = self.machine.subscribe();
        let mut last = rx.borrow_and_update().clone();
        if !last.state.is_transitional() {
            return;
        }

        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    println!("Interrupted");
                    break;
                }
            }

            let view = rx.borrow_and_update().clone();
            if ui::is_visible_change(&last, &view) {
                println!("{}", ui::render_update(&view, chrono::Utc::now()));
            }
            let settled = view.state.is_terminal() && !view.is_busy;
            last = view;
            if settled {
                break;
            }
        }
    }
}
