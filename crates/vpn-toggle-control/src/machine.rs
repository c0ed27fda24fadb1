//! The status-polling state machine.
//!
//! [`PollingStateMachine`] owns the local view of the remote instance. It
//! turns control and status responses into transitions (see
//! [`lifecycle`](crate::lifecycle)), persists every observation, and keeps a
//! polling loop alive exactly while the instance is in a transitional state.
//!
//! # Concurrency
//!
//! - At most one request is in flight at a time. The busy flag is acquired
//!   with a test-and-set on the published view and released by a guard, so a
//!   dropped operation future cannot leave the machine busy.
//! - At most one polling loop exists. Starting a loop cancels the previous
//!   one first; loops check their cancellation token between the sleep and
//!   the next request.
//! - Dropping the machine cancels the root token. Requests already in flight
//!   finish, but their results are discarded.
//!
//! # Observing
//!
//! Presentation code subscribes with [`PollingStateMachine::subscribe`] and
//! receives immutable [`MachineView`] values; it never mutates machine state
//! directly.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use vpn_toggle_core::{Credentials, ResourceState};
use vpn_toggle_store::SnapshotStore;

use crate::client::ControlClient;
use crate::error::{ControlError, Result};
use crate::lifecycle::{self, Request, Transition};
use crate::types::{ControlResponse, MachineConfig, MachineView, Outcome};

/// The polling state machine.
///
/// Operations take `&self`; share the machine behind an `Arc` when several
/// tasks need to drive it.
pub struct PollingStateMachine {
    inner: Arc<Inner>,
}

struct Inner {
    client: RwLock<Arc<dyn ControlClient>>,
    store: Arc<dyn SnapshotStore>,
    config: MachineConfig,
    view: watch::Sender<MachineView>,
    polling: Mutex<Option<PollHandle>>,
    shutdown: CancellationToken,
}

/// Handle to the running polling loop.
struct PollHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    fn is_active(&self) -> bool {
        !self.token.is_cancelled() && !self.task.is_finished()
    }
}

/// Clears the busy flag when dropped.
struct BusyGuard<'a> {
    view: &'a watch::Sender<MachineView>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.view.send_modify(|view| view.is_busy = false);
    }
}

impl PollingStateMachine {
    /// Create a state machine, restoring the last snapshot from `store`.
    ///
    /// No request is sent; call [`check_status`](Self::check_status) to
    /// synchronize with the server.
    #[must_use]
    pub fn new(
        client: Arc<dyn ControlClient>,
        store: Arc<dyn SnapshotStore>,
        config: MachineConfig,
    ) -> Self {
        let restored = store.load();
        match &restored {
            Some(snapshot) => tracing::debug!(
                state = ?snapshot.state,
                observed_at = %snapshot.observed_at,
                "Restored last known status"
            ),
            None => tracing::debug!("No saved status, starting as stopped"),
        }

        let (view, _) = watch::channel(MachineView::from_snapshot(restored));

        Self {
            inner: Arc::new(Inner {
                client: RwLock::new(client),
                store,
                config,
                view,
                polling: Mutex::new(None),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Create with default configuration.
    #[must_use]
    pub fn with_defaults(client: Arc<dyn ControlClient>, store: Arc<dyn SnapshotStore>) -> Self {
        Self::new(client, store, MachineConfig::default())
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &MachineConfig {
        &self.inner.config
    }

    /// The current view.
    #[must_use]
    pub fn view(&self) -> MachineView {
        self.inner.view.borrow().clone()
    }

    /// The current resource state.
    #[must_use]
    pub fn state(&self) -> ResourceState {
        self.inner.state()
    }

    /// Subscribe to view changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<MachineView> {
        self.inner.view.subscribe()
    }

    /// Returns true while a polling loop is alive.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.inner
            .polling
            .lock()
            .as_ref()
            .is_some_and(PollHandle::is_active)
    }

    /// Start the instance if it is stopped, otherwise stop it.
    ///
    /// On success the response is applied and persisted, and polling runs if
    /// and only if the new state is transitional. On failure the error is recorded and the
    /// state is left as it was. Returns [`Outcome::Busy`] without sending
    /// anything if another request is in flight.
    pub async fn toggle(&self) -> Outcome {
        self.inner.toggle().await
    }

    /// Query the server once and enforce the polling invariant.
    ///
    /// Does nothing and returns [`Outcome::Busy`] if another request is in
    /// flight. After a successful check, polling is started if the state is
    /// transitional and stopped if it is terminal. A failed check keeps the
    /// state and any running loop.
    pub async fn check_status(&self) -> Outcome {
        self.inner.check_status().await
    }

    /// Cancel polling, then check the status immediately.
    ///
    /// Returns [`Outcome::Busy`] and leaves any running loop alone if another
    /// request is in flight. Otherwise polling is cancelled, the status is
    /// checked, and polling resumes if the state is still transitional.
    pub async fn force_refresh(&self) -> Outcome {
        self.inner.force_refresh().await
    }

    /// Swap in a client built with new credentials.
    ///
    /// Requests already in flight finish with the old client; every request
    /// issued after this returns uses the new one.
    ///
    /// # Errors
    ///
    /// Returns an error if the current client cannot be reconfigured; the old
    /// client stays in place in that case.
    pub fn update_credentials(&self, credentials: Credentials) -> Result<()> {
        let next = self.inner.client().reconfigure(credentials)?;
        self.replace_client(next);
        tracing::info!("Control client credentials updated");
        Ok(())
    }

    /// Replace the control client.
    pub fn replace_client(&self, client: Arc<dyn ControlClient>) {
        *self.inner.client.write() = client;
    }

    /// Wait until the state is terminal and return that view.
    ///
    /// Returns immediately if the state is already terminal. A transitional
    /// state with no polling loop (e.g. one restored from a snapshot) starts
    /// one. This does not time out on its own; a server that never settles
    /// keeps it pending.
    pub async fn wait_until_terminal(&self) -> MachineView {
        if self.state().is_transitional() && !self.is_polling() {
            self.inner.start_polling();
        }

        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(|view| view.state.is_terminal())
            .await
            .map(|view| view.clone());
        settled.unwrap_or_else(|_| self.view())
    }
}

impl Drop for PollingStateMachine {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
    }
}

impl std::fmt::Debug for PollingStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingStateMachine")
            .field("view", &*self.inner.view.borrow())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn client(&self) -> Arc<dyn ControlClient> {
        Arc::clone(&self.client.read())
    }

    fn state(&self) -> ResourceState {
        self.view.borrow().state
    }

    fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Mark the machine busy unless it already is.
    fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        let acquired = self.view.send_if_modified(|view| {
            if view.is_busy {
                return false;
            }
            view.is_busy = true;
            view.last_error = None;
            true
        });
        acquired.then_some(BusyGuard { view: &self.view })
    }

    async fn toggle(self: &Arc<Self>) -> Outcome {
        let Some(_busy) = self.try_acquire() else {
            tracing::debug!("Toggle ignored, a request is already in flight");
            return Outcome::Busy;
        };

        let action = self.state().toggle_action();
        tracing::info!(action = %action, "Toggling VPN");

        let result = self.client().control(action).await;
        if self.is_shut_down() {
            return Outcome::Discarded;
        }

        match result {
            Ok(response) => {
                self.apply_response(&response);
                self.sync_polling();
                Outcome::Completed
            }
            Err(e) => {
                tracing::warn!(
                    action = %action,
                    error = %e,
                    http_status = ?e.http_status(),
                    "Control request failed"
                );
                self.apply_failure(Request::Control, &e);
                Outcome::Failed
            }
        }
    }

    async fn check_status(self: &Arc<Self>) -> Outcome {
        let outcome = self.refresh().await;
        if outcome == Outcome::Completed {
            self.sync_polling();
        }
        outcome
    }

    async fn force_refresh(self: &Arc<Self>) -> Outcome {
        let Some(busy) = self.try_acquire() else {
            tracing::debug!("Refresh skipped, a request is already in flight");
            return Outcome::Busy;
        };

        self.stop_polling();
        let outcome = self.query_status().await;
        drop(busy);

        if outcome != Outcome::Discarded {
            self.sync_polling();
        }
        outcome
    }

    /// One status request, without touching the polling lifecycle.
    async fn refresh(&self) -> Outcome {
        let Some(_busy) = self.try_acquire() else {
            tracing::debug!("Status check skipped, a request is already in flight");
            return Outcome::Busy;
        };

        self.query_status().await
    }

    /// Send a status request and apply the result. The caller holds busy.
    async fn query_status(&self) -> Outcome {
        let result = self.client().status().await;
        if self.is_shut_down() {
            return Outcome::Discarded;
        }

        match result {
            Ok(response) => {
                self.apply_response(&response);
                Outcome::Completed
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    http_status = ?e.http_status(),
                    retriable = e.is_retriable(),
                    "Status check failed"
                );
                self.apply_failure(Request::Status, &e);
                Outcome::Failed
            }
        }
    }

    /// Apply a response, publish it and persist the resulting snapshot.
    fn apply_response(&self, response: &ControlResponse) -> Transition {
        let mut transition = None;
        self.view.send_modify(|view| {
            transition = Some(lifecycle::apply_response(view, response, Utc::now()));
        });
        let snapshot = self.view.borrow().to_snapshot();
        self.store.save(&snapshot);

        let transition = transition.unwrap_or(Transition {
            from: snapshot.state,
            to: snapshot.state,
        });
        if transition.changed() {
            tracing::info!(from = ?transition.from, to = ?transition.to, "VPN state changed");
        }
        transition
    }

    fn apply_failure(&self, request: Request, error: &ControlError) {
        self.view
            .send_modify(|view| lifecycle::apply_failure(view, request, error));
    }

    /// Poll while the state is transitional, and only then.
    fn sync_polling(self: &Arc<Self>) {
        if self.state().is_transitional() {
            self.start_polling();
        } else {
            self.stop_polling();
        }
    }

    /// Cancel any polling loop and start a new one.
    fn start_polling(self: &Arc<Self>) {
        let mut slot = self.polling.lock();
        if let Some(previous) = slot.take() {
            previous.token.cancel();
        }
        if self.is_shut_down() {
            return;
        }

        let token = self.shutdown.child_token();
        let inner = Arc::clone(self);
        let task = tokio::spawn(inner.poll_loop(token.clone()));
        *slot = Some(PollHandle { token, task });
    }

    fn stop_polling(&self) {
        if let Some(handle) = self.polling.lock().take() {
            handle.token.cancel();
            tracing::debug!("Polling stopped");
        }
    }

    async fn poll_loop(self: Arc<Self>, token: CancellationToken) {
        let interval = self.config.poll_interval();
        tracing::debug!(interval_ms = self.config.poll_interval_ms, "Polling started");

        loop {
            if token.is_cancelled() || self.state().is_terminal() {
                break;
            }

            tokio::select! {
                biased;
                () = token.cancelled() => break,
                () = tokio::time::sleep(interval) => {}
            }
            if self.state().is_terminal() {
                break;
            }

            match self.refresh().await {
                Outcome::Discarded => break,
                outcome => tracing::trace!(?outcome, state = ?self.state(), "Poll tick"),
            }
        }

        tracing::debug!(state = ?self.state(), cancelled = token.is_cancelled(), "Polling finished");
    }
}
