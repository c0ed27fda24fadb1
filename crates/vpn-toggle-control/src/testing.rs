//! Scripted control client for tests.
//!
//! Replies are queued up front and handed out in order. Status requests can
//! be gated on a [`Notify`] to hold a request in flight.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use vpn_toggle_core::{Action, Credentials};

use crate::client::ControlClient;
use crate::error::{ControlError, Result};
use crate::types::ControlResponse;

#[derive(Default)]
struct Script {
    status_replies: Mutex<VecDeque<Result<ControlResponse>>>,
    control_replies: Mutex<VecDeque<Result<ControlResponse>>>,
    fallback_status: Mutex<Option<String>>,
    status_gate: Mutex<Option<Arc<Notify>>>,
    status_calls: AtomicUsize,
    actions: Mutex<Vec<Action>>,
    api_keys: Mutex<Vec<String>>,
}

/// A `ControlClient` that replays queued responses.
///
/// Clones share the same script and counters, including clients handed out
/// by [`reconfigure`](ControlClient::reconfigure).
#[derive(Clone, Default)]
pub struct ScriptedClient {
    script: Arc<Script>,
}

impl ScriptedClient {
    /// Create a client with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful status reply.
    pub fn push_status(&self, message: &str) -> &Self {
        self.script
            .status_replies
            .lock()
            .push_back(Ok(ControlResponse::new(message)));
        self
    }

    /// Queue a failed status reply.
    pub fn push_status_error(&self, error: ControlError) -> &Self {
        self.script.status_replies.lock().push_back(Err(error));
        self
    }

    /// Reply with `message` whenever the status queue is empty.
    pub fn set_fallback_status(&self, message: &str) -> &Self {
        *self.script.fallback_status.lock() = Some(message.to_string());
        self
    }

    /// Queue a successful control reply.
    pub fn push_control(&self, message: &str) -> &Self {
        self.script
            .control_replies
            .lock()
            .push_back(Ok(ControlResponse::new(message)));
        self
    }

    /// Queue a failed control reply.
    pub fn push_control_error(&self, error: ControlError) -> &Self {
        self.script.control_replies.lock().push_back(Err(error));
        self
    }

    /// Make every status request wait for a notification before replying.
    #[must_use]
    pub fn gate_status(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.script.status_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    /// Number of status requests received so far.
    #[must_use]
    pub fn status_calls(&self) -> usize {
        self.script.status_calls.load(Ordering::SeqCst)
    }

    /// Actions received by `control`, in order.
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        self.script.actions.lock().clone()
    }

    /// API keys passed to `reconfigure`, in order.
    #[must_use]
    pub fn api_keys(&self) -> Vec<String> {
        self.script.api_keys.lock().clone()
    }
}

#[async_trait]
impl ControlClient for ScriptedClient {
    async fn control(&self, action: Action) -> Result<ControlResponse> {
        self.script.actions.lock().push(action);
        self.script
            .control_replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ControlError::MalformedResponse("no scripted control reply".into())))
    }

    async fn status(&self) -> Result<ControlResponse> {
        self.script.status_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.script.status_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let queued = self.script.status_replies.lock().pop_front();
        match queued {
            Some(reply) => reply,
            None => match self.script.fallback_status.lock().clone() {
                Some(message) => Ok(ControlResponse::new(message)),
                None => Err(ControlError::MalformedResponse(
                    "no scripted status reply".into(),
                )),
            },
        }
    }

    fn reconfigure(&self, credentials: Credentials) -> Result<Arc<dyn ControlClient>> {
        self.script
            .api_keys
            .lock()
            .push(credentials.api_key().to_string());
        Ok(Arc::new(self.clone()))
    }
}
