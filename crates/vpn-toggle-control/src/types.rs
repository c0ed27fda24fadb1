//! Request, response and configuration types for the control plane client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vpn_toggle_core::{Action, InstanceId, ResourceState, StatusSnapshot};

/// Status message shown before anything is known about the resource.
pub const INITIAL_STATUS_MESSAGE: &str = "Checking status...";

/// Status message shown when a status check fails.
pub const STATUS_UNKNOWN_MESSAGE: &str = "Unable to determine VPN status";

/// Body of `POST /vpn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequest {
    /// The requested action.
    pub action: Action,
}

/// Body of a successful control or status response.
///
/// Only `message` is required. Any other fields are kept verbatim so that a
/// structured contract can be adopted later without a wire change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlResponse {
    /// Free-text description of the resource state.
    pub message: String,
    /// Remaining JSON fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ControlResponse {
    /// Create a response carrying only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Configuration for the HTTP control client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the control API (e.g. "https://vpn.example.com").
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "ClientConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Connect timeout in seconds.
    #[serde(default = "ClientConfig::default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl ClientConfig {
    /// Create a configuration with default timeouts.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout_seconds: Self::default_request_timeout(),
            connect_timeout_seconds: Self::default_connect_timeout(),
        }
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    const fn default_connect_timeout() -> u64 {
        5
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Get the connect timeout as a `Duration`.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// Configuration for the polling state machine.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineConfig {
    /// Delay between status checks while the resource is transitional (ms).
    #[serde(default = "MachineConfig::default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl MachineConfig {
    const fn default_poll_interval() -> u64 {
        1000
    }

    /// Configuration with a custom polling interval.
    #[must_use]
    pub fn with_poll_interval(interval: Duration) -> Self {
        Self {
            poll_interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Get the polling interval as a `Duration`.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: Self::default_poll_interval(),
        }
    }
}

/// Immutable view of the state machine, as published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineView {
    /// Current resource state.
    pub state: ResourceState,
    /// Last reported instance id.
    pub instance_id: Option<InstanceId>,
    /// When the state was last observed.
    pub last_updated: Option<DateTime<Utc>>,
    /// Last status text, from the server or describing a failure.
    pub status_message: String,
    /// True while a control or status request is in flight.
    pub is_busy: bool,
    /// Human-readable description of the last failure, cleared on the next
    /// accepted operation.
    pub last_error: Option<String>,
}

impl MachineView {
    /// The view of a machine restored from a snapshot, or a fresh one.
    #[must_use]
    pub fn from_snapshot(snapshot: Option<StatusSnapshot>) -> Self {
        match snapshot {
            Some(snapshot) => Self {
                state: snapshot.state,
                instance_id: snapshot.instance_id,
                last_updated: Some(snapshot.observed_at),
                status_message: snapshot.message,
                is_busy: false,
                last_error: None,
            },
            None => Self::default(),
        }
    }

    /// The snapshot to persist for this view.
    #[must_use]
    pub fn to_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            state: self.state,
            instance_id: self.instance_id.clone(),
            observed_at: self.last_updated.unwrap_or_else(Utc::now),
            message: self.status_message.clone(),
        }
    }
}

impl Default for MachineView {
    fn default() -> Self {
        Self {
            state: ResourceState::Stopped,
            instance_id: None,
            last_updated: None,
            status_message: INITIAL_STATUS_MESSAGE.to_string(),
            is_busy: false,
            last_error: None,
        }
    }
}

/// Result of asking the state machine to perform an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The request succeeded and its response was applied.
    Completed,
    /// The request failed; the error is recorded in the view.
    Failed,
    /// Another request was in flight, so nothing was sent.
    Busy,
    /// The machine was shut down before the response arrived.
    Discarded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_request_body() {
        let json = serde_json::to_string(&ControlRequest {
            action: Action::Start,
        })
        .unwrap();
        assert_eq!(json, r#"{"action":"start"}"#);
    }

    #[test]
    fn response_keeps_extra_fields() {
        let response: ControlResponse =
            serde_json::from_str(r#"{"message":"VPN is running","state":"running"}"#).unwrap();
        assert_eq!(response.message, "VPN is running");
        assert_eq!(response.extra["state"], "running");
    }

    #[test]
    fn response_requires_message() {
        assert!(serde_json::from_str::<ControlResponse>(r#"{"status":"ok"}"#).is_err());
        assert!(serde_json::from_str::<ControlResponse>(r#"{"message":42}"#).is_err());
        assert!(serde_json::from_str::<ControlResponse>(r#"["message"]"#).is_err());
    }

    #[test]
    fn client_config_defaults() {
        let config = ClientConfig::new("https://vpn.example.com");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));

        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"https://vpn.example.com"}"#).unwrap();
        assert_eq!(config.request_timeout_seconds, 30);
    }

    #[test]
    fn machine_config_defaults() {
        let config = MachineConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));

        let config = MachineConfig::with_poll_interval(Duration::from_millis(250));
        assert_eq!(config.poll_interval_ms, 250);
    }

    #[test]
    fn fresh_view() {
        let view = MachineView::from_snapshot(None);
        assert_eq!(view.state, ResourceState::Stopped);
        assert_eq!(view.status_message, INITIAL_STATUS_MESSAGE);
        assert!(view.last_updated.is_none());
        assert!(!view.is_busy);
    }

    #[test]
    fn view_snapshot_roundtrip() {
        let snapshot = StatusSnapshot::now(
            ResourceState::Starting,
            Some(InstanceId::new("i-7").unwrap()),
            "Instance i-7 is starting",
        );
        let view = MachineView::from_snapshot(Some(snapshot.clone()));
        assert_eq!(view.state, ResourceState::Starting);
        assert_eq!(view.last_updated, Some(snapshot.observed_at));
        assert_eq!(view.to_snapshot(), snapshot);
    }
}
