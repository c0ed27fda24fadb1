//! Persisted status snapshots and API credentials.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::InstanceId;
use crate::state::ResourceState;

/// The last observed truth about the remote resource.
///
/// Snapshots are never mutated; a newer observation replaces the stored one
/// wholesale. The JSON layout (`state`, `resourceId`, `lastUpdated`,
/// `message`) is shared with previously persisted data and must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Resource state at observation time.
    pub state: ResourceState,
    /// Instance id, if one has been reported.
    #[serde(
        rename = "resourceId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub instance_id: Option<InstanceId>,
    /// When the observation was made.
    #[serde(rename = "lastUpdated")]
    pub observed_at: DateTime<Utc>,
    /// The server's message, or a local description of the last outcome.
    pub message: String,
}

impl StatusSnapshot {
    /// Create a snapshot observed now.
    #[must_use]
    pub fn now(
        state: ResourceState,
        instance_id: Option<InstanceId>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            state,
            instance_id,
            observed_at: Utc::now(),
            message: message.into(),
        }
    }
}

/// API credentials for the control endpoint.
///
/// The key is only ever handed to the HTTP layer; `Debug` output is redacted
/// so credentials cannot leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    /// Wrap an API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// The raw API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns true if no key has been configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.api_key.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> StatusSnapshot {
        StatusSnapshot {
            state: ResourceState::Starting,
            instance_id: Some(InstanceId::new("i-123").unwrap()),
            observed_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            message: "Instance i-123 is starting".to_string(),
        }
    }

    #[test]
    fn snapshot_json_layout() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["state"], "starting");
        assert_eq!(value["resourceId"], "i-123");
        assert_eq!(value["lastUpdated"], "2024-05-01T12:30:00Z");
        assert_eq!(value["message"], "Instance i-123 is starting");
    }

    #[test]
    fn snapshot_without_instance_omits_field() {
        let snapshot = StatusSnapshot {
            instance_id: None,
            ..sample()
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(!json.contains("resourceId"));

        let back: StatusSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn snapshot_decodes_persisted_form() {
        let json = r#"{"state":"running","resourceId":"i-9","lastUpdated":"2024-05-01T12:30:00Z","message":"Instance i-9 is running"}"#;
        let snapshot: StatusSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.state, ResourceState::Running);
        assert_eq!(snapshot.instance_id.unwrap().as_str(), "i-9");
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let creds = Credentials::new("super-secret");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("redacted"));
        assert_eq!(creds.api_key(), "super-secret");
        assert!(!creds.is_empty());
        assert!(Credentials::new("").is_empty());
    }
}
