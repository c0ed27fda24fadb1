//! Interpretation of the control API's free-text status messages.
//!
//! The server reports state only inside a human-readable `message`, e.g.
//! `"Instance i-0abc123 is starting"`. Two rules turn that text into typed
//! data:
//!
//! 1. **State**: the first keyword found, checked in the fixed priority order
//!    `running`, `stopped`, `starting`, `stopping`. Matching is plain,
//!    case-sensitive substring containment.
//! 2. **Instance id**: the text after the last `"Instance "` marker, up to the
//!    next `" is"`. No id is produced when either marker is missing.
//!
//! These rules are observable behavior and must not be "improved" here. If the
//! server ever returns structured `state`/`instanceId` fields, a new reader
//! should replace this module instead.

use crate::ids::InstanceId;
use crate::state::ResourceState;

/// Keywords in the order they are checked. First match wins.
const STATE_KEYWORDS: [(&str, ResourceState); 4] = [
    ("running", ResourceState::Running),
    ("stopped", ResourceState::Stopped),
    ("starting", ResourceState::Starting),
    ("stopping", ResourceState::Stopping),
];

const INSTANCE_MARKER: &str = "Instance ";
const INSTANCE_TERMINATOR: &str = " is";

/// What a single status message says about the resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reading {
    /// State named by the message, if any keyword matched.
    pub state: Option<ResourceState>,
    /// Instance id embedded in the message, if both markers were present.
    pub instance_id: Option<InstanceId>,
}

/// Apply both interpretation rules to a message.
#[must_use]
pub fn interpret(message: &str) -> Reading {
    Reading {
        state: classify(message),
        instance_id: extract_instance_id(message),
    }
}

/// Classify a message by keyword containment.
#[must_use]
pub fn classify(message: &str) -> Option<ResourceState> {
    STATE_KEYWORDS
        .iter()
        .find(|(keyword, _)| message.contains(keyword))
        .map(|&(_, state)| state)
}

/// Extract the instance id delimited by `"Instance "` and `" is"`.
#[must_use]
pub fn extract_instance_id(message: &str) -> Option<InstanceId> {
    let start = message.rfind(INSTANCE_MARKER)? + INSTANCE_MARKER.len();
    let rest = &message[start..];
    let end = rest.find(INSTANCE_TERMINATOR)?;
    InstanceId::new(&rest[..end]).ok()
}
