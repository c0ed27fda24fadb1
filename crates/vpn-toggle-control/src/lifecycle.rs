//! Transition rules of the polling state machine.
//!
//! These functions are pure: they take the current [`MachineView`] and the
//! outcome of one request and update the view in place. The
//! [`machine`](crate::machine) module owns scheduling, locking and
//! persistence around them.
//!
//! ```text
//!  response ──▶ message ──▶ classify ──▶ state (unchanged if no keyword)
//!                      └──▶ extract  ──▶ instance id (unchanged if absent)
//!
//!  failure  ──▶ last_error = error text
//!                status_message = "Unable to determine VPN status" (status only)
//! ```

use chrono::{DateTime, Utc};
use vpn_toggle_core::{message, ResourceState};

use crate::error::ControlError;
use crate::types::{ControlResponse, MachineView, STATUS_UNKNOWN_MESSAGE};

/// What a successful response did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State before the response was applied.
    pub from: ResourceState,
    /// State after the response was applied.
    pub to: ResourceState,
}

impl Transition {
    /// Returns true if the state changed.
    #[must_use]
    pub fn changed(self) -> bool {
        self.from != self.to
    }

    /// Returns true if polling must be active after this transition.
    #[must_use]
    pub const fn needs_polling(self) -> bool {
        self.to.is_transitional()
    }
}

/// Which request produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// A start/stop request.
    Control,
    /// A status query.
    Status,
}

/// Apply a successful response to the view.
///
/// The state follows the keyword rule, the instance id is only overwritten
/// when the message names one, and the message and timestamp are always
/// refreshed.
pub fn apply_response(
    view: &mut MachineView,
    response: &ControlResponse,
    observed_at: DateTime<Utc>,
) -> Transition {
    let from = view.state;
    let reading = message::interpret(&response.message);

    if let Some(state) = reading.state {
        view.state = state;
    }
    if let Some(instance_id) = reading.instance_id {
        view.instance_id = Some(instance_id);
    }
    view.status_message.clone_from(&response.message);
    view.last_updated = Some(observed_at);

    Transition {
        from,
        to: view.state,
    }
}

/// Record a failed request in the view without touching the state.
pub fn apply_failure(view: &mut MachineView, request: Request, error: &ControlError) {
    view.last_error = Some(error.to_string());
    if request == Request::Status {
        view.status_message = STATUS_UNKNOWN_MESSAGE.to_string();
    }
}
