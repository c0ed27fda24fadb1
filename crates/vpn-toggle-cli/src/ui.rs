//! Text rendering for machine views.

use chrono::{DateTime, Utc};
use vpn_toggle_control::MachineView;

/// Render the full status block.
pub fn render_view(view: &MachineView, now: DateTime<Utc>) -> String {
    let mut lines = vec![format!("VPN:          {}", view.state.display_text())];

    if let Some(instance_id) = &view.instance_id {
        lines.push(format!("Instance:     {instance_id}"));
    }
    lines.push(format!("Status:       {}", view.status_message));
    if let Some(updated) = view.last_updated {
        lines.push(format!("Last updated: {}", relative_time(updated, now)));
    }
    if let Some(error) = &view.last_error {
        lines.push(format!("Error:        {error}"));
    }

    lines.join("\n")
}

/// Render a one-line progress update.
pub fn render_update(view: &MachineView, now: DateTime<Utc>) -> String {
    let mut line = format!("[{}] {}", view.state.display_text(), view.status_message);
    if let Some(error) = &view.last_error {
        line.push_str(&format!(" ({error})"));
    }
    if let Some(updated) = view.last_updated {
        line.push_str(&format!(" - {}", relative_time(updated, now)));
    }
    line
}

/// Returns true if a change is worth printing.
///
/// Busy-flag flips and timestamp refreshes alone are not.
pub fn is_visible_change(before: &MachineView, after: &MachineView) -> bool {
    before.state != after.state
        || before.instance_id != after.instance_id
        || before.status_message != after.status_message
        || before.last_error != after.last_error
}

/// Describe `then` relative to `now`, e.g. "5 minutes ago".
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 0 {
        return "in the future".to_string();
    }
    if seconds < 10 {
        return "just now".to_string();
    }

    let (amount, unit) = match seconds {
        s if s < 60 => (s, "second"),
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s => (s / 86_400, "day"),
    };
    if amount == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{amount} {unit}s ago")
    }
}
