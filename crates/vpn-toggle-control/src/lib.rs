//! Control client and status-polling state machine for vpn-toggle.
//!
//! This crate talks to the VPN control API and keeps a local view of the
//! remote instance in sync with it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Presentation (CLI, widgets)                 │
//! └─────────────────────────────────────────────────────────────┘
//!          │ toggle / check_status            ▲ watch<MachineView>
//!          ▼                                  │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PollingStateMachine                      │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │   Busy      │ │  Polling    │ │    Lifecycle        │    │
//! │  │   Guard     │ │  Loop       │ │    Transitions      │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                          │
//!                 ▼                          ▼
//!          ┌──────────────┐          ┌──────────────┐
//!          │ControlClient │          │ SnapshotStore│
//!          │   (HTTP)     │          │  (RocksDB)   │
//!          └──────────────┘          └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use vpn_toggle_control::{ClientConfig, HttpControlClient, PollingStateMachine};
//! use vpn_toggle_core::Credentials;
//! use vpn_toggle_store::RocksStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(RocksStore::open("/tmp/vpn-toggle")?);
//! let client = HttpControlClient::new(
//!     ClientConfig::new("https://vpn.example.com"),
//!     Credentials::new("my-api-key"),
//! )?;
//!
//! let machine = PollingStateMachine::with_defaults(Arc::new(client), store);
//! machine.check_status().await;
//! machine.toggle().await;
//!
//! let settled = machine.wait_until_terminal().await;
//! println!("VPN is {}", settled.state);
//! # Ok(())
//! # }
//! ```
//!
//! # State Machine
//!
//! - `Stopped` → toggle sends `start`
//! - `Starting`, `Running`, `Stopping` → toggle sends `stop`
//! - `Starting` and `Stopping` are polled every second until the server
//!   reports `Running` or `Stopped`
//!
//! See the [`lifecycle`] module for how responses move the state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod error;
pub mod lifecycle;
pub mod machine;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{ControlClient, HttpControlClient, API_KEY_HEADER};
pub use error::{ControlError, Result};
pub use machine::PollingStateMachine;
pub use types::{
    ClientConfig, ControlRequest, ControlResponse, MachineConfig, MachineView, Outcome,
    INITIAL_STATUS_MESSAGE, STATUS_UNKNOWN_MESSAGE,
};

// Re-export commonly used types from dependencies for convenience
pub use vpn_toggle_core::{Action, Credentials, InstanceId, ResourceState, StatusSnapshot};
pub use vpn_toggle_store::SnapshotStore;
