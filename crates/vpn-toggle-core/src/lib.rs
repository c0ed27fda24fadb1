//! Core types and utilities for vpn-toggle.
//!
//! This crate provides the foundational types shared by the store, the
//! control client and the polling state machine:
//!
//! - **State**: [`ResourceState`] and the [`Action`] used to change it
//! - **Identifiers**: [`InstanceId`] for the remote VPN instance
//! - **Snapshots**: the persisted [`StatusSnapshot`] and the [`Credentials`]
//!   used to authenticate against the control API
//! - **Message interpretation**: the rules in [`message`] that turn the
//!   server's free-text status messages into typed state
//!
//! # Example
//!
//! ```
//! use vpn_toggle_core::{message, ResourceState};
//!
//! let reading = message::interpret("Instance i-0abc123 is starting");
//! assert_eq!(reading.state, Some(ResourceState::Starting));
//! assert_eq!(reading.instance_id.unwrap().as_str(), "i-0abc123");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod message;
pub mod snapshot;
pub mod state;

pub use error::{CoreError, Result};
pub use ids::{IdError, InstanceId};
pub use message::Reading;
pub use snapshot::{Credentials, StatusSnapshot};
pub use state::{Action, ResourceState};
