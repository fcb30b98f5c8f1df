// Switch Runtime: NETCONF Automation for Lab Switches
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Switch Runtime
//!
//! This crate keeps a NETCONF session to a Juniper switch alive, and offers the configuration
//! primitives that are needed to prepare the switch for a test: enable or disable interfaces,
//! build aggregates, put VLANs on trunk ports, and save and restore the configuration of the
//! interfaces that a test modifies. For simplified usage, check [`SwitchSession::connect_ssh`].
//!
//! ```no_run
//! use switch_runtime::{ConfigSnapshot, Credentials, SessionConfig, SwitchSession};
//!
//! fn main() -> Result<(), switch_runtime::Error> {
//!     let credentials = Credentials::new("switch1", "admin", "secret");
//!     let mut session = SwitchSession::connect_ssh(credentials, SessionConfig::default())?;
//!
//!     // save the interfaces, break them, and put them back
//!     let mut snapshot = ConfigSnapshot::new();
//!     let interfaces = ["ge-0/0/1", "ge-0/0/2"];
//!     session.dump_interface_configs(&interfaces, &mut snapshot)?;
//!     session.delete_interfaces_configuration(&interfaces)?;
//!     session.set_vlan_on_trunk_interface(100, "ge-0/0/1")?;
//!     session.restore_interfaces_configuration(&interfaces, &mut snapshot)?;
//!
//!     session.close()
//! }
//! ```

#![deny(missing_docs, missing_debug_implementations)]

pub mod commands;
pub mod config;
pub mod connector;
pub mod session;
pub mod snapshot;
pub mod status;
mod test;

pub use commands::InterfaceAction;
pub use config::{Credentials, SessionConfig};
pub use connector::{Connector, SshConnector};
pub use session::SwitchSession;
pub use snapshot::{ConfigSnapshot, SavedInterfaceConfig};

use thiserror::Error;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// The connection could not be established. Contains the last error of the transport.
    #[error("Cannot connect to {host}: {source}")]
    ConnectFailed {
        /// Host that was dialed
        host: String,
        /// Last error of the transport
        #[source]
        source: netconf::Error,
    },
    /// Connecting was stopped with the [`Stopper`]
    #[error("Connecting to the switch was aborted")]
    Aborted,
    /// The RPC exchange itself failed
    #[error("NETCONF Error: {0}")]
    TransportError(#[from] netconf::Error),
    /// The switch answered with an error
    #[error("Switch reported an error: {0}")]
    DeviceReportedError(String),
    /// The switch answered with an empty reply; the command was rejected or not understood.
    #[error("Switch returned an empty response to: {0}")]
    EmptyResponse(String),
    /// Interface action is neither `set` nor `delete`
    #[error("Unknown interface action: {0} (expected `set` or `delete`)")]
    UnknownAction(String),
    /// Cannot deserialize the output of an operational command
    #[error("Cannot parse JSON response: {0}")]
    JsonError(#[from] serde_json::Error),
    /// The output of an operational command does not have the expected structure
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Result type of this crate
pub type Result<T> = core::result::Result<T, Error>;

/// Stopper, to abort a connection attempt from a different thread
#[derive(Clone, Debug, Default)]
pub struct Stopper {
    b: Arc<AtomicBool>,
}

impl Stopper {
    /// Create a new stopper
    pub fn new() -> Self {
        Self::default()
    }

    /// Send the stop command.
    pub fn send_stop(&self) {
        self.b.store(true, Ordering::SeqCst);
    }

    /// Checks if the stop flag is set.
    pub fn is_stop(&self) -> bool {
        self.b.load(Ordering::SeqCst)
    }
}
