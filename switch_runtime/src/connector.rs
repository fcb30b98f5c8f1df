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

//! How a session obtains its transport

use crate::config::{Credentials, SessionConfig};

use netconf::{SshTransport, Transport};

/// Opens a new transport to the switch. The session calls this for the initial connection, and
/// again whenever it finds its transport dead.
pub trait Connector {
    /// Transport returned by this connector
    type Transport: Transport;

    /// Perform a single connection attempt
    fn connect(
        &self,
        credentials: &Credentials,
        config: &SessionConfig,
    ) -> netconf::Result<Self::Transport>;
}

/// Connects with NETCONF over SSH, authenticated with the password.
#[derive(Debug, Clone, Copy, Default)]
pub struct SshConnector;

impl Connector for SshConnector {
    type Transport = SshTransport;

    fn connect(
        &self,
        credentials: &Credentials,
        config: &SessionConfig,
    ) -> netconf::Result<SshTransport> {
        SshTransport::dial(
            &credentials.host,
            config.port,
            &credentials.user,
            &credentials.password,
            config.rpc_timeout,
        )
    }
}
