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

//! Session to a Juniper switch

use crate::commands::{self, InterfaceAction};
use crate::config::{Credentials, SessionConfig};
use crate::connector::{Connector, SshConnector};
use crate::snapshot::ConfigSnapshot;
use crate::{status, Error, Result, Stopper};

use log::*;
use netconf::{Reply, Rpc, Transport};

use std::fmt;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// Upper bound of a single sleep in the connect loop, so that the stopper is checked regularly.
const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// # Session to a Juniper switch
///
/// This struct keeps a NETCONF session to the switch, and re-establishes it when it was lost. It
/// can be used to run operational commands, to load and commit configuration, and to save and
/// restore the configuration of interfaces.
///
/// Before every operation, the session checks that the switch still answers, by requesting the
/// chassis inventory. If the switch does not answer (or the answer is empty), the session
/// reconnects exactly once using the stored credentials. If this fails, the operation returns
/// [`Error::ConnectFailed`]. Set [`SessionConfig::liveness_ttl`] to skip the probe when the last
/// successful exchange is recent enough. Apart from the initial connection, nothing is retried.
///
/// All commands are synchronous and blocking. Every method takes `&mut self`, so a session can be
/// moved to a different thread, but never be used by two threads at the same time.
pub struct SwitchSession<C: Connector = SshConnector> {
    connector: C,
    credentials: Credentials,
    config: SessionConfig,
    stopper: Stopper,
    transport: Option<C::Transport>,
    last_alive: Option<Instant>,
}

impl<C: Connector> fmt::Debug for SwitchSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SwitchSession({}@{}, {})",
            self.credentials.user,
            self.credentials.host,
            if self.transport.is_some() { "connected" } else { "disconnected" }
        )
    }
}

impl SwitchSession<SshConnector> {
    /// Connect to the switch using NETCONF over SSH.
    pub fn connect_ssh(credentials: Credentials, config: SessionConfig) -> Result<Self> {
        Self::connect(credentials, config, SshConnector, Stopper::new())
    }
}

impl<C: Connector> SwitchSession<C> {
    /// Connect to the switch. Failed attempts are repeated every `config.poll_interval`, until
    /// `config.connect_timeout` has passed. Then, the last error is returned as
    /// [`Error::ConnectFailed`]. If the stopper is triggered in the meantime, [`Error::Aborted`]
    /// is returned.
    pub fn connect(
        credentials: Credentials,
        config: SessionConfig,
        connector: C,
        stopper: Stopper,
    ) -> Result<Self> {
        let mut session =
            Self { connector, credentials, config, stopper, transport: None, last_alive: None };
        session.connect_with_retry()?;
        Ok(session)
    }

    /// Host name of the switch
    pub fn host(&self) -> &str {
        &self.credentials.host
    }

    /// Returns true if the session currently holds a transport. This does not mean that the
    /// switch still answers; use [`SwitchSession::is_alive`] for that.
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Release the transport. Closing a closed session does nothing. A closed session
    /// reconnects on the next operation.
    pub fn close(&mut self) -> Result<()> {
        self.last_alive = None;
        match self.transport.take() {
            Some(mut transport) => {
                info!("Closing the session to {}", self.credentials.host);
                transport.close()?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Liveness probe: request the chassis inventory. Any error, or an empty reply, means that
    /// the session is dead.
    pub fn is_alive(&mut self) -> bool {
        let transport = match self.transport.as_mut() {
            Some(t) => t,
            None => return false,
        };
        match transport.exec(&Rpc::GetChassisInventory) {
            Ok(reply) if !reply.is_empty() && reply.first_error().is_none() => {
                self.last_alive = Some(Instant::now());
                true
            }
            Ok(_) => {
                debug!("{} returned an empty chassis inventory", self.credentials.host);
                false
            }
            Err(e) => {
                debug!("Liveness probe to {} failed: {}", self.credentials.host, e);
                false
            }
        }
    }

    /// Make sure that the session is alive. If it is not, reconnect once with the stored
    /// credentials.
    pub fn ensure_connected(&mut self) -> Result<()> {
        if self.transport.is_some() && self.recently_alive() {
            return Ok(());
        }
        if self.is_alive() {
            return Ok(());
        }

        warn!("Session to {} is not alive! Reconnecting...", self.credentials.host);
        // the old transport is dead, closing it would only block until it times out.
        self.transport = None;
        self.last_alive = None;
        match self.connector.connect(&self.credentials, &self.config) {
            Ok(transport) => {
                info!("Reconnected to {}", self.credentials.host);
                self.transport = Some(transport);
                self.last_alive = Some(Instant::now());
                Ok(())
            }
            Err(source) => {
                error!("Cannot reconnect to {}: {}", self.credentials.host, source);
                Err(Error::ConnectFailed { host: self.credentials.host.clone(), source })
            }
        }
    }

    /// Run an operational command, and return the output in JSON format.
    pub fn run_operational_command(&mut self, command: impl AsRef<str>) -> Result<String> {
        let command = command.as_ref();
        self.ensure_connected()?;
        let reply = self.exec(&Rpc::Command(command.to_string()))?;
        let text = reply.text();
        if text.is_empty() {
            return Err(Error::EmptyResponse(command.to_string()));
        }
        Ok(text.to_string())
    }

    /// Returns the configuration subtree of a single interface.
    pub fn get_interface_configuration(&mut self, iface: impl AsRef<str>) -> Result<String> {
        let iface = iface.as_ref();
        self.ensure_connected()?;
        let reply = self.exec(&Rpc::GetInterfaceConfiguration(iface.to_string()))?;
        if reply.is_empty() {
            return Err(Error::EmptyResponse(format!("get-configuration {}", iface)));
        }
        Ok(reply.data)
    }

    /// Load the configuration blob with a replace-style load, and commit it.
    pub fn apply_configuration(&mut self, config: impl AsRef<str>) -> Result<()> {
        self.ensure_connected()?;
        self.load_and_commit(&Rpc::LoadReplace(config.as_ref().to_string()))
    }

    /// Load all statements at once, and commit them. An empty list does not send anything.
    pub fn send_configuration_commands(&mut self, commands: &[impl AsRef<str>]) -> Result<()> {
        if commands.is_empty() {
            debug!("No configuration commands for {}", self.credentials.host);
            return Ok(());
        }
        self.ensure_connected()?;
        let statements = commands.iter().map(|c| c.as_ref()).collect::<Vec<_>>().join("\n");
        debug!(
            "Configuring {}:\n    {}",
            self.credentials.host,
            statements.replace('\n', "\n    ")
        );
        self.load_and_commit(&Rpc::LoadSet(statements))
    }

    /// Enable the interface, by deleting its `disable` statement.
    pub fn enable_interface(&mut self, iface: impl AsRef<str>) -> Result<()> {
        self.set_interface_disable(iface, InterfaceAction::Delete)
    }

    /// Disable the interface, by setting its `disable` statement.
    pub fn disable_interface(&mut self, iface: impl AsRef<str>) -> Result<()> {
        self.set_interface_disable(iface, InterfaceAction::Set)
    }

    /// Set or delete the `disable` statement of the interface.
    pub fn set_interface_disable(
        &mut self,
        iface: impl AsRef<str>,
        action: InterfaceAction,
    ) -> Result<()> {
        self.send_configuration_commands(&[commands::interface_disable(action, iface.as_ref())])
    }

    /// Bond the slaves into the aggregate (without LACP) and enable switching on it.
    pub fn configure_aggregate_without_lacp(
        &mut self,
        aggregate: impl AsRef<str>,
        slaves: &[impl AsRef<str>],
    ) -> Result<()> {
        let statements = commands::aggregate_without_lacp(aggregate.as_ref(), slaves);
        self.send_configuration_commands(&statements)
    }

    /// Configure the interface as trunk port, with the VLAN `vlan<vlan>` as member.
    pub fn set_vlan_on_trunk_interface(
        &mut self,
        vlan: impl fmt::Display,
        iface: impl AsRef<str>,
    ) -> Result<()> {
        self.send_configuration_commands(&[commands::vlan_on_trunk(vlan, iface.as_ref())])
    }

    /// Remove the entire configuration of all interfaces, in a single commit.
    pub fn delete_interfaces_configuration(
        &mut self,
        interfaces: &[impl AsRef<str>],
    ) -> Result<()> {
        let statements = interfaces
            .iter()
            .map(|iface| commands::delete_interface(iface.as_ref()))
            .collect::<Vec<_>>();
        self.send_configuration_commands(&statements)
    }

    /// Returns true if the operational status of the interface is `up`.
    pub fn is_interface_up(&mut self, iface: impl AsRef<str>) -> Result<bool> {
        let output = self.run_operational_command(commands::show_interface(iface.as_ref()))?;
        status::is_up(&output)
    }

    /// Save the configuration of every interface into the snapshot, in the given order.
    pub fn dump_interface_configs(
        &mut self,
        interfaces: &[impl AsRef<str>],
        snapshot: &mut ConfigSnapshot,
    ) -> Result<()> {
        for iface in interfaces {
            let config = self.get_interface_configuration(iface.as_ref())?;
            debug!("Saved the configuration of {} on {}", iface.as_ref(), self.credentials.host);
            snapshot.push(iface.as_ref(), config);
        }
        Ok(())
    }

    /// Remove the configuration of all interfaces, apply every saved configuration of the
    /// snapshot, and clear the snapshot. An empty snapshot does nothing. If anything fails, the
    /// snapshot is left as it is, so that the restore can be repeated.
    pub fn restore_interfaces_configuration(
        &mut self,
        interfaces: &[impl AsRef<str>],
        snapshot: &mut ConfigSnapshot,
    ) -> Result<()> {
        if snapshot.is_empty() {
            info!("No saved interface configuration to restore on {}", self.credentials.host);
            return Ok(());
        }
        self.delete_interfaces_configuration(interfaces)?;
        for saved in snapshot.iter() {
            debug!("Restoring {} on {}", saved.interface, self.credentials.host);
            self.apply_configuration(&saved.config)?;
        }
        snapshot.clear();
        info!("Restored the interface configuration on {}", self.credentials.host);
        Ok(())
    }

    /// Exchange a single RPC. Errors reported by the switch are turned into
    /// [`Error::DeviceReportedError`].
    fn exec(&mut self, rpc: &Rpc) -> Result<Reply> {
        let transport =
            self.transport.as_mut().ok_or(Error::TransportError(netconf::Error::Closed))?;
        match transport.exec(rpc) {
            Ok(reply) => {
                self.last_alive = Some(Instant::now());
                for w in reply.warnings() {
                    warn!("{} on {}: {}", rpc.name(), self.credentials.host, w);
                }
                match reply.first_error() {
                    Some(e) => Err(Error::DeviceReportedError(e.to_string())),
                    None => Ok(reply),
                }
            }
            Err(e) => {
                self.last_alive = None;
                Err(e.into())
            }
        }
    }

    /// Load the configuration and commit it. If the switch rejects either of them, the
    /// uncommitted changes are discarded, and the error of the switch is returned.
    fn load_and_commit(&mut self, load: &Rpc) -> Result<()> {
        let result = self.exec(load).and_then(|_| self.exec(&Rpc::Commit)).map(|_| ());
        if let Err(Error::DeviceReportedError(e)) = &result {
            error!("Configuration of {} failed: {}", self.credentials.host, e);
            if let Err(e) = self.exec(&Rpc::DiscardChanges) {
                warn!("Cannot discard the uncommitted changes on {}: {}", self.credentials.host, e);
            }
        }
        result
    }

    fn recently_alive(&self) -> bool {
        match self.last_alive {
            Some(t) => {
                !self.config.liveness_ttl.is_zero() && t.elapsed() < self.config.liveness_ttl
            }
            None => false,
        }
    }

    fn connect_with_retry(&mut self) -> Result<()> {
        let start = Instant::now();
        let mut attempt: usize = 0;
        loop {
            if self.stopper.is_stop() {
                return Err(Error::Aborted);
            }
            attempt += 1;
            match self.connector.connect(&self.credentials, &self.config) {
                Ok(transport) => {
                    info!("Connected to {} after {} attempt(s)", self.credentials.host, attempt);
                    self.transport = Some(transport);
                    self.last_alive = Some(Instant::now());
                    return Ok(());
                }
                Err(source) => {
                    if start.elapsed() >= self.config.connect_timeout {
                        error!(
                            "Cannot connect to {} after {} attempt(s): {}",
                            self.credentials.host, attempt, source
                        );
                        return Err(Error::ConnectFailed {
                            host: self.credentials.host.clone(),
                            source,
                        });
                    }
                    warn!(
                        "Connection attempt {} to {} failed: {}",
                        attempt, self.credentials.host, source
                    );
                    self.wait(self.config.poll_interval);
                }
            }
        }
    }

    /// Sleep for the given duration, or until the stopper is triggered.
    fn wait(&self, duration: Duration) {
        let until = Instant::now() + duration;
        loop {
            let now = Instant::now();
            if now >= until || self.stopper.is_stop() {
                return;
            }
            sleep((until - now).min(STOP_CHECK_INTERVAL));
        }
    }
}
