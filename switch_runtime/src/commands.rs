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

//! Set-style Junos statements used by the interface helpers of the session.

use crate::Error;

use std::fmt;
use std::str::FromStr;

/// Action that is applied to a configuration statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceAction {
    /// Add the statement
    Set,
    /// Remove the statement
    Delete,
}

impl InterfaceAction {
    /// Junos verb of the action
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for InterfaceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

impl FromStr for InterfaceAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "set" => Ok(Self::Set),
            "delete" => Ok(Self::Delete),
            other => Err(Error::UnknownAction(other.to_string())),
        }
    }
}

/// The `disable` statement shuts the interface down while it is present. Hence, `Set` disables
/// the interface and `Delete` enables it again.
pub fn interface_disable(action: InterfaceAction, iface: &str) -> String {
    format!("{} interfaces {} disable", action, iface)
}

/// Bond the slaves into the aggregate without LACP, and put the aggregate into switching mode.
pub fn aggregate_without_lacp(aggregate: &str, slaves: &[impl AsRef<str>]) -> Vec<String> {
    slaves
        .iter()
        .map(|s| format!("set interfaces {} ether-options 802.3ad {}", s.as_ref(), aggregate))
        .chain(std::iter::once(format!(
            "set interfaces {} unit 0 family ethernet-switching",
            aggregate
        )))
        .collect()
}

/// Make the interface a trunk port carrying the VLAN `vlan<id>`.
pub fn vlan_on_trunk(vlan: impl fmt::Display, iface: &str) -> String {
    format!(
        "set interfaces {} unit 0 family ethernet-switching interface-mode trunk vlan members vlan{}",
        iface, vlan
    )
}

/// Remove the entire configuration of the interface
pub fn delete_interface(iface: &str) -> String {
    format!("delete interfaces {}", iface)
}

/// Operational command showing the state of an interface
pub fn show_interface(iface: &str) -> String {
    format!("show interfaces {}", iface)
}
