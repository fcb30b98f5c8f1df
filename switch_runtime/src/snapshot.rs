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

//! Saved interface configuration, used to undo destructive changes on the switch.

use std::slice::Iter;

/// Configuration of a single interface, as returned by the switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedInterfaceConfig {
    /// Name of the interface
    pub interface: String,
    /// Configuration subtree, in the XML format accepted by a replace-style load
    pub config: String,
}

/// # Configuration Snapshot
///
/// Ordered list of saved interface configurations. It is filled by
/// [`SwitchSession::dump_interface_configs`](crate::SwitchSession::dump_interface_configs) and
/// drained by
/// [`SwitchSession::restore_interfaces_configuration`](crate::SwitchSession::restore_interfaces_configuration).
/// The snapshot is owned by the caller, so independent tests can keep independent snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    entries: Vec<SavedInterfaceConfig>,
}

impl ConfigSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the configuration of an interface
    pub fn push(&mut self, interface: impl Into<String>, config: impl Into<String>) {
        self.entries
            .push(SavedInterfaceConfig { interface: interface.into(), config: config.into() });
    }

    /// Number of saved configurations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is saved
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the saved configurations, in the order they were saved
    pub fn iter(&self) -> Iter<'_, SavedInterfaceConfig> {
        self.entries.iter()
    }

    /// Forget all saved configurations
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a ConfigSnapshot {
    type Item = &'a SavedInterfaceConfig;
    type IntoIter = Iter<'a, SavedInterfaceConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
