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

//! # RPC Vocabulary
//!
//! All RPCs that are sent to the device. Only the payload inside the `<rpc>` element is rendered
//! by [`Rpc::payload`]; [`Rpc::envelope`] adds the `<rpc>` element with the message ID.

use std::borrow::Cow;

const NETCONF_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// # Remote Procedure Call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rpc {
    /// Load set-style configuration statements (one statement per line) into the candidate
    /// configuration.
    LoadSet(String),
    /// Replace parts of the candidate configuration with an XML configuration blob. The blob is
    /// sent verbatim.
    LoadReplace(String),
    /// Commit the candidate configuration
    Commit,
    /// Throw away all uncommitted changes of the candidate configuration
    DiscardChanges,
    /// Operational command, with the output requested as JSON
    Command(String),
    /// Get the configuration of a single interface
    GetInterfaceConfiguration(String),
    /// Get the chassis inventory
    GetChassisInventory,
    /// Gracefully end the NETCONF session
    CloseSession,
    /// Any other RPC, sent verbatim
    Raw(String),
}

impl Rpc {
    /// Name of the RPC, used for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadSet(_) | Self::LoadReplace(_) => "load-configuration",
            Self::Commit => "commit-configuration",
            Self::DiscardChanges => "discard-changes",
            Self::Command(_) => "command",
            Self::GetInterfaceConfiguration(_) => "get-configuration",
            Self::GetChassisInventory => "get-chassis-inventory",
            Self::CloseSession => "close-session",
            Self::Raw(_) => "raw",
        }
    }

    /// Render the content of the `<rpc>` element
    pub fn payload(&self) -> Cow<'_, str> {
        match self {
            Self::LoadSet(statements) => Cow::Owned(format!(
                "<load-configuration action=\"set\" format=\"text\">\
                 <configuration-set>{}</configuration-set>\
                 </load-configuration>",
                escape(statements)
            )),
            Self::LoadReplace(blob) => Cow::Owned(format!(
                "<load-configuration format=\"xml\" action=\"replace\">{}</load-configuration>",
                blob
            )),
            Self::Commit => Cow::Borrowed("<commit-configuration/>"),
            Self::DiscardChanges => Cow::Borrowed("<discard-changes/>"),
            Self::Command(command) => {
                Cow::Owned(format!("<command format=\"json\">{}</command>", escape(command)))
            }
            Self::GetInterfaceConfiguration(iface) => Cow::Owned(format!(
                "<get-configuration><configuration><interfaces><interface>\
                 <name>{}</name>\
                 </interface></interfaces></configuration></get-configuration>",
                escape(iface)
            )),
            Self::GetChassisInventory => Cow::Borrowed("<get-chassis-inventory/>"),
            Self::CloseSession => Cow::Borrowed("<close-session/>"),
            Self::Raw(xml) => Cow::Borrowed(xml.as_str()),
        }
    }

    /// Render the complete `<rpc>` element
    pub fn envelope(&self, message_id: u64) -> String {
        format!(
            "<rpc message-id=\"{}\" xmlns=\"{}\">{}</rpc>",
            message_id,
            NETCONF_NS,
            self.payload()
        )
    }
}

/// Escape the characters that are not allowed in XML character data or attribute values.
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(|c| matches!(c, '&' | '<' | '>' | '"' | '\'')) {
        return Cow::Borrowed(s);
    }
    let mut result = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            c => result.push(c),
        }
    }
    Cow::Owned(result)
}
