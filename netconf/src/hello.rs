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

//! # Capability Exchange

use crate::{Error, Result};

use xml::reader::XmlEvent;
use xml::ParserConfig;

/// Capability that both peers must announce for the base:1.0 protocol
pub const BASE_CAPABILITY: &str = "urn:ietf:params:netconf:base:1.0";

/// Hello message, sent by the client right after the channel is opened
pub(crate) const CLIENT_HELLO: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    r#"<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">"#,
    "<capabilities><capability>urn:ietf:params:netconf:base:1.0</capability></capabilities>",
    "</hello>"
);

/// Server hello message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hello {
    /// Capabilities announced by the server
    pub capabilities: Vec<String>,
    /// Session ID assigned by the server
    pub session_id: String,
}

impl Hello {
    /// Parse the hello message of the server. The message must announce the base:1.0 capability,
    /// and contain a session ID.
    pub fn parse(message: &str) -> Result<Self> {
        let reader =
            ParserConfig::new().trim_whitespace(true).create_reader(message.trim().as_bytes());

        let mut stack: Vec<String> = Vec::new();
        let mut capabilities = Vec::new();
        let mut session_id = None;

        for event in reader {
            match event? {
                XmlEvent::StartElement { name, .. } => {
                    if stack.is_empty() && name.local_name != "hello" {
                        return Err(Error::ProtocolError(format!(
                            "Expected <hello>, received <{}>",
                            name.local_name
                        )));
                    }
                    stack.push(name.local_name);
                }
                XmlEvent::EndElement { .. } => {
                    stack.pop();
                }
                XmlEvent::Characters(s) => match stack.last().map(String::as_str) {
                    Some("capability") => capabilities.push(s.trim().to_string()),
                    Some("session-id") => session_id = Some(s.trim().to_string()),
                    _ => {}
                },
                _ => {}
            }
        }

        let session_id = session_id
            .ok_or_else(|| Error::ProtocolError("Server hello without session-id".to_string()))?;

        if !capabilities.iter().any(|c| c.starts_with(BASE_CAPABILITY)) {
            return Err(Error::ProtocolError(format!(
                "Server does not support {}",
                BASE_CAPABILITY
            )));
        }

        Ok(Self { capabilities, session_id })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const JUNOS_HELLO: &str = r#"<!-- No zombies were killed during the creation of this user interface -->
<!-- user admin, class j-super-user -->
<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
  <capabilities>
    <capability>urn:ietf:params:netconf:base:1.0</capability>
    <capability>urn:ietf:params:netconf:capability:candidate:1.0</capability>
    <capability>http://xml.juniper.net/netconf/junos/1.0</capability>
  </capabilities>
  <session-id>27700</session-id>
</hello>"#;

    #[test]
    fn junos_hello() {
        let hello = Hello::parse(JUNOS_HELLO).unwrap();
        assert_eq!(hello.session_id, "27700");
        assert_eq!(hello.capabilities.len(), 3);
    }

    #[test]
    fn hello_without_session_id() {
        let msg = "<hello><capabilities><capability>urn:ietf:params:netconf:base:1.0</capability></capabilities></hello>";
        assert!(matches!(Hello::parse(msg), Err(Error::ProtocolError(_))));
    }

    #[test]
    fn hello_without_base() {
        let msg = "<hello><capabilities><capability>urn:ietf:params:netconf:base:1.1</capability></capabilities><session-id>1</session-id></hello>";
        assert!(matches!(Hello::parse(msg), Err(Error::ProtocolError(_))));
    }

    #[test]
    fn not_a_hello() {
        assert!(matches!(Hello::parse("<rpc-reply/>"), Err(Error::ProtocolError(_))));
    }
}
