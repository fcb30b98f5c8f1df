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

//! # RPC Replies

use crate::{Error, Result};

use xml::reader::XmlEvent;
use xml::ParserConfig;

use std::fmt;

/// # Reply of the device
///
/// Parsed `<rpc-reply>` message. Errors are collected from the entire reply, including the ones
/// that are nested inside `<commit-results>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// Raw XML inside the `<rpc-reply>` element, trimmed.
    pub data: String,
    /// Every `<rpc-error>` element found in the reply, in document order.
    pub errors: Vec<RpcError>,
    /// `message-id` attribute of the `<rpc-reply>`, if the device sent one.
    pub message_id: Option<String>,
    ok: bool,
    text: String,
}

impl Reply {
    /// Parse an `<rpc-reply>` message.
    pub fn parse(message: &str) -> Result<Self> {
        let message = message.trim();
        let reader = ParserConfig::new().trim_whitespace(false).create_reader(message.as_bytes());

        let mut depth = 0usize;
        let mut ok = false;
        let mut message_id = None;
        let mut text = String::new();
        let mut errors = Vec::new();
        // error that is currently parsed, and the leaf inside of it.
        let mut current: Option<RpcError> = None;
        let mut field: Option<String> = None;
        let mut value = String::new();

        for event in reader {
            match event? {
                XmlEvent::StartElement { name, attributes, .. } => {
                    depth += 1;
                    if depth == 1 {
                        if name.local_name != "rpc-reply" {
                            return Err(Error::ProtocolError(format!(
                                "Expected <rpc-reply>, received <{}>",
                                name.local_name
                            )));
                        }
                        message_id = attributes
                            .into_iter()
                            .find(|a| a.name.local_name == "message-id")
                            .map(|a| a.value);
                    } else if name.local_name == "rpc-error" {
                        current = Some(RpcError::default());
                    } else if current.is_some() {
                        field = Some(name.local_name);
                        value.clear();
                    } else if depth == 2 && name.local_name == "ok" {
                        ok = true;
                    }
                }
                XmlEvent::EndElement { name } => {
                    if name.local_name == "rpc-error" {
                        errors.extend(current.take());
                    } else if let Some(e) = current.as_mut() {
                        if field.as_deref() == Some(name.local_name.as_str()) {
                            e.set_field(&name.local_name, value.trim());
                            field = None;
                        }
                    }
                    depth -= 1;
                }
                XmlEvent::Characters(s) | XmlEvent::CData(s) | XmlEvent::Whitespace(s) => {
                    if depth == 1 {
                        text.push_str(&s);
                    } else if field.is_some() {
                        value.push_str(&s);
                    }
                }
                _ => {}
            }
        }

        Ok(Self {
            data: inner_xml(message).to_string(),
            errors,
            message_id,
            ok,
            text: text.trim().to_string(),
        })
    }

    /// Character data directly inside `<rpc-reply>`, unescaped and trimmed. This is where the
    /// device puts the output of commands requested with `format="json"` or `format="text"`.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true if the reply contains `<ok/>`.
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Returns true if the reply carries neither data nor text.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// First error that is not a warning
    pub fn first_error(&self) -> Option<&RpcError> {
        self.errors.iter().find(|e| !e.is_warning())
    }

    /// All errors with severity `warning`
    pub fn warnings(&self) -> impl Iterator<Item = &RpcError> {
        self.errors.iter().filter(|e| e.is_warning())
    }
}

/// Returns the raw content of the root element. The message must already be known to be a
/// well-formed document.
fn inner_xml(message: &str) -> &str {
    let open = match message.find("rpc-reply") {
        Some(pos) => pos,
        None => return "",
    };
    let start = match message[open..].find('>') {
        Some(pos) => open + pos,
        None => return "",
    };
    if message[..start].ends_with('/') {
        return "";
    }
    match message.rfind("</") {
        Some(end) if end > start => message[(start + 1)..end].trim(),
        _ => "",
    }
}

/// # Error reported by the device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpcError {
    /// Layer in which the error occurred (e.g., `protocol` or `application`)
    pub error_type: String,
    /// Error tag (e.g., `invalid-value`)
    pub tag: String,
    /// Either `error` or `warning`
    pub severity: String,
    /// Configuration path at which the error occurred
    pub path: String,
    /// Human readable error message
    pub message: String,
    /// Offending element, taken from `<error-info>`
    pub bad_element: String,
}

impl RpcError {
    fn set_field(&mut self, field: &str, value: &str) {
        let target = match field {
            "error-type" => &mut self.error_type,
            "error-tag" => &mut self.tag,
            "error-severity" => &mut self.severity,
            "error-path" => &mut self.path,
            "error-message" => &mut self.message,
            "bad-element" => &mut self.bad_element,
            _ => return,
        };
        *target = value.to_string();
    }

    /// Returns true if this error is only a warning
    pub fn is_warning(&self) -> bool {
        self.severity == "warning"
    }
}

/// Junos wraps paths in brackets, and pads messages with newlines.
fn trim_field(s: &str) -> &str {
    s.trim_matches(|c: char| c == '[' || c == ']' || c.is_whitespace())
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = trim_field(&self.message);
        let element = trim_field(&self.bad_element);
        let path = trim_field(&self.path);

        if message.is_empty() {
            write!(f, "{}", trim_field(&self.tag))?;
        } else {
            write!(f, "{}", message)?;
        }
        match (element.is_empty(), path.is_empty()) {
            (true, true) => Ok(()),
            (false, true) => write!(f, " (element: {})", element),
            (true, false) => write!(f, " (path: {})", path),
            (false, false) => write!(f, " (element: {}, path: {})", element, path),
        }
    }
}
