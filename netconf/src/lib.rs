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

//! # NETCONF Client
//!
//! This is a very simple crate to talk NETCONF (RFC 6241) to a network device over SSH. It only
//! implements what is needed to automate a Juniper switch: the base:1.0 end-of-message framing,
//! the `<hello>` exchange, a small set of RPCs and the parsing of `<rpc-reply>` messages.
//!
//! ```no_run
//! use netconf::{Rpc, SshTransport, Transport};
//! use std::time::Duration;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // connect to the device
//!     let mut device =
//!         SshTransport::dial("switch1", 830, "admin", "secret", Duration::from_secs(30))?;
//!
//!     // ask for the state of an interface
//!     let reply = device.exec(&Rpc::Command("show interfaces ge-0/0/1".to_string()))?;
//!     println!("{}", reply.text());
//!
//!     device.close()?;
//!     Ok(())
//! }
//! ```
#![deny(missing_docs)]

mod framing;
mod hello;
mod reply;
mod rpc;
mod transport;
pub use framing::{write_message, FramedStream, DELIMITER};
pub use hello::{Hello, BASE_CAPABILITY};
pub use reply::{Reply, RpcError};
pub use rpc::{escape, Rpc};
pub use transport::{NetconfClient, SshTransport, Transport};

use thiserror::Error;

/// # NETCONF Error type
#[derive(Debug, Error)]
pub enum Error {
    /// Error of the SSH session or channel
    #[error("SSH Error: {0}")]
    SshError(#[from] ssh2::Error),
    /// IO Error
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    /// Cannot parse a message received from the device
    #[error("Cannot parse XML message: {0}")]
    XmlError(#[from] xml::reader::Error),
    /// The device sent something that is not UTF-8
    #[error("Message is not valid UTF-8: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
    /// The stream ended in the middle of a message
    #[error("Connection closed before the end-of-message delimiter")]
    UnexpectedEof,
    /// The device does not behave as a NETCONF server
    #[error("Protocol Error: {0}")]
    ProtocolError(String),
    /// The session was already closed
    #[error("The NETCONF session is closed!")]
    Closed,
}

/// NETCONF Result type
pub type Result<T> = core::result::Result<T, Error>;
