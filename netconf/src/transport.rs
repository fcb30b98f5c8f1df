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

//! # Transports
//!
//! A [`Transport`] executes one RPC at a time and returns the parsed reply. [`NetconfClient`]
//! speaks NETCONF over any byte stream, and [`SshTransport`] opens that stream as the `netconf`
//! subsystem of an SSH session.

use crate::framing::FramedStream;
use crate::hello::{Hello, CLIENT_HELLO};
use crate::{Error, Reply, Result, Rpc};

use log::*;
use ssh2::Session;

use std::fmt;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Something that can execute RPCs on a device.
pub trait Transport {
    /// Send the RPC and block until the reply is received.
    fn exec(&mut self, rpc: &Rpc) -> Result<Reply>;

    /// Release the connection. Calling this function on a closed transport does nothing.
    fn close(&mut self) -> Result<()>;
}

/// # NETCONF client
///
/// Performs the capability exchange when created, and afterwards sends RPCs with increasing
/// message IDs. Only a single RPC is in flight at any time. If sending a request or receiving its
/// reply fails, or the reply carries a different message ID, the client is closed: every later
/// call to [`Transport::exec`] returns [`Error::Closed`].
pub struct NetconfClient<S> {
    stream: FramedStream<S>,
    hello: Hello,
    message_id: u64,
    closed: bool,
}

impl<S> fmt::Debug for NetconfClient<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetconfClient(session-id {})", self.hello.session_id)
    }
}

impl<S: Read + Write> NetconfClient<S> {
    /// Send the client hello and wait for the hello of the server.
    pub fn new(stream: S) -> Result<Self> {
        let mut stream = FramedStream::new(stream);
        stream.write_message(CLIENT_HELLO)?;
        let hello = Hello::parse(&stream.read_message()?)?;
        debug!("NETCONF session {} established", hello.session_id);
        Ok(Self { stream, hello, message_id: 0, closed: false })
    }

    /// Hello message received from the server
    pub fn server_hello(&self) -> &Hello {
        &self.hello
    }

    /// Returns true if the session was closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Mutable reference to the underlying stream
    pub fn get_mut(&mut self) -> &mut S {
        self.stream.get_mut()
    }

    fn exchange(&mut self, request: &str) -> Result<String> {
        self.stream.write_message(request)?;
        self.stream.read_message()
    }
}

impl<S: Read + Write> Transport for NetconfClient<S> {
    fn exec(&mut self, rpc: &Rpc) -> Result<Reply> {
        if self.closed {
            return Err(Error::Closed);
        }
        self.message_id += 1;
        let request = rpc.envelope(self.message_id);
        trace!("[{}] >> {}", self.hello.session_id, request);
        let response = match self.exchange(&request) {
            Ok(response) => response,
            Err(e) => {
                // a late reply would be taken as the answer to the next request
                warn!("{} failed, NETCONF session {} is broken", rpc.name(), self.hello.session_id);
                self.closed = true;
                return Err(e);
            }
        };
        trace!("[{}] << {}", self.hello.session_id, response);
        let reply = Reply::parse(&response)?;
        match reply.message_id.as_deref() {
            Some(id) if id != self.message_id.to_string() => {
                self.closed = true;
                Err(Error::ProtocolError(format!(
                    "Reply to message-id {} received, expected {}",
                    id, self.message_id
                )))
            }
            _ => Ok(reply),
        }
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.message_id += 1;
        self.stream.write_message(&Rpc::CloseSession.envelope(self.message_id))?;
        // the server may drop the connection without answering
        match self.stream.read_message() {
            Ok(_) | Err(Error::UnexpectedEof) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// # NETCONF over SSH
///
/// Blocking NETCONF session running in the `netconf` subsystem of an SSH connection, authenticated
/// with a password. The timeout applies to the TCP connect, the SSH handshake and every single RPC.
pub struct SshTransport {
    client: NetconfClient<ssh2::Channel>,
    session: Session,
    host: String,
    closed: bool,
}

impl fmt::Debug for SshTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SshTransport({}, {:?})", self.host, self.client)
    }
}

impl SshTransport {
    /// Connect to the device and open the NETCONF session
    pub fn dial(
        host: impl AsRef<str>,
        port: u16,
        user: impl AsRef<str>,
        password: impl AsRef<str>,
        timeout: Duration,
    ) -> Result<Self> {
        let host = host.as_ref();
        let addr = (host, port).to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Cannot resolve address of {}", host),
            )
        })?;

        let tcp = TcpStream::connect_timeout(&addr, timeout)?;
        let mut session = Session::new()?;
        session.set_timeout(timeout.as_millis().min(u32::MAX as u128) as u32);
        session.set_tcp_stream(tcp);
        session.handshake()?;
        session.userauth_password(user.as_ref(), password.as_ref())?;
        if !session.authenticated() {
            return Err(Error::ProtocolError(format!("Authentication at {} was rejected", host)));
        }

        let mut channel = session.channel_session()?;
        channel.subsystem("netconf")?;
        let client = NetconfClient::new(channel)?;
        info!("Connected to {}:{} (session-id {})", host, port, client.server_hello().session_id);

        Ok(Self { client, session, host: host.to_string(), closed: false })
    }
}

impl Transport for SshTransport {
    fn exec(&mut self, rpc: &Rpc) -> Result<Reply> {
        self.client.exec(rpc)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let result = self.client.close();
        let channel = self.client.get_mut();
        if let Err(e) = channel.send_eof().and_then(|_| channel.close()) {
            debug!("Cannot close the channel to {}: {}", self.host, e);
        }
        if let Err(e) = self.session.disconnect(None, "closing NETCONF session", None) {
            debug!("Cannot disconnect from {}: {}", self.host, e);
        }
        info!("Disconnected from {}", self.host);
        result
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::framing::test::Duplex;

    use std::collections::VecDeque;
    use std::io;

    /// Stream that hands out a scripted sequence of reads, including errors.
    #[derive(Debug, Default)]
    struct Scripted {
        reads: VecDeque<io::Result<Vec<u8>>>,
    }

    impl Scripted {
        fn new() -> Self {
            Self::default()
        }

        fn data(mut self, data: impl AsRef<str>) -> Self {
            self.reads.push_back(Ok(data.as_ref().as_bytes().to_vec()));
            self
        }

        fn error(mut self, kind: io::ErrorKind) -> Self {
            self.reads.push_back(Err(io::Error::new(kind, "scripted")));
            self
        }
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.reads.pop_front() {
                None => Ok(0),
                Some(Err(e)) => Err(e),
                Some(Ok(mut data)) => {
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    if n < data.len() {
                        self.reads.push_front(Ok(data.split_off(n)));
                    }
                    Ok(n)
                }
            }
        }
    }

    impl Write for Scripted {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    const SERVER_HELLO: &str = "<hello><capabilities>\
        <capability>urn:ietf:params:netconf:base:1.0</capability></capabilities>\
        <session-id>42</session-id></hello>]]>]]>";

    #[test]
    fn hello_then_rpc() {
        let input = format!("{}<rpc-reply message-id=\"1\"><ok/></rpc-reply>]]>]]>", SERVER_HELLO);
        let mut client = NetconfClient::new(Duplex::new(input)).unwrap();
        assert_eq!(client.server_hello().session_id, "42");

        let reply = client.exec(&Rpc::Commit).unwrap();
        assert!(reply.is_ok());

        let written = client.get_mut().written();
        let mut messages = written.split("]]>]]>");
        assert!(messages.next().unwrap().contains("<capability>urn:ietf:params:netconf:base:1.0"));
        assert_eq!(
            messages.next().unwrap(),
            "<rpc message-id=\"1\" xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\">\
             <commit-configuration/></rpc>"
        );
    }

    #[test]
    fn message_ids_increase() {
        let input = format!(
            "{}<rpc-reply><ok/></rpc-reply>]]>]]><rpc-reply><ok/></rpc-reply>]]>]]>",
            SERVER_HELLO
        );
        let mut client = NetconfClient::new(Duplex::new(input)).unwrap();
        client.exec(&Rpc::GetChassisInventory).unwrap();
        client.exec(&Rpc::GetChassisInventory).unwrap();
        let written = client.get_mut().written();
        assert!(written.contains("message-id=\"1\""));
        assert!(written.contains("message-id=\"2\""));
    }

    #[test]
    fn close_is_idempotent() {
        let mut client = NetconfClient::new(Duplex::new(SERVER_HELLO)).unwrap();
        // the server hangs up without replying to close-session
        client.close().unwrap();
        client.close().unwrap();
        assert!(client.is_closed());
        assert_eq!(client.get_mut().written().matches("<close-session/>").count(), 1);
        assert!(matches!(client.exec(&Rpc::Commit), Err(Error::Closed)));
    }

    #[test]
    fn connection_lost() {
        let mut client = NetconfClient::new(Duplex::new(SERVER_HELLO)).unwrap();
        assert!(matches!(client.exec(&Rpc::GetChassisInventory), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn timeout_breaks_the_session() {
        let stream = Scripted::new()
            .data(SERVER_HELLO)
            .error(io::ErrorKind::TimedOut)
            .data("<rpc-reply message-id=\"1\"><ok/></rpc-reply>]]>]]>")
            .data("<rpc-reply message-id=\"2\"><chassis-inventory/></rpc-reply>]]>]]>");
        let mut client = NetconfClient::new(stream).unwrap();
        match client.exec(&Rpc::Commit) {
            Err(Error::IoError(e)) => assert_eq!(e.kind(), io::ErrorKind::TimedOut),
            r => panic!("unexpected result: {:?}", r),
        }
        assert!(client.is_closed());
        // the late reply to the commit is never handed out as an answer to a new request
        assert!(matches!(client.exec(&Rpc::GetChassisInventory), Err(Error::Closed)));
    }

    #[test]
    fn reply_to_other_message() {
        let stream = Scripted::new()
            .data(SERVER_HELLO)
            .data("<rpc-reply message-id=\"7\"><ok/></rpc-reply>]]>]]>");
        let mut client = NetconfClient::new(stream).unwrap();
        assert!(matches!(client.exec(&Rpc::Commit), Err(Error::ProtocolError(_))));
        assert!(client.is_closed());
        assert!(matches!(client.exec(&Rpc::Commit), Err(Error::Closed)));
    }

    #[test]
    fn matching_message_id() {
        let stream = Scripted::new()
            .data(SERVER_HELLO)
            .data("<rpc-reply message-id=\"1\"><ok/></rpc-reply>]]>]]>")
            .data("<rpc-reply message-id=\"2\"><ok/></rpc-reply>]]>]]>");
        let mut client = NetconfClient::new(stream).unwrap();
        assert!(client.exec(&Rpc::Commit).unwrap().is_ok());
        assert!(client.exec(&Rpc::Commit).unwrap().is_ok());
        assert!(!client.is_closed());
    }
}
