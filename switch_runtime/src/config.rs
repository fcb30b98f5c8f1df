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

//! Credentials and timing of a switch session

use crate::Result;

use serde::{Deserialize, Deserializer};

use std::fmt;
use std::time::Duration;

/// Default NETCONF-over-SSH port
pub const NETCONF_PORT: u16 = 830;

/// Credentials used to (re-)establish a session. They are never modified after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Host name or address of the switch
    pub host: String,
    /// User name
    pub user: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create new credentials
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self { host: host.into(), user: user.into(), password: password.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"********")
            .finish()
    }
}

/// # Session configuration
///
/// All durations are given in milliseconds when the configuration is read from JSON:
///
/// ```
/// use switch_runtime::SessionConfig;
/// use std::time::Duration;
///
/// let config = SessionConfig::from_json(r#"{"connect_timeout_ms": 10000}"#).unwrap();
/// assert_eq!(config.connect_timeout, Duration::from_secs(10));
/// assert_eq!(config.port, 830);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Port of the NETCONF SSH subsystem
    pub port: u16,
    /// Time budget for establishing the initial connection
    #[serde(rename = "connect_timeout_ms", deserialize_with = "from_millis")]
    pub connect_timeout: Duration,
    /// Pause between two connection attempts
    #[serde(rename = "poll_interval_ms", deserialize_with = "from_millis")]
    pub poll_interval: Duration,
    /// How long a successful exchange with the switch counts as proof that the session is alive.
    /// With zero, the session is probed before every operation.
    #[serde(rename = "liveness_ttl_ms", deserialize_with = "from_millis")]
    pub liveness_ttl: Duration,
    /// Timeout of the transport, for the handshake and for every RPC
    #[serde(rename = "rpc_timeout_ms", deserialize_with = "from_millis")]
    pub rpc_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: NETCONF_PORT,
            connect_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(5),
            liveness_ttl: Duration::from_secs(0),
            rpc_timeout: Duration::from_secs(120),
        }
    }
}

impl SessionConfig {
    /// Read the configuration from a JSON string. Missing fields take their default value.
    pub fn from_json(s: impl AsRef<str>) -> Result<Self> {
        Ok(serde_json::from_str(s.as_ref())?)
    }
}

fn from_millis<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Duration, D::Error> {
    u64::deserialize(d).map(Duration::from_millis)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn password_is_hidden() {
        let c = Credentials::new("switch1", "admin", "secret");
        let repr = format!("{:?}", c);
        assert!(repr.contains("switch1"));
        assert!(!repr.contains("secret"));
    }

    #[test]
    fn config_from_json() {
        let config = SessionConfig::from_json(
            r#"{"port": 2830, "poll_interval_ms": 250, "liveness_ttl_ms": 3000}"#,
        )
        .unwrap();
        assert_eq!(config.port, 2830);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.liveness_ttl, Duration::from_secs(3));
        assert_eq!(config.connect_timeout, SessionConfig::default().connect_timeout);
    }

    #[test]
    fn config_invalid_json() {
        assert!(SessionConfig::from_json(r#"{"port": "eight"}"#).is_err());
    }
}
