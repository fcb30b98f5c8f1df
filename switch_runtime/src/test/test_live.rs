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

//! Tests against a real switch. They only run if `SWITCH_TEST_HOST`, `SWITCH_TEST_USER` and
//! `SWITCH_TEST_PASSWORD` are set, and they only touch the interface `SWITCH_TEST_INTERFACE`
//! (default `ge-0/0/47`).

use crate::{ConfigSnapshot, Credentials, SessionConfig, SwitchSession};

use std::env;

fn live_session() -> Option<SwitchSession> {
    let host = env::var("SWITCH_TEST_HOST").ok()?;
    let user = env::var("SWITCH_TEST_USER").ok()?;
    let password = env::var("SWITCH_TEST_PASSWORD").ok()?;
    let credentials = Credentials::new(host, user, password);
    Some(SwitchSession::connect_ssh(credentials, SessionConfig::default()).unwrap())
}

fn test_interface() -> String {
    env::var("SWITCH_TEST_INTERFACE").unwrap_or_else(|_| String::from("ge-0/0/47"))
}

#[test]
fn live_disable_and_restore() {
    let mut session = match live_session() {
        Some(s) => s,
        None => return, // skip the test
    };
    let iface = test_interface();
    let mut snapshot = ConfigSnapshot::new();

    session.dump_interface_configs(&[&iface], &mut snapshot).unwrap();
    session.disable_interface(&iface).unwrap();
    assert!(!session.is_interface_up(&iface).unwrap());
    session.restore_interfaces_configuration(&[&iface], &mut snapshot).unwrap();
    assert!(snapshot.is_empty());

    session.close().unwrap();
}

#[test]
fn live_liveness_probe() {
    let mut session = match live_session() {
        Some(s) => s,
        None => return, // skip the test
    };
    assert!(session.is_alive());
    session.close().unwrap();
    assert!(!session.is_alive());
    session.ensure_connected().unwrap();
    assert!(session.is_alive());
}
