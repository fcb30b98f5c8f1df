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

//! Parsing of the interface state, as returned by `show interfaces <name>` in JSON format.
//!
//! Junos encodes every element as a list of objects, with the value stored in `data`:
//!
//! ```json
//! {"interface-information": [{"physical-interface": [{"oper-status": [{"data": "up"}]}]}]}
//! ```

use crate::{Error, Result};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ShowInterfacesReply {
    #[serde(rename = "interface-information")]
    interface_information: Vec<InterfaceInformation>,
}

#[derive(Debug, Deserialize)]
struct InterfaceInformation {
    #[serde(rename = "physical-interface", default)]
    physical_interface: Vec<PhysicalInterface>,
}

#[derive(Debug, Deserialize)]
struct PhysicalInterface {
    #[serde(rename = "oper-status", default)]
    oper_status: Vec<DataField>,
}

#[derive(Debug, Deserialize)]
struct DataField {
    data: String,
}

/// Extract `interface-information[0].physical-interface[0].oper-status[0].data`.
pub fn parse_oper_status(json: &str) -> Result<String> {
    let reply: ShowInterfacesReply = serde_json::from_str(json)?;
    reply
        .interface_information
        .into_iter()
        .next()
        .and_then(|info| info.physical_interface.into_iter().next())
        .and_then(|iface| iface.oper_status.into_iter().next())
        .map(|status| status.data)
        .ok_or_else(|| {
            Error::UnexpectedResponse(
                "no interface-information[0].physical-interface[0].oper-status[0]".to_string(),
            )
        })
}

/// Returns true if the operational status is exactly `up`.
pub fn is_up(json: &str) -> Result<bool> {
    Ok(parse_oper_status(json)? == "up")
}

#[cfg(test)]
mod test {
    use super::*;

    const GE_UP: &str = r#"{
    "interface-information" : [
    {
        "attributes" : {"xmlns" : "http://xml.juniper.net/junos/20.4R0/junos-interface"},
        "physical-interface" : [
        {
            "name" : [{"data" : "ge-0/0/1"}],
            "admin-status" : [{"data" : "up", "attributes" : {"junos:format" : "Enabled"}}],
            "oper-status" : [{"data" : "up"}],
            "speed" : [{"data" : "1000mbps"}]
        }
        ]
    }
    ]
}"#;

    #[test]
    fn interface_up() {
        assert_eq!(parse_oper_status(GE_UP).unwrap(), "up");
        assert!(is_up(GE_UP).unwrap());
    }

    #[test]
    fn interface_down() {
        let json = GE_UP.replace(
            r#""oper-status" : [{"data" : "up"}]"#,
            r#""oper-status" : [{"data" : "down"}]"#,
        );
        assert!(!is_up(&json).unwrap());
    }

    #[test]
    fn status_is_case_sensitive() {
        let json = r#"{"interface-information": [
            {"physical-interface": [{"oper-status": [{"data": "Up"}]}]}
        ]}"#;
        assert!(!is_up(json).unwrap());
    }

    #[test]
    fn missing_status() {
        let json = r#"{"interface-information": [{"physical-interface": []}]}"#;
        assert!(matches!(is_up(json), Err(Error::UnexpectedResponse(_))));
    }

    #[test]
    fn invalid_json() {
        assert!(matches!(is_up("error: device ge-0/0/99 not found"), Err(Error::JsonError(_))));
    }
}
