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

use switch_runtime::{Connector, Credentials, InterfaceAction, Result, SessionConfig, SwitchSession};

use clap::{Parser, Subcommand};
use log::*;
use std::error::Error;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    // initialize the env logger
    pretty_env_logger::init();

    // run clap
    let args = CommandLineArguments::parse();

    let config = match args.config.as_ref() {
        Some(path) => SessionConfig::from_json(std::fs::read_to_string(path)?)?,
        None => SessionConfig::default(),
    };
    let credentials = Credentials::new(args.host, args.user, args.password);

    info!("Connecting to {}", credentials.host);
    let mut session = SwitchSession::connect_ssh(credentials, config)?;

    Ok(execute(session, args.cmd)?)
}

/// Perform the action, and close the session afterwards, no matter if the action succeeded.
fn execute<C: Connector>(mut session: SwitchSession<C>, cmd: MainCommand) -> Result<()> {
    let result = run(&mut session, cmd);
    if let Err(e) = session.close() {
        warn!("Cannot close the session to {}: {}", session.host(), e);
    }
    result
}

fn run<C: Connector>(session: &mut SwitchSession<C>, cmd: MainCommand) -> Result<()> {
    match cmd {
        MainCommand::Status { interface } => {
            let up = session.is_interface_up(&interface)?;
            println!("{} is {}", interface, if up { "up" } else { "down" });
            Ok(())
        }
        MainCommand::Enable { interface } => session.enable_interface(&interface),
        MainCommand::Disable { interface } => session.disable_interface(&interface),
        MainCommand::Disabled { action, interface } => {
            let action: InterfaceAction = action.parse()?;
            session.set_interface_disable(&interface, action)
        }
        MainCommand::Vlan { vlan, interface } => {
            session.set_vlan_on_trunk_interface(vlan, &interface)
        }
        MainCommand::Aggregate { aggregate, slaves } => {
            session.configure_aggregate_without_lacp(&aggregate, &slaves)
        }
        MainCommand::Wipe { interfaces } => session.delete_interfaces_configuration(&interfaces),
        MainCommand::ShowConfig { interface } => {
            println!("{}", session.get_interface_configuration(&interface)?);
            Ok(())
        }
        MainCommand::Command { command } => {
            println!("{}", session.run_operational_command(command.join(" "))?);
            Ok(())
        }
        MainCommand::Set { statements } => session.send_configuration_commands(&statements),
    }
}

/// Command line client for a Juniper switch, talking NETCONF over SSH. Set `RUST_LOG=debug` to
/// see every configuration change, or `RUST_LOG=trace` to see every RPC.
#[derive(Parser, Debug)]
#[clap(name = "switchctl", author = "Tibor Schneider")]
struct CommandLineArguments {
    /// Host name or address of the switch
    #[clap(short = 'H', long, env = "SWITCH_HOST")]
    host: String,
    /// User name
    #[clap(short, long, env = "SWITCH_USER")]
    user: String,
    /// Password
    #[clap(short, long, env = "SWITCH_PASSWORD", hide_env_values = true)]
    password: String,
    /// Session configuration (JSON), see `SessionConfig`
    #[clap(short, long)]
    config: Option<String>,
    /// Action to perform
    #[clap(subcommand)]
    cmd: MainCommand,
}

#[derive(Subcommand, Debug)]
enum MainCommand {
    /// Print the operational status of an interface
    #[clap(name = "status")]
    Status { interface: String },
    /// Enable an interface (deletes its `disable` statement)
    #[clap(name = "enable")]
    Enable { interface: String },
    /// Disable an interface (sets its `disable` statement)
    #[clap(name = "disable")]
    Disable { interface: String },
    /// Apply `set` or `delete` to the `disable` statement of an interface
    #[clap(name = "disabled")]
    Disabled { action: String, interface: String },
    /// Make an interface a trunk port with the VLAN `vlan<VLAN>`
    #[clap(name = "vlan")]
    Vlan { vlan: u16, interface: String },
    /// Bond interfaces into an aggregate without LACP
    #[clap(name = "aggregate")]
    Aggregate {
        aggregate: String,
        #[clap(required = true)]
        slaves: Vec<String>,
    },
    /// Delete the entire configuration of the interfaces
    #[clap(name = "wipe")]
    Wipe {
        #[clap(required = true)]
        interfaces: Vec<String>,
    },
    /// Print the configuration of an interface
    #[clap(name = "show-config")]
    ShowConfig { interface: String },
    /// Run an operational command, and print the JSON output
    #[clap(name = "command")]
    Command {
        #[clap(required = true)]
        command: Vec<String>,
    },
    /// Load and commit set-style statements, one per argument
    #[clap(name = "set")]
    Set {
        #[clap(required = true)]
        statements: Vec<String>,
    },
}
