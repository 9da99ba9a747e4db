/**
    xenapi-rs provides a Rust based XenAPI client.
    Copyright (C) 2016 Star Lab Corp.

    This program is free software; you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation; either version 2 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License along
    with this program; if not, see <http://www.gnu.org/licenses/>.
**/
#[macro_use]
extern crate clap;
extern crate futures;
#[macro_use]
extern crate log;
extern crate stderrlog;
extern crate tokio_core;
extern crate xenapi;

mod config;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use config::Config;
use futures::{Future, Stream};
use std::process;
use tokio_core::reactor::Core;
use xenapi::{Client, Ref, Result, Session};
use xenapi::api::{Bond, Class, Event, Host, IpConfigurationMode, Network, Pif, Pool, Sr, Tunnel,
                  Vdi, Vlan, Vm};
use xenapi::api::task::DEFAULT_POLL_INTERVAL;

const CLASSES: &'static [&'static str] = &["host", "vm", "pif", "sr", "vdi", "network", "pool",
                                           "bond", "vlan", "tunnel"];

fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("rxe")
        .about(crate_description!())
        .version(crate_version!())
        .setting(AppSettings::GlobalVersion)
        .setting(AppSettings::SubcommandRequired)
        .global_setting(AppSettings::ColoredHelp)
        .max_term_width(72)
        .arg(Arg::with_name("server")
                 .help("Host to connect to, defaults to the local xapi socket")
                 .short("s")
                 .long("server")
                 .takes_value(true))
        .arg(Arg::with_name("port")
                 .help("Port on the server")
                 .short("P")
                 .long("port")
                 .takes_value(true))
        .arg(Arg::with_name("username")
                 .short("u")
                 .long("username")
                 .takes_value(true))
        .arg(Arg::with_name("password")
                 .short("p")
                 .long("password")
                 .takes_value(true))
        .arg(Arg::with_name("quiet").help("Silences all log messages").short("q"))
        .arg(Arg::with_name("verbose")
                 .help("Provide multiple times to increase verbosity of log output")
                 .short("v")
                 .multiple(true))
        .subcommand(SubCommand::with_name("list")
                        .about("lists the objects of a class")
                        .arg(Arg::with_name("class")
                                 .required(true)
                                 .possible_values(CLASSES)))
        .subcommand(SubCommand::with_name("vm-start")
                        .about("boots a halted VM")
                        .arg(Arg::with_name("uuid").required(true)))
        .subcommand(SubCommand::with_name("vm-shutdown")
                        .about("shuts a VM down")
                        .arg(Arg::with_name("uuid").required(true))
                        .arg(Arg::with_name("force")
                                 .help("Do not wait for the guest to cooperate")
                                 .long("force")))
        .subcommand(SubCommand::with_name("vdi-snapshot")
                        .about("snapshots a disk and prints the new disk's uuid")
                        .arg(Arg::with_name("uuid").required(true)))
        .subcommand(SubCommand::with_name("pif-scan")
                        .about("looks for new physical interfaces on a host")
                        .arg(Arg::with_name("host-uuid").required(true)))
        .subcommand(SubCommand::with_name("pif-reconfigure-ip")
                        .about("changes the IPv4 configuration of an interface")
                        .arg(Arg::with_name("uuid").required(true))
                        .arg(Arg::with_name("mode")
                                 .long("mode")
                                 .takes_value(true)
                                 .required(true)
                                 .possible_values(&["none", "dhcp", "static"]))
                        .arg(Arg::with_name("ip").long("ip").takes_value(true))
                        .arg(Arg::with_name("netmask").long("netmask").takes_value(true))
                        .arg(Arg::with_name("gateway").long("gateway").takes_value(true))
                        .arg(Arg::with_name("dns").long("dns").takes_value(true)))
        .subcommand(SubCommand::with_name("pool-join")
                        .about("makes this host a member of another pool")
                        .arg(Arg::with_name("master")
                                 .long("master")
                                 .takes_value(true)
                                 .required(true))
                        .arg(Arg::with_name("master-username")
                                 .long("master-username")
                                 .takes_value(true)
                                 .required(true))
                        .arg(Arg::with_name("master-password")
                                 .long("master-password")
                                 .takes_value(true)
                                 .required(true)))
        .subcommand(SubCommand::with_name("events")
                        .about("prints events as they happen")
                        .arg(Arg::with_name("class").multiple(true)))
}

fn main() {
    let m = app().get_matches();

    stderrlog::new()
        .module(module_path!())
        .module("xenapi")
        .verbosity(m.occurrences_of("verbose") as usize)
        .quiet(m.is_present("quiet"))
        .init()
        .unwrap();

    let config = match Config::load(&m) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };
    let mut core = Core::new().ok().expect("Failed to create event loop");

    if let Err(e) = run(&mut core, &config, &m) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(core: &mut Core, config: &Config, m: &ArgMatches) -> Result<()> {
    let target = config.target()?;
    let username = config.username().to_owned();
    let password = config.password().to_owned();

    let login = Client::connect(&target, &core.handle())
        .and_then(move |client| Session::login_with_password(client, &username, &password));
    let session = core.run(login)?;
    info!("connected to {}", target);

    let result = match m.subcommand() {
        ("list", Some(cmd_m)) => list_cmd(core, &session, cmd_m),
        ("vm-start", Some(cmd_m)) => vm_start_cmd(core, &session, cmd_m),
        ("vm-shutdown", Some(cmd_m)) => vm_shutdown_cmd(core, &session, cmd_m),
        ("vdi-snapshot", Some(cmd_m)) => vdi_snapshot_cmd(core, &session, cmd_m),
        ("pif-scan", Some(cmd_m)) => pif_scan_cmd(core, &session, cmd_m),
        ("pif-reconfigure-ip", Some(cmd_m)) => pif_reconfigure_ip_cmd(core, &session, cmd_m),
        ("pool-join", Some(cmd_m)) => pool_join_cmd(core, &session, cmd_m),
        ("events", Some(cmd_m)) => events_cmd(core, &session, cmd_m),
        _ => unreachable!(),
    };

    if let Err(e) = core.run(session.logout()) {
        warn!("logout failed: {}", e);
    }
    result
}

/// Print `uuid  description` for every object of `C` that `describe`
/// returns something for
fn print_all<C, F>(core: &mut Core, session: &Session, describe: F) -> Result<()>
    where C: Class,
          F: Fn(&C::Record) -> Option<(String, String)>
{
    let records = core.run(C::get_all_records(session))?;
    let mut rows = records.values().filter_map(|r| describe(r)).collect::<Vec<_>>();
    rows.sort();
    for (uuid, description) in rows {
        println!("{}  {}", uuid, description);
    }
    Ok(())
}

fn list_cmd(core: &mut Core, session: &Session, m: &ArgMatches) -> Result<()> {
    match m.value_of("class").unwrap_or("") {
        "host" => {
            print_all::<Host, _>(core, session, |r| {
                Some((r.uuid.clone(), format!("{} ({})", r.name_label, r.address)))
            })
        }
        "vm" => {
            print_all::<Vm, _>(core, session, |r| if r.is_a_template {
                None
            } else {
                Some((r.uuid.clone(), format!("{} [{}]", r.name_label, r.power_state)))
            })
        }
        "pif" => {
            print_all::<Pif, _>(core, session, |r| {
                let vlan = if r.vlan >= 0 {
                    format!(".{}", r.vlan)
                } else {
                    String::new()
                };
                Some((r.uuid.clone(), format!("{}{} {} {}", r.device, vlan, r.mac, r.ip)))
            })
        }
        "sr" => {
            print_all::<Sr, _>(core, session, |r| {
                Some((r.uuid.clone(), format!("{} ({})", r.name_label, r.kind)))
            })
        }
        "vdi" => {
            print_all::<Vdi, _>(core, session, |r| {
                Some((r.uuid.clone(), format!("{} {}", r.name_label, r.virtual_size)))
            })
        }
        "network" => {
            print_all::<Network, _>(core, session, |r| {
                Some((r.uuid.clone(), format!("{} ({})", r.name_label, r.bridge)))
            })
        }
        "pool" => {
            print_all::<Pool, _>(core, session, |r| Some((r.uuid.clone(), r.name_label.clone())))
        }
        "bond" => {
            print_all::<Bond, _>(core, session, |r| Some((r.uuid.clone(), r.mode.to_string())))
        }
        "vlan" => {
            print_all::<Vlan, _>(core, session, |r| Some((r.uuid.clone(), r.tag.to_string())))
        }
        "tunnel" => {
            print_all::<Tunnel, _>(core,
                                   session,
                                   |r| Some((r.uuid.clone(), r.protocol.to_string())))
        }
        _ => unreachable!(),
    }
}

fn vm_start_cmd(core: &mut Core, session: &Session, m: &ArgMatches) -> Result<()> {
    let handle = core.handle();
    let vm = core.run(Vm::get_by_uuid(session, m.value_of("uuid").unwrap_or("")))?;
    let task = core.run(vm.start_async(session, false, false))?;
    core.run(task.wait::<()>(session, &handle, DEFAULT_POLL_INTERVAL))
}

fn vm_shutdown_cmd(core: &mut Core, session: &Session, m: &ArgMatches) -> Result<()> {
    let handle = core.handle();
    let vm = core.run(Vm::get_by_uuid(session, m.value_of("uuid").unwrap_or("")))?;
    let task = if m.is_present("force") {
        core.run(vm.hard_shutdown_async(session))?
    } else {
        core.run(vm.clean_shutdown_async(session))?
    };
    core.run(task.wait::<()>(session, &handle, DEFAULT_POLL_INTERVAL))
}

fn vdi_snapshot_cmd(core: &mut Core, session: &Session, m: &ArgMatches) -> Result<()> {
    let handle = core.handle();
    let vdi = core.run(Vdi::get_by_uuid(session, m.value_of("uuid").unwrap_or("")))?;
    let task = core.run(vdi.snapshot_async(session, &Default::default()))?;
    let snapshot: Ref<Vdi> = core.run(task.wait(session, &handle, DEFAULT_POLL_INTERVAL))?;
    println!("{}", core.run(snapshot.get_uuid(session))?);
    Ok(())
}

fn pif_scan_cmd(core: &mut Core, session: &Session, m: &ArgMatches) -> Result<()> {
    let host = core.run(Host::get_by_uuid(session, m.value_of("host-uuid").unwrap_or("")))?;
    core.run(Pif::scan(session, &host))
}

fn pif_reconfigure_ip_cmd(core: &mut Core, session: &Session, m: &ArgMatches) -> Result<()> {
    let pif = core.run(Pif::get_by_uuid(session, m.value_of("uuid").unwrap_or("")))?;
    let mode = IpConfigurationMode::from_wire(m.value_of("mode").unwrap_or(""));
    core.run(pif.reconfigure_ip(session,
                                mode,
                                m.value_of("ip").unwrap_or(""),
                                m.value_of("netmask").unwrap_or(""),
                                m.value_of("gateway").unwrap_or(""),
                                m.value_of("dns").unwrap_or("")))
}

fn pool_join_cmd(core: &mut Core, session: &Session, m: &ArgMatches) -> Result<()> {
    let handle = core.handle();
    let task = core.run(Pool::join_async(session,
                                         m.value_of("master").unwrap_or(""),
                                         m.value_of("master-username").unwrap_or(""),
                                         m.value_of("master-password").unwrap_or("")))?;
    core.run(task.wait::<()>(session, &handle, DEFAULT_POLL_INTERVAL))
}

fn events_cmd(core: &mut Core, session: &Session, m: &ArgMatches) -> Result<()> {
    let classes = match m.values_of("class") {
        Some(classes) => classes.map(String::from).collect(),
        None => vec![String::from("*")],
    };

    let events = Event::watch(session, classes).for_each(|event| {
        println!("{} {} {} {}",
                 event.id,
                 event.class,
                 event.operation,
                 event.opaque_ref);
        Ok(())
    });
    core.run(events)
}
