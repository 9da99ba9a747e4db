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

// Physical hosts

use api::{HasOtherConfig, Named, Pif, Sr, Task, Vm};
use session::{Session, XenFuture};
use std::collections::HashMap;
use types::{DateTime, Ref};

xenapi_record! {
    pub struct HostRecord {
        pub uuid: String => "uuid",
        pub name_label: String => "name_label",
        pub name_description: String => "name_description",
        pub api_version_major: i64 => "API_version_major",
        pub api_version_minor: i64 => "API_version_minor",
        pub api_version_vendor: String => "API_version_vendor",
        pub enabled: bool => "enabled",
        pub software_version: HashMap<String, String> => "software_version",
        pub other_config: HashMap<String, String> => "other_config",
        pub capabilities: Vec<String> => "capabilities",
        pub cpu_configuration: HashMap<String, String> => "cpu_configuration",
        pub sched_policy: String => "sched_policy",
        pub supported_bootloaders: Vec<String> => "supported_bootloaders",
        pub resident_vms: Vec<Ref<Vm>> => "resident_VMs",
        pub logging: HashMap<String, String> => "logging",
        pub pifs: Vec<Ref<Pif>> => "PIFs",
        pub suspend_image_sr: Ref<Sr> => "suspend_image_sr",
        pub crash_dump_sr: Ref<Sr> => "crash_dump_sr",
        pub hostname: String => "hostname",
        pub address: String => "address",
        pub memory_overhead: i64 => "memory_overhead",
        pub cpu_info: HashMap<String, String> => "cpu_info",
        pub edition: String => "edition",
        pub license_server: HashMap<String, String> => "license_server",
        pub bios_strings: HashMap<String, String> => "bios_strings",
        pub power_on_mode: String => "power_on_mode",
        pub local_cache_sr: Ref<Sr> => "local_cache_sr",
        pub external_auth_type: String => "external_auth_type",
        pub external_auth_service_name: String => "external_auth_service_name",
        pub tags: Vec<String> => "tags",
    }
}

xenapi_class! {
    pub enum Host => "host", HostRecord
}

impl Named for Host {}
impl HasOtherConfig for Host {}

impl Host {
    /// Move the management interface of the host this session is on to
    /// `pif`
    pub fn management_reconfigure(session: &Session, pif: &Ref<Pif>) -> XenFuture<()> {
        session.call("host.management_reconfigure", params!(pif))
    }

    /// Turn the management interface off entirely
    pub fn management_disable(session: &Session) -> XenFuture<()> {
        session.call("host.management_disable", params!())
    }

    /// Switch HA off on this host when the pool is unreachable. Needs a
    /// local session.
    pub fn emergency_ha_disable(session: &Session) -> XenFuture<()> {
        session.call("host.emergency_ha_disable", params!())
    }
}

impl Ref<Host> {
    pub fn enable(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "enable", params!())
    }

    /// Stop new VMs starting here, usually before maintenance
    pub fn disable(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "disable", params!())
    }

    /// The host must be disabled first
    pub fn reboot(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "reboot", params!())
    }

    /// The host must be disabled first
    pub fn shutdown(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "shutdown", params!())
    }

    /// Migrate every running VM to other hosts in the pool
    pub fn evacuate(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "evacuate", params!())
    }

    pub fn evacuate_async(&self, session: &Session) -> XenFuture<Ref<Task>> {
        self.invoke_async(session, "evacuate", params!())
    }

    pub fn assert_can_evacuate(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "assert_can_evacuate", params!())
    }

    /// Each VM that could not be moved with the error description saying
    /// why
    pub fn get_vms_which_prevent_evacuation(&self,
                                            session: &Session)
                                            -> XenFuture<HashMap<Ref<Vm>, Vec<String>>> {
        self.invoke(session, "get_vms_which_prevent_evacuation", params!())
    }

    pub fn dmesg(&self, session: &Session) -> XenFuture<String> {
        self.invoke(session, "dmesg", params!())
    }

    pub fn get_servertime(&self, session: &Session) -> XenFuture<DateTime> {
        self.invoke(session, "get_servertime", params!())
    }

    pub fn get_management_interface(&self, session: &Session) -> XenFuture<Ref<Pif>> {
        self.invoke(session, "get_management_interface", params!())
    }

    pub fn restart_agent(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "restart_agent", params!())
    }

    /// Re-read the `logging` field into syslog's configuration
    pub fn syslog_reconfigure(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "syslog_reconfigure", params!())
    }

    /// Bytes of memory free for new VMs
    pub fn compute_free_memory(&self, session: &Session) -> XenFuture<i64> {
        self.invoke(session, "compute_free_memory", params!())
    }

    pub fn sync_data(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "sync_data", params!())
    }
}

#[cfg(test)]
mod tests {
    use api::Vm;
    use error::{ApiError, Error};
    use futures::Future;
    use mock::MockXapi;
    use std::collections::BTreeMap;
    use super::*;
    use types::{DateTime, FromValue, Ref};
    use xmlrpc::Value;

    fn s(v: &str) -> Value {
        Value::from(v)
    }

    fn host() -> Ref<Host> {
        Ref::new("OpaqueRef:host")
    }

    #[test]
    fn decode_record() {
        let mut software = BTreeMap::new();
        software.insert(String::from("product_version"), s("7.1.0"));
        let mut members = BTreeMap::new();
        members.insert(String::from("hostname"), s("xs1"));
        members.insert(String::from("address"), s("10.0.0.1"));
        members.insert(String::from("API_version_major"), s("2"));
        members.insert(String::from("API_version_minor"), s("6"));
        members.insert(String::from("enabled"), Value::Boolean(true));
        members.insert(String::from("software_version"), Value::Struct(software));

        let record = HostRecord::from_value(Value::Struct(members)).unwrap();
        assert_eq!(record.address, "10.0.0.1");
        assert_eq!((record.api_version_major, record.api_version_minor), (2, 6));
        assert_eq!(record.software_version["product_version"], "7.1.0");
    }

    #[test]
    fn maintenance() {
        let xapi = MockXapi::new();
        for _ in 0..3 {
            xapi.reply(s(""));
        }

        let session = xapi.session();
        host().disable(&session).wait().unwrap();
        host().evacuate(&session).wait().unwrap();
        host().reboot(&session).wait().unwrap();

        let names = xapi.calls().into_iter().map(|c| c.name).collect::<Vec<_>>();
        assert_eq!(names, vec!["host.disable", "host.evacuate", "host.reboot"]);
    }

    #[test]
    fn evacuation_blockers() {
        let mut blockers = BTreeMap::new();
        blockers.insert(String::from("OpaqueRef:vm"),
                        Value::Array(vec![s("VM_MISSING_PV_DRIVERS"), s("OpaqueRef:vm")]));
        let xapi = MockXapi::new();
        xapi.reply(Value::Struct(blockers));
        xapi.fail(&["CANNOT_EVACUATE_HOST", "VM_MISSING_PV_DRIVERS"]);

        let session = xapi.session();
        let found = host().get_vms_which_prevent_evacuation(&session).wait().unwrap();
        assert_eq!(found[&Ref::<Vm>::new("OpaqueRef:vm")][0], "VM_MISSING_PV_DRIVERS");

        match host().assert_can_evacuate(&session).wait() {
            Err(Error::Api(ApiError::CannotEvacuateHost(_))) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn queries() {
        let xapi = MockXapi::new();
        xapi.reply(s("[    0.000000] Linux version"));
        xapi.reply(Value::DateTime(String::from("20161129T16:34:02Z")));
        xapi.reply(s("OpaqueRef:pif"));
        xapi.reply(s("3221225472"));

        let session = xapi.session();
        assert!(host().dmesg(&session).wait().unwrap().contains("Linux"));
        assert_eq!(host().get_servertime(&session).wait().unwrap(),
                   DateTime(String::from("20161129T16:34:02Z")));
        assert_eq!(host().get_management_interface(&session).wait().unwrap().as_str(),
                   "OpaqueRef:pif");
        assert_eq!(host().compute_free_memory(&session).wait().unwrap(), 3 << 30);
    }

    #[test]
    fn management() {
        let xapi = MockXapi::new();
        xapi.reply(s(""));
        xapi.reply(s(""));

        let session = xapi.session();
        Host::management_reconfigure(&session, &Ref::new("OpaqueRef:pif")).wait().unwrap();
        Host::management_disable(&session).wait().unwrap();

        let calls = xapi.calls();
        assert_eq!(calls[0].name, "host.management_reconfigure");
        assert_eq!(calls[0].params, vec![s(MockXapi::SESSION), s("OpaqueRef:pif")]);
        assert_eq!(calls[1].name, "host.management_disable");
    }
}
