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

// Storage repositories

use api::{HasOtherConfig, Host, Named, Task, Vdi};
use session::{Session, XenFuture};
use std::collections::HashMap;
use types::Ref;

xenapi_record! {
    pub struct SrRecord {
        pub uuid: String => "uuid",
        pub name_label: String => "name_label",
        pub name_description: String => "name_description",
        pub allowed_operations: Vec<String> => "allowed_operations",
        pub vdis: Vec<Ref<Vdi>> => "VDIs",
        pub virtual_allocation: i64 => "virtual_allocation",
        pub physical_utilisation: i64 => "physical_utilisation",
        pub physical_size: i64 => "physical_size",
        /// Backend driver, e.g. `lvm` or `nfs`
        pub kind: String => "type",
        pub content_type: String => "content_type",
        pub shared: bool => "shared",
        pub other_config: HashMap<String, String> => "other_config",
        pub tags: Vec<String> => "tags",
        pub sm_config: HashMap<String, String> => "sm_config",
        pub local_cache_enabled: bool => "local_cache_enabled",
        pub is_tools_sr: bool => "is_tools_sr",
        pub clustered: bool => "clustered",
    }
}

xenapi_class! {
    pub enum Sr => "SR", SrRecord
}

impl Named for Sr {}
impl HasOtherConfig for Sr {}

/// Arguments to `Sr::create`
#[derive(Clone, Debug, Default)]
pub struct SrCreation {
    pub host: Ref<Host>,
    pub device_config: HashMap<String, String>,
    pub physical_size: i64,
    pub name_label: String,
    pub name_description: String,
    pub kind: String,
    pub content_type: String,
    pub shared: bool,
    pub sm_config: HashMap<String, String>,
}

impl Sr {
    /// Create a new SR and format its storage
    pub fn create(session: &Session, args: &SrCreation) -> XenFuture<Ref<Sr>> {
        session.call("SR.create",
                     params!(args.host,
                             args.device_config,
                             args.physical_size,
                             args.name_label,
                             args.name_description,
                             args.kind,
                             args.content_type,
                             args.shared,
                             args.sm_config))
    }

    /// Record an SR whose storage already exists. It still needs PBDs
    /// before it can be used.
    pub fn introduce(session: &Session,
                     uuid: &str,
                     name_label: &str,
                     name_description: &str,
                     kind: &str,
                     content_type: &str,
                     shared: bool,
                     sm_config: &HashMap<String, String>)
                     -> XenFuture<Ref<Sr>> {
        session.call("SR.introduce",
                     params!(uuid,
                             name_label,
                             name_description,
                             kind,
                             content_type,
                             shared,
                             sm_config))
    }

    /// Ask the `kind` backend on `host` what SRs it can find with
    /// `device_config`; the answer is backend specific XML
    pub fn probe(session: &Session,
                 host: &Ref<Host>,
                 device_config: &HashMap<String, String>,
                 kind: &str,
                 sm_config: &HashMap<String, String>)
                 -> XenFuture<String> {
        session.call("SR.probe", params!(host, device_config, kind, sm_config))
    }

    pub fn get_supported_types(session: &Session) -> XenFuture<Vec<String>> {
        session.call("SR.get_supported_types", params!())
    }
}

impl Ref<Sr> {
    /// Remove the SR record, leaving the storage alone
    pub fn forget(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "forget", params!())
    }

    /// Remove the SR record and destroy the storage
    pub fn destroy(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "destroy", params!())
    }

    /// Refresh the size fields from the backend
    pub fn update(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "update", params!())
    }

    /// Bring the VDI list in line with what is on disk
    pub fn scan(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "scan", params!())
    }

    pub fn scan_async(&self, session: &Session) -> XenFuture<Ref<Task>> {
        self.invoke_async(session, "scan", params!())
    }

    pub fn set_shared(&self, session: &Session, value: bool) -> XenFuture<()> {
        self.set_field(session, "shared", value)
    }

    pub fn set_physical_size(&self, session: &Session, value: i64) -> XenFuture<()> {
        self.set_field(session, "physical_size", value)
    }

    /// Keep a copy of the pool database on this SR
    pub fn enable_database_replication(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "enable_database_replication", params!())
    }

    pub fn disable_database_replication(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "disable_database_replication", params!())
    }
}

#[cfg(test)]
mod tests {
    use api::Host;
    use error::{ApiError, Error};
    use futures::Future;
    use mock::MockXapi;
    use std::collections::{BTreeMap, HashMap};
    use super::*;
    use types::{FromValue, Ref};
    use xmlrpc::Value;

    fn s(v: &str) -> Value {
        Value::from(v)
    }

    fn sr() -> Ref<Sr> {
        Ref::new("OpaqueRef:sr")
    }

    #[test]
    fn decode_record() {
        let mut members = BTreeMap::new();
        members.insert(String::from("name_label"), s("Local storage"));
        members.insert(String::from("type"), s("lvm"));
        members.insert(String::from("physical_size"), s("494927052800"));
        members.insert(String::from("VDIs"),
                       Value::Array(vec![s("OpaqueRef:a"), s("OpaqueRef:b")]));
        members.insert(String::from("shared"), Value::Boolean(false));

        let record = SrRecord::from_value(Value::Struct(members)).unwrap();
        assert_eq!(record.kind, "lvm");
        assert_eq!(record.physical_size, 494927052800);
        assert_eq!(record.vdis.len(), 2);
    }

    #[test]
    fn create() {
        let xapi = MockXapi::new();
        xapi.reply(s("OpaqueRef:new"));

        let mut device_config = HashMap::new();
        device_config.insert(String::from("server"), String::from("nfs.example.com"));
        device_config.insert(String::from("serverpath"), String::from("/export/xs"));
        let args = SrCreation {
            host: Ref::<Host>::new("OpaqueRef:host"),
            device_config: device_config,
            name_label: String::from("nfs"),
            kind: String::from("nfs"),
            content_type: String::from("user"),
            shared: true,
            ..SrCreation::default()
        };
        Sr::create(&xapi.session(), &args).wait().unwrap();

        let call = xapi.only_call();
        assert_eq!(call.name, "SR.create");
        assert_eq!(call.params.len(), 10);
        assert_eq!(call.params[1], s("OpaqueRef:host"));
        assert_eq!(call.params[2].get("server"), Some(&s("nfs.example.com")));
        assert_eq!(call.params[3], s("0"));
        assert_eq!(call.params[6], s("nfs"));
        assert_eq!(call.params[8], Value::Boolean(true));
    }

    #[test]
    fn destroy_with_pbds() {
        let xapi = MockXapi::new();
        xapi.fail(&["SR_HAS_PBD", "OpaqueRef:sr"]);

        match sr().destroy(&xapi.session()).wait() {
            Err(Error::Api(ApiError::SrHasPbd(_))) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn scan() {
        let xapi = MockXapi::new();
        xapi.reply(s(""));
        xapi.reply(s("OpaqueRef:task"));

        let session = xapi.session();
        sr().scan(&session).wait().unwrap();
        sr().scan_async(&session).wait().unwrap();

        let names = xapi.calls().into_iter().map(|c| c.name).collect::<Vec<_>>();
        assert_eq!(names, vec!["SR.scan", "Async.SR.scan"]);
    }

    #[test]
    fn probe_and_types() {
        let xapi = MockXapi::new();
        xapi.reply(s("<SRlist/>"));
        xapi.reply(Value::Array(vec![s("lvm"), s("nfs"), s("iso")]));

        let session = xapi.session();
        let found = Sr::probe(&session,
                              &Ref::new("OpaqueRef:host"),
                              &HashMap::new(),
                              "nfs",
                              &HashMap::new())
            .wait()
            .unwrap();
        assert_eq!(found, "<SRlist/>");
        assert_eq!(Sr::get_supported_types(&session).wait().unwrap(),
                   vec!["lvm", "nfs", "iso"]);
    }
}
