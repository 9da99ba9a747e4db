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

// Virtual disk images

use api::{HasOtherConfig, Named, Pool, Sr, Task};
use session::{Session, XenFuture};
use std::collections::{BTreeMap, HashMap};
use types::{DateTime, Ref, ToValue};
use xmlrpc::Value;

xenapi_enum! {
    pub enum VdiType {
        System => "system",
        User => "user",
        Ephemeral => "ephemeral",
        Suspend => "suspend",
        Crashdump => "crashdump",
        HaStatefile => "ha_statefile",
        Metadata => "metadata",
        RedoLog => "redo_log",
        Rrd => "rrd",
        PvsCache => "pvs_cache",
        CbtMetadata => "cbt_metadata",
    }
}

xenapi_enum! {
    /// What happens to the disk's contents when the VM boots
    pub enum OnBoot {
        Reset => "reset",
        Persist => "persist",
    }
}

xenapi_record! {
    pub struct VdiRecord {
        pub uuid: String => "uuid",
        pub name_label: String => "name_label",
        pub name_description: String => "name_description",
        pub allowed_operations: Vec<String> => "allowed_operations",
        pub sr: Ref<Sr> => "SR",
        pub virtual_size: i64 => "virtual_size",
        pub physical_utilisation: i64 => "physical_utilisation",
        pub kind: VdiType => "type",
        pub sharable: bool => "sharable",
        pub read_only: bool => "read_only",
        pub other_config: HashMap<String, String> => "other_config",
        pub storage_lock: bool => "storage_lock",
        pub location: String => "location",
        pub managed: bool => "managed",
        pub missing: bool => "missing",
        pub xenstore_data: HashMap<String, String> => "xenstore_data",
        pub sm_config: HashMap<String, String> => "sm_config",
        pub is_a_snapshot: bool => "is_a_snapshot",
        pub snapshot_of: Ref<Vdi> => "snapshot_of",
        pub snapshots: Vec<Ref<Vdi>> => "snapshots",
        pub snapshot_time: DateTime => "snapshot_time",
        pub tags: Vec<String> => "tags",
        pub allow_caching: bool => "allow_caching",
        pub on_boot: OnBoot => "on_boot",
        pub metadata_of_pool: Ref<Pool> => "metadata_of_pool",
        pub metadata_latest: bool => "metadata_latest",
        pub is_tools_iso: bool => "is_tools_iso",
        pub cbt_enabled: bool => "cbt_enabled",
    }
}

xenapi_class! {
    pub enum Vdi => "VDI", VdiRecord
}

impl Named for Vdi {}
impl HasOtherConfig for Vdi {}

/// The members of `record` a constructor accepts
fn creation_args(record: &VdiRecord) -> Value {
    let mut members = BTreeMap::new();
    {
        let mut put = |key: &str, value: Value| {
            members.insert(String::from(key), value);
        };
        put("name_label", record.name_label.to_value());
        put("name_description", record.name_description.to_value());
        put("SR", record.sr.to_value());
        put("virtual_size", record.virtual_size.to_value());
        put("type", record.kind.to_value());
        put("sharable", record.sharable.to_value());
        put("read_only", record.read_only.to_value());
        put("other_config", record.other_config.to_value());
        put("xenstore_data", record.xenstore_data.to_value());
        put("sm_config", record.sm_config.to_value());
        put("tags", record.tags.to_value());
    }
    Value::Struct(members)
}

impl Vdi {
    /// Create a new disk. Only the user settable members of `record` are
    /// sent.
    pub fn create(session: &Session, record: &VdiRecord) -> XenFuture<Ref<Vdi>> {
        session.call("VDI.create", params!(creation_args(record)))
    }

    /// Make xapi aware of a disk that already exists in an SR
    pub fn introduce(session: &Session, record: &VdiRecord) -> XenFuture<Ref<Vdi>> {
        session.call("VDI.introduce",
                     params!(record.uuid,
                             record.name_label,
                             record.name_description,
                             record.sr,
                             record.kind,
                             record.sharable,
                             record.read_only,
                             record.other_config,
                             record.location,
                             record.xenstore_data,
                             record.sm_config,
                             record.managed,
                             record.virtual_size,
                             record.physical_utilisation,
                             record.metadata_of_pool,
                             record.is_a_snapshot,
                             record.snapshot_time,
                             record.snapshot_of))
    }

    /// Like `introduce` but only writes the database record
    pub fn db_introduce(session: &Session, record: &VdiRecord) -> XenFuture<Ref<Vdi>> {
        session.call("VDI.db_introduce",
                     params!(record.uuid,
                             record.name_label,
                             record.name_description,
                             record.sr,
                             record.kind,
                             record.sharable,
                             record.read_only,
                             record.other_config,
                             record.location,
                             record.xenstore_data,
                             record.sm_config,
                             record.managed,
                             record.virtual_size,
                             record.physical_utilisation,
                             record.metadata_of_pool,
                             record.is_a_snapshot,
                             record.snapshot_time,
                             record.snapshot_of))
    }

    /// The blocks that differ between two snapshots with changed block
    /// tracking, as a base64 bitmap
    pub fn list_changed_blocks(session: &Session,
                               from: &Ref<Vdi>,
                               to: &Ref<Vdi>)
                               -> XenFuture<String> {
        session.call("VDI.list_changed_blocks", params!(from, to))
    }
}

impl Ref<Vdi> {
    pub fn destroy(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "destroy", params!())
    }

    pub fn snapshot(&self,
                    session: &Session,
                    driver_params: &HashMap<String, String>)
                    -> XenFuture<Ref<Vdi>> {
        self.invoke(session, "snapshot", params!(driver_params))
    }

    pub fn snapshot_async(&self,
                          session: &Session,
                          driver_params: &HashMap<String, String>)
                          -> XenFuture<Ref<Task>> {
        self.invoke_async(session, "snapshot", params!(driver_params))
    }

    /// `VDI.clone`: a writable copy sharing blocks with this disk where
    /// the backend allows
    pub fn clone_vdi(&self,
                     session: &Session,
                     driver_params: &HashMap<String, String>)
                     -> XenFuture<Ref<Vdi>> {
        self.invoke(session, "clone", params!(driver_params))
    }

    /// Full copy into `sr`
    pub fn copy(&self, session: &Session, sr: &Ref<Sr>) -> XenFuture<Ref<Vdi>> {
        self.invoke(session, "copy", params!(sr))
    }

    pub fn copy_async(&self, session: &Session, sr: &Ref<Sr>) -> XenFuture<Ref<Task>> {
        self.invoke_async(session, "copy", params!(sr))
    }

    pub fn resize(&self, session: &Session, size: i64) -> XenFuture<()> {
        self.invoke(session, "resize", params!(size))
    }

    /// Resize while attached to a running VM
    pub fn resize_online(&self, session: &Session, size: i64) -> XenFuture<()> {
        self.invoke(session, "resize_online", params!(size))
    }

    pub fn db_forget(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "db_forget", params!())
    }

    /// Remove the record but leave the disk in its SR
    pub fn forget(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "forget", params!())
    }

    /// Refresh the record from the storage backend
    pub fn update(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "update", params!())
    }

    /// Move the disk of a running VM to `sr`
    pub fn pool_migrate(&self,
                        session: &Session,
                        sr: &Ref<Sr>,
                        options: &HashMap<String, String>)
                        -> XenFuture<Ref<Vdi>> {
        self.invoke(session, "pool_migrate", params!(sr, options))
    }

    pub fn set_sharable(&self, session: &Session, value: bool) -> XenFuture<()> {
        self.set_field(session, "sharable", value)
    }

    pub fn set_read_only(&self, session: &Session, value: bool) -> XenFuture<()> {
        self.set_field(session, "read_only", value)
    }

    pub fn set_on_boot(&self, session: &Session, value: OnBoot) -> XenFuture<()> {
        self.set_field(session, "on_boot", value)
    }

    pub fn set_allow_caching(&self, session: &Session, value: bool) -> XenFuture<()> {
        self.set_field(session, "allow_caching", value)
    }

    pub fn enable_cbt(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "enable_cbt", params!())
    }

    pub fn disable_cbt(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "disable_cbt", params!())
    }

    /// Throw away the data of a snapshot but keep its changed block
    /// metadata
    pub fn data_destroy(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "data_destroy", params!())
    }
}

#[cfg(test)]
mod tests {
    use api::Sr;
    use error::{ApiError, Error};
    use futures::Future;
    use mock::MockXapi;
    use std::collections::{BTreeMap, HashMap};
    use super::*;
    use types::{DateTime, FromValue, Ref};
    use xmlrpc::Value;

    fn s(v: &str) -> Value {
        Value::from(v)
    }

    fn vdi() -> Ref<Vdi> {
        Ref::new("OpaqueRef:vdi")
    }

    #[test]
    fn decode_record() {
        let mut members = BTreeMap::new();
        members.insert(String::from("name_label"), s("root"));
        members.insert(String::from("SR"), s("OpaqueRef:sr"));
        members.insert(String::from("virtual_size"), s("21474836480"));
        members.insert(String::from("type"), s("user"));
        members.insert(String::from("on_boot"), s("persist"));
        members.insert(String::from("snapshot_time"),
                       Value::DateTime(String::from("19700101T00:00:00Z")));
        members.insert(String::from("sm_config"), Value::Struct(BTreeMap::new()));

        let record = VdiRecord::from_value(Value::Struct(members)).unwrap();
        assert_eq!(record.virtual_size, 20 * 1024 * 1024 * 1024);
        assert_eq!(record.kind, VdiType::User);
        assert_eq!(record.on_boot, OnBoot::Persist);
        assert_eq!(record.snapshot_time, DateTime(String::from("19700101T00:00:00Z")));
    }

    #[test]
    fn unknown_type() {
        let mut members = BTreeMap::new();
        members.insert(String::from("type"), s("vtpm"));

        let record = VdiRecord::from_value(Value::Struct(members)).unwrap();
        assert_eq!(record.kind, VdiType::Unrecognized(String::from("vtpm")));
    }

    #[test]
    fn create_sends_constructor_fields() {
        let xapi = MockXapi::new();
        xapi.reply(s("OpaqueRef:new"));

        let mut record = VdiRecord::default();
        record.name_label = String::from("data");
        record.sr = Ref::<Sr>::new("OpaqueRef:sr");
        record.virtual_size = 1 << 30;
        record.kind = VdiType::User;
        record.uuid = String::from("ignored");

        let new = Vdi::create(&xapi.session(), &record).wait().unwrap();
        assert_eq!(new.as_str(), "OpaqueRef:new");

        let call = xapi.only_call();
        assert_eq!(call.name, "VDI.create");
        let args = &call.params[1];
        assert_eq!(args.get("name_label"), Some(&s("data")));
        assert_eq!(args.get("SR"), Some(&s("OpaqueRef:sr")));
        assert_eq!(args.get("virtual_size"), Some(&s("1073741824")));
        assert_eq!(args.get("type"), Some(&s("user")));
        assert_eq!(args.get("uuid"), None);
    }

    #[test]
    fn snapshot_and_clone() {
        let xapi = MockXapi::new();
        xapi.reply(s("OpaqueRef:snap"));
        xapi.reply(s("OpaqueRef:task"));
        xapi.reply(s("OpaqueRef:clone"));

        let session = xapi.session();
        let mut driver_params = HashMap::new();
        driver_params.insert(String::from("quiesce"), String::from("true"));
        assert_eq!(vdi().snapshot(&session, &driver_params).wait().unwrap().as_str(),
                   "OpaqueRef:snap");
        assert_eq!(vdi().snapshot_async(&session, &HashMap::new()).wait().unwrap().as_str(),
                   "OpaqueRef:task");
        vdi().clone_vdi(&session, &HashMap::new()).wait().unwrap();

        let calls = xapi.calls();
        assert_eq!(calls[0].name, "VDI.snapshot");
        assert_eq!(calls[0].params[1], s("OpaqueRef:vdi"));
        assert_eq!(calls[0].params[2].get("quiesce"), Some(&s("true")));
        assert_eq!(calls[1].name, "Async.VDI.snapshot");
        assert_eq!(calls[2].name, "VDI.clone");
    }

    #[test]
    fn resize_in_use() {
        let xapi = MockXapi::new();
        xapi.fail(&["VDI_IN_USE", "OpaqueRef:vdi", "resize"]);

        match vdi().resize(&xapi.session(), 1 << 34).wait() {
            Err(Error::Api(ApiError::VdiInUse(params))) => assert_eq!(params[1], "resize"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(xapi.only_call().params[2], s("17179869184"));
    }

    #[test]
    fn introduce_argument_order() {
        let xapi = MockXapi::new();
        xapi.reply(s("OpaqueRef:new"));

        let mut record = VdiRecord::default();
        record.uuid = String::from("0f3e");
        record.location = String::from("0f3e");
        Vdi::introduce(&xapi.session(), &record).wait().unwrap();

        let call = xapi.only_call();
        assert_eq!(call.params.len(), 19);
        assert_eq!(call.params[1], s("0f3e"));
        assert_eq!(call.params[9], s("0f3e"));
        assert_eq!(call.params[17], Value::DateTime(String::new()));
        assert_eq!(call.params[18], s("OpaqueRef:NULL"));
    }

    #[test]
    fn flags() {
        let xapi = MockXapi::new();
        for _ in 0..4 {
            xapi.reply(s(""));
        }

        let session = xapi.session();
        vdi().set_sharable(&session, true).wait().unwrap();
        vdi().set_read_only(&session, false).wait().unwrap();
        vdi().set_on_boot(&session, OnBoot::Reset).wait().unwrap();
        vdi().set_allow_caching(&session, true).wait().unwrap();

        let calls = xapi.calls();
        assert_eq!(calls[0].name, "VDI.set_sharable");
        assert_eq!(calls[1].params[2], Value::Boolean(false));
        assert_eq!(calls[2].name, "VDI.set_on_boot");
        assert_eq!(calls[2].params[2], s("reset"));
        assert_eq!(calls[3].name, "VDI.set_allow_caching");
    }

    #[test]
    fn changed_blocks() {
        let xapi = MockXapi::new();
        xapi.reply(s("AAAA"));

        let bitmap = Vdi::list_changed_blocks(&xapi.session(),
                                              &Ref::new("OpaqueRef:a"),
                                              &Ref::new("OpaqueRef:b"))
            .wait()
            .unwrap();
        assert_eq!(bitmap, "AAAA");
        assert_eq!(xapi.only_call().name, "VDI.list_changed_blocks");
    }
}
