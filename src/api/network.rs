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

// Virtual networks

use api::{HasOtherConfig, Host, Named, Pif};
use session::{Session, XenFuture};
use std::collections::{BTreeMap, HashMap};
use types::{Ref, ToValue};
use xmlrpc::Value;

xenapi_enum! {
    pub enum NetworkPurpose {
        Nbd => "nbd",
        InsecureNbd => "insecure_nbd",
    }
}

xenapi_record! {
    pub struct NetworkRecord {
        pub uuid: String => "uuid",
        pub name_label: String => "name_label",
        pub name_description: String => "name_description",
        pub allowed_operations: Vec<String> => "allowed_operations",
        pub pifs: Vec<Ref<Pif>> => "PIFs",
        pub mtu: i64 => "MTU",
        pub other_config: HashMap<String, String> => "other_config",
        pub bridge: String => "bridge",
        pub managed: bool => "managed",
        pub tags: Vec<String> => "tags",
        pub default_locking_mode: String => "default_locking_mode",
        pub purpose: Vec<NetworkPurpose> => "purpose",
    }
}

xenapi_class! {
    pub enum Network => "network", NetworkRecord
}

impl Named for Network {}
impl HasOtherConfig for Network {}

impl Network {
    /// Create a network from the settable members of `record`. An empty
    /// `bridge` lets xapi pick one.
    pub fn create(session: &Session, record: &NetworkRecord) -> XenFuture<Ref<Network>> {
        let mut args = BTreeMap::new();
        args.insert(String::from("name_label"), record.name_label.to_value());
        args.insert(String::from("name_description"),
                    record.name_description.to_value());
        args.insert(String::from("MTU"), record.mtu.to_value());
        args.insert(String::from("other_config"), record.other_config.to_value());
        args.insert(String::from("managed"), record.managed.to_value());
        args.insert(String::from("tags"), record.tags.to_value());
        if !record.bridge.is_empty() {
            args.insert(String::from("bridge"), record.bridge.to_value());
        }
        session.call("network.create", params!(Value::Struct(args)))
    }
}

impl Ref<Network> {
    pub fn destroy(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "destroy", params!())
    }

    /// Make sure the network's bridge exists on `host`
    pub fn attach(&self, session: &Session, host: &Ref<Host>) -> XenFuture<()> {
        self.invoke(session, "attach", params!(host))
    }

    pub fn set_mtu(&self, session: &Session, mtu: i64) -> XenFuture<()> {
        self.set_field(session, "MTU", mtu)
    }

    pub fn add_purpose(&self, session: &Session, purpose: NetworkPurpose) -> XenFuture<()> {
        self.invoke(session, "add_purpose", params!(purpose))
    }

    pub fn remove_purpose(&self, session: &Session, purpose: NetworkPurpose) -> XenFuture<()> {
        self.invoke(session, "remove_purpose", params!(purpose))
    }
}

#[cfg(test)]
mod tests {
    use futures::Future;
    use mock::MockXapi;
    use super::*;
    use types::Ref;
    use xmlrpc::Value;

    fn s(v: &str) -> Value {
        Value::from(v)
    }

    #[test]
    fn create() {
        let xapi = MockXapi::new();
        xapi.reply(s("OpaqueRef:net"));

        let record = NetworkRecord {
            name_label: String::from("storage"),
            mtu: 9000,
            managed: true,
            ..NetworkRecord::default()
        };
        Network::create(&xapi.session(), &record).wait().unwrap();

        let call = xapi.only_call();
        assert_eq!(call.name, "network.create");
        assert_eq!(call.params[1].get("name_label"), Some(&s("storage")));
        assert_eq!(call.params[1].get("MTU"), Some(&s("9000")));
        assert_eq!(call.params[1].get("bridge"), None);
    }

    #[test]
    fn purposes_and_mtu() {
        let xapi = MockXapi::new();
        for _ in 0..4 {
            xapi.reply(s(""));
        }

        let session = xapi.session();
        let net = Ref::<Network>::new("OpaqueRef:net");
        net.add_purpose(&session, NetworkPurpose::Nbd).wait().unwrap();
        net.remove_purpose(&session, NetworkPurpose::InsecureNbd).wait().unwrap();
        net.set_mtu(&session, 1500).wait().unwrap();
        net.attach(&session, &Ref::new("OpaqueRef:host")).wait().unwrap();

        let calls = xapi.calls();
        assert_eq!(calls[0].params[2], s("nbd"));
        assert_eq!(calls[1].params[2], s("insecure_nbd"));
        assert_eq!(calls[2].name, "network.set_MTU");
        assert_eq!(calls[3].name, "network.attach");
    }
}
