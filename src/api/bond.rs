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

// Bonded interfaces

use api::{HasOtherConfig, Network, Pif};
use session::{Session, XenFuture};
use std::collections::HashMap;
use types::Ref;

xenapi_enum! {
    pub enum BondMode {
        BalanceSlb => "balance-slb",
        ActiveBackup => "active-backup",
        Lacp => "lacp",
    }
}

xenapi_record! {
    pub struct BondRecord {
        pub uuid: String => "uuid",
        pub master: Ref<Pif> => "master",
        pub slaves: Vec<Ref<Pif>> => "slaves",
        pub other_config: HashMap<String, String> => "other_config",
        pub primary_slave: Ref<Pif> => "primary_slave",
        pub mode: BondMode => "mode",
        pub properties: HashMap<String, String> => "properties",
        pub links_up: i64 => "links_up",
        pub auto_update_mac: bool => "auto_update_mac",
    }
}

xenapi_class! {
    pub enum Bond => "Bond", BondRecord
}

impl HasOtherConfig for Bond {}

impl Bond {
    /// Bond `members` together onto `network`. An empty `mac` takes the
    /// first member's address.
    pub fn create(session: &Session,
                  network: &Ref<Network>,
                  members: &[Ref<Pif>],
                  mac: &str,
                  mode: BondMode,
                  properties: &HashMap<String, String>)
                  -> XenFuture<Ref<Bond>> {
        session.call("Bond.create",
                     params!(network, members, mac, mode, properties))
    }
}

impl Ref<Bond> {
    pub fn destroy(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "destroy", params!())
    }

    pub fn set_mode(&self, session: &Session, mode: BondMode) -> XenFuture<()> {
        self.set_field(session, "mode", mode)
    }

    /// Set a mode specific property such as `hashing_algorithm`
    pub fn set_property(&self, session: &Session, name: &str, value: &str) -> XenFuture<()> {
        self.invoke(session, "set_property", params!(name, value))
    }
}

#[cfg(test)]
mod tests {
    use api::Pif;
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

    #[test]
    fn decode_record() {
        let mut members = BTreeMap::new();
        members.insert(String::from("master"), s("OpaqueRef:bond0"));
        members.insert(String::from("slaves"),
                       Value::Array(vec![s("OpaqueRef:eth0"), s("OpaqueRef:eth1")]));
        members.insert(String::from("mode"), s("active-backup"));
        members.insert(String::from("links_up"), s("2"));

        let record = BondRecord::from_value(Value::Struct(members)).unwrap();
        assert_eq!(record.mode, BondMode::ActiveBackup);
        assert_eq!(record.slaves.len(), 2);
        assert_eq!(record.links_up, 2);
    }

    #[test]
    fn create() {
        let xapi = MockXapi::new();
        xapi.reply(s("OpaqueRef:bond"));

        let members = vec![Ref::<Pif>::new("OpaqueRef:eth0"), Ref::<Pif>::new("OpaqueRef:eth1")];
        let bond = Bond::create(&xapi.session(),
                                &Ref::new("OpaqueRef:net"),
                                &members,
                                "",
                                BondMode::Lacp,
                                &HashMap::new())
            .wait()
            .unwrap();
        assert_eq!(bond.as_str(), "OpaqueRef:bond");

        let call = xapi.only_call();
        assert_eq!(call.name, "Bond.create");
        assert_eq!(call.params[2],
                   Value::Array(vec![s("OpaqueRef:eth0"), s("OpaqueRef:eth1")]));
        assert_eq!(call.params[4], s("lacp"));
    }

    #[test]
    fn already_bonded() {
        let xapi = MockXapi::new();
        xapi.fail(&["PIF_ALREADY_BONDED", "OpaqueRef:eth0"]);

        let result = Bond::create(&xapi.session(),
                                  &Ref::new("OpaqueRef:net"),
                                  &[Ref::new("OpaqueRef:eth0")],
                                  "",
                                  BondMode::BalanceSlb,
                                  &HashMap::new())
            .wait();
        match result {
            Err(Error::Api(ApiError::PifAlreadyBonded(_))) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn settings() {
        let xapi = MockXapi::new();
        xapi.reply(s(""));
        xapi.reply(s(""));

        let session = xapi.session();
        let bond = Ref::<Bond>::new("OpaqueRef:bond");
        bond.set_mode(&session, BondMode::BalanceSlb).wait().unwrap();
        bond.set_property(&session, "hashing_algorithm", "tcpudp_ports").wait().unwrap();

        let calls = xapi.calls();
        assert_eq!(calls[0].name, "Bond.set_mode");
        assert_eq!(calls[0].params[2], s("balance-slb"));
        assert_eq!(calls[1].params[2..], [s("hashing_algorithm"), s("tcpudp_ports")]);
    }
}
