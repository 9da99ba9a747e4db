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

// Physical (and VLAN, bond, tunnel) network interfaces

use api::{Bond, HasOtherConfig, Host, Network, Tunnel, Vlan};
use session::{Session, XenFuture};
use std::collections::HashMap;
use types::Ref;

xenapi_enum! {
    pub enum IpConfigurationMode {
        None => "None",
        Dhcp => "DHCP",
        Static => "Static",
    }
}

xenapi_enum! {
    pub enum Ipv6ConfigurationMode {
        None => "None",
        Dhcp => "DHCP",
        Static => "Static",
        Autoconf => "Autoconf",
    }
}

xenapi_enum! {
    /// Which address family the management interface prefers
    pub enum PrimaryAddressType {
        Ipv4 => "IPv4",
        Ipv6 => "IPv6",
    }
}

xenapi_record! {
    pub struct PifRecord {
        pub uuid: String => "uuid",
        pub device: String => "device",
        pub network: Ref<Network> => "network",
        pub host: Ref<Host> => "host",
        pub mac: String => "MAC",
        pub mtu: i64 => "MTU",
        /// -1 on an untagged interface
        pub vlan: i64 => "VLAN",
        pub physical: bool => "physical",
        pub currently_attached: bool => "currently_attached",
        pub ip_configuration_mode: IpConfigurationMode => "ip_configuration_mode",
        pub ip: String => "IP",
        pub netmask: String => "netmask",
        pub gateway: String => "gateway",
        pub dns: String => "DNS",
        pub bond_slave_of: Ref<Bond> => "bond_slave_of",
        pub bond_master_of: Vec<Ref<Bond>> => "bond_master_of",
        pub vlan_master_of: Ref<Vlan> => "VLAN_master_of",
        pub vlan_slave_of: Vec<Ref<Vlan>> => "VLAN_slave_of",
        pub management: bool => "management",
        pub other_config: HashMap<String, String> => "other_config",
        pub disallow_unplug: bool => "disallow_unplug",
        pub tunnel_access_pif_of: Vec<Ref<Tunnel>> => "tunnel_access_PIF_of",
        pub tunnel_transport_pif_of: Vec<Ref<Tunnel>> => "tunnel_transport_PIF_of",
        pub ipv6_configuration_mode: Ipv6ConfigurationMode => "ipv6_configuration_mode",
        pub ipv6: Vec<String> => "IPv6",
        pub ipv6_gateway: String => "ipv6_gateway",
        pub primary_address_type: PrimaryAddressType => "primary_address_type",
        pub managed: bool => "managed",
        pub properties: HashMap<String, String> => "properties",
        pub capabilities: Vec<String> => "capabilities",
    }
}

xenapi_class! {
    pub enum Pif => "PIF", PifRecord
}

impl HasOtherConfig for Pif {}

impl Pif {
    /// Create PIFs for any physical interfaces on `host` xapi does not know
    /// about yet
    pub fn scan(session: &Session, host: &Ref<Host>) -> XenFuture<()> {
        session.call("PIF.scan", params!(host))
    }

    /// Create a PIF for the interface with the given MAC on `host`
    pub fn introduce(session: &Session,
                     host: &Ref<Host>,
                     mac: &str,
                     device: &str,
                     managed: bool)
                     -> XenFuture<Ref<Pif>> {
        session.call("PIF.introduce", params!(host, mac, device, managed))
    }

    /// Create a PIF object straight in the database, without touching
    /// the host. Takes its fields from `record`.
    pub fn db_introduce(session: &Session, record: &PifRecord) -> XenFuture<Ref<Pif>> {
        session.call("PIF.db_introduce",
                     params!(record.device,
                             record.network,
                             record.host,
                             record.mac,
                             record.mtu,
                             record.vlan,
                             record.physical,
                             record.ip_configuration_mode,
                             record.ip,
                             record.netmask,
                             record.gateway,
                             record.dns,
                             record.bond_slave_of,
                             record.vlan_master_of,
                             record.management,
                             record.other_config,
                             record.disallow_unplug,
                             record.ipv6_configuration_mode,
                             record.ipv6,
                             record.ipv6_gateway,
                             record.primary_address_type,
                             record.managed,
                             record.properties))
    }

    /// Create a VLAN interface on top of `device`
    #[deprecated(note = "use Vlan::create")]
    pub fn create_vlan(session: &Session,
                       device: &str,
                       network: &Ref<Network>,
                       host: &Ref<Host>,
                       vlan: i64)
                       -> XenFuture<Ref<Pif>> {
        session.call("PIF.create_VLAN", params!(device, network, host, vlan))
    }
}

impl Ref<Pif> {
    /// Drop the PIF from the database
    pub fn forget(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "forget", params!())
    }

    pub fn plug(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "plug", params!())
    }

    pub fn unplug(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "unplug", params!())
    }

    /// Change the IPv4 configuration. The address arguments are ignored by
    /// xapi unless `mode` is `Static`.
    pub fn reconfigure_ip(&self,
                          session: &Session,
                          mode: IpConfigurationMode,
                          ip: &str,
                          netmask: &str,
                          gateway: &str,
                          dns: &str)
                          -> XenFuture<()> {
        self.invoke(session,
                    "reconfigure_ip",
                    params!(mode, ip, netmask, gateway, dns))
    }

    pub fn reconfigure_ipv6(&self,
                            session: &Session,
                            mode: Ipv6ConfigurationMode,
                            ipv6: &str,
                            gateway: &str,
                            dns: &str)
                            -> XenFuture<()> {
        self.invoke(session, "reconfigure_ipv6", params!(mode, ipv6, gateway, dns))
    }

    pub fn set_primary_address_type(&self,
                                    session: &Session,
                                    primary_address_type: PrimaryAddressType)
                                    -> XenFuture<()> {
        self.set_field(session, "primary_address_type", primary_address_type)
    }

    /// Set a device property such as `gro`
    pub fn set_property(&self, session: &Session, name: &str, value: &str) -> XenFuture<()> {
        self.invoke(session, "set_property", params!(name, value))
    }

    pub fn set_disallow_unplug(&self, session: &Session, value: bool) -> XenFuture<()> {
        self.set_field(session, "disallow_unplug", value)
    }

    /// Remove the database record without touching the host
    pub fn db_forget(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "db_forget", params!())
    }

    /// Destroy a VLAN interface
    #[deprecated(note = "use Ref<Vlan>::destroy")]
    pub fn destroy(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "destroy", params!())
    }
}

#[cfg(test)]
mod tests {
    use api::{Class, Host, Network};
    use error::{ApiError, Error};
    use futures::Future;
    use mock::MockXapi;
    use std::collections::BTreeMap;
    use super::*;
    use types::{FromValue, Ref};
    use xmlrpc::Value;

    fn pif() -> Ref<Pif> {
        Ref::new("OpaqueRef:pif")
    }

    fn s(v: &str) -> Value {
        Value::from(v)
    }

    #[test]
    fn decode_record() {
        let mut members = BTreeMap::new();
        members.insert(String::from("uuid"), s("f3b1c6c8"));
        members.insert(String::from("device"), s("eth0"));
        members.insert(String::from("MAC"), s("00:16:3e:5a:12:01"));
        members.insert(String::from("MTU"), s("1500"));
        members.insert(String::from("VLAN"), s("-1"));
        members.insert(String::from("physical"), Value::Boolean(true));
        members.insert(String::from("ip_configuration_mode"), s("DHCP"));
        members.insert(String::from("ipv6_configuration_mode"), s("None"));
        members.insert(String::from("primary_address_type"), s("IPv4"));
        members.insert(String::from("bond_slave_of"), s("OpaqueRef:NULL"));
        members.insert(String::from("IPv6"), Value::Array(vec![]));
        members.insert(String::from("igmp_snooping_status"), s("unknown"));

        let record = PifRecord::from_value(Value::Struct(members)).unwrap();
        assert_eq!(record.device, "eth0");
        assert_eq!(record.mtu, 1500);
        assert_eq!(record.vlan, -1);
        assert!(record.physical);
        assert_eq!(record.ip_configuration_mode, IpConfigurationMode::Dhcp);
        assert_eq!(record.primary_address_type, PrimaryAddressType::Ipv4);
        assert!(record.bond_slave_of.is_null());
        assert!(record.properties.is_empty());
    }

    #[test]
    fn scan_and_introduce() {
        let xapi = MockXapi::new();
        xapi.reply(s(""));
        xapi.reply(s("OpaqueRef:new"));

        let session = xapi.session();
        let host = Ref::<Host>::new("OpaqueRef:host");
        Pif::scan(&session, &host).wait().unwrap();
        let new = Pif::introduce(&session, &host, "00:16:3e:5a:12:01", "eth1", true)
            .wait()
            .unwrap();
        assert_eq!(new.as_str(), "OpaqueRef:new");

        let calls = xapi.calls();
        assert_eq!(calls[0].name, "PIF.scan");
        assert_eq!(calls[0].params, vec![s(MockXapi::SESSION), s("OpaqueRef:host")]);
        assert_eq!(calls[1].name, "PIF.introduce");
        assert_eq!(calls[1].params[1..],
                   [s("OpaqueRef:host"), s("00:16:3e:5a:12:01"), s("eth1"), Value::Boolean(true)]);
    }

    #[test]
    fn reconfigure_ip() {
        let xapi = MockXapi::new();
        xapi.reply(s(""));

        pif()
            .reconfigure_ip(&xapi.session(),
                            IpConfigurationMode::Static,
                            "10.0.0.5",
                            "255.255.255.0",
                            "10.0.0.1",
                            "10.0.0.2")
            .wait()
            .unwrap();

        let call = xapi.only_call();
        assert_eq!(call.name, "PIF.reconfigure_ip");
        assert_eq!(call.params,
                   vec![s(MockXapi::SESSION),
                        s("OpaqueRef:pif"),
                        s("Static"),
                        s("10.0.0.5"),
                        s("255.255.255.0"),
                        s("10.0.0.1"),
                        s("10.0.0.2")]);
    }

    #[test]
    fn reconfigure_ipv6() {
        let xapi = MockXapi::new();
        xapi.reply(s(""));

        pif()
            .reconfigure_ipv6(&xapi.session(), Ipv6ConfigurationMode::Autoconf, "", "", "")
            .wait()
            .unwrap();

        let call = xapi.only_call();
        assert_eq!(call.name, "PIF.reconfigure_ipv6");
        assert_eq!(call.params[2], s("Autoconf"));
    }

    #[test]
    fn setters() {
        let xapi = MockXapi::new();
        for _ in 0..3 {
            xapi.reply(s(""));
        }

        let session = xapi.session();
        pif().set_primary_address_type(&session, PrimaryAddressType::Ipv6).wait().unwrap();
        pif().set_property(&session, "gro", "off").wait().unwrap();
        pif().set_disallow_unplug(&session, true).wait().unwrap();

        let calls = xapi.calls();
        assert_eq!(calls[0].name, "PIF.set_primary_address_type");
        assert_eq!(calls[0].params[2], s("IPv6"));
        assert_eq!(calls[1].name, "PIF.set_property");
        assert_eq!(calls[1].params[2..], [s("gro"), s("off")]);
        assert_eq!(calls[2].name, "PIF.set_disallow_unplug");
        assert_eq!(calls[2].params[2], Value::Boolean(true));
    }

    #[test]
    fn unplug_management_interface() {
        let xapi = MockXapi::new();
        xapi.fail(&["PIF_IS_MANAGEMENT_INTERFACE", "OpaqueRef:pif"]);

        match pif().unplug(&xapi.session()).wait() {
            Err(Error::Api(ApiError::PifIsManagementInterface(_))) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(xapi.only_call().name, "PIF.unplug");
    }

    #[test]
    fn db_introduce_sends_every_field() {
        let xapi = MockXapi::new();
        xapi.reply(s("OpaqueRef:new"));

        let mut record = PifRecord::default();
        record.device = String::from("eth2");
        record.network = Ref::<Network>::new("OpaqueRef:net");
        record.mtu = 9000;
        record.vlan = -1;
        Pif::db_introduce(&xapi.session(), &record).wait().unwrap();

        let call = xapi.only_call();
        assert_eq!(call.name, "PIF.db_introduce");
        assert_eq!(call.params.len(), 24);
        assert_eq!(call.params[1], s("eth2"));
        assert_eq!(call.params[2], s("OpaqueRef:net"));
        assert_eq!(call.params[4], s(""));
        assert_eq!(call.params[5], s("9000"));
        assert_eq!(call.params[6], s("-1"));
    }

    #[test]
    #[allow(deprecated)]
    fn deprecated_vlan_calls() {
        let xapi = MockXapi::new();
        xapi.reply(s("OpaqueRef:vlanpif"));
        xapi.reply(s(""));

        let session = xapi.session();
        let vlan_pif = Pif::create_vlan(&session,
                                        "eth0",
                                        &Ref::new("OpaqueRef:net"),
                                        &Ref::new("OpaqueRef:host"),
                                        42)
            .wait()
            .unwrap();
        vlan_pif.destroy(&session).wait().unwrap();

        let calls = xapi.calls();
        assert_eq!(calls[0].name, "PIF.create_VLAN");
        assert_eq!(calls[0].params[4], s("42"));
        assert_eq!(calls[1].name, "PIF.destroy");
        assert_eq!(calls[1].params[1], s("OpaqueRef:vlanpif"));
    }

    #[test]
    fn other_calls() {
        let xapi = MockXapi::new();
        for _ in 0..3 {
            xapi.reply(s(""));
        }

        let session = xapi.session();
        pif().plug(&session).wait().unwrap();
        pif().forget(&session).wait().unwrap();
        pif().db_forget(&session).wait().unwrap();

        let names = xapi.calls().into_iter().map(|c| c.name).collect::<Vec<_>>();
        assert_eq!(names, vec!["PIF.plug", "PIF.forget", "PIF.db_forget"]);
        assert_eq!(Pif::NAME, "PIF");
    }
}
