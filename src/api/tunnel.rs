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

// Tunnels between hosts over a transport interface

use api::{HasOtherConfig, Network, Pif};
use session::{Session, XenFuture};
use std::collections::HashMap;
use types::Ref;

xenapi_enum! {
    pub enum TunnelProtocol {
        Gre => "gre",
        Vxlan => "vxlan",
    }
}

xenapi_record! {
    pub struct TunnelRecord {
        pub uuid: String => "uuid",
        pub access_pif: Ref<Pif> => "access_PIF",
        pub transport_pif: Ref<Pif> => "transport_PIF",
        pub status: HashMap<String, String> => "status",
        pub other_config: HashMap<String, String> => "other_config",
        pub protocol: TunnelProtocol => "protocol",
    }
}

xenapi_class! {
    pub enum Tunnel => "tunnel", TunnelRecord
}

impl HasOtherConfig for Tunnel {}

impl Tunnel {
    pub fn create(session: &Session,
                  transport_pif: &Ref<Pif>,
                  network: &Ref<Network>,
                  protocol: TunnelProtocol)
                  -> XenFuture<Ref<Tunnel>> {
        session.call("tunnel.create", params!(transport_pif, network, protocol))
    }
}

impl Ref<Tunnel> {
    pub fn destroy(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "destroy", params!())
    }

    pub fn set_protocol(&self, session: &Session, protocol: TunnelProtocol) -> XenFuture<()> {
        self.set_field(session, "protocol", protocol)
    }
}
