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

// 802.1Q VLANs

use api::{HasOtherConfig, Network, Pif};
use session::{Session, XenFuture};
use std::collections::HashMap;
use types::Ref;

xenapi_record! {
    pub struct VlanRecord {
        pub uuid: String => "uuid",
        pub tagged_pif: Ref<Pif> => "tagged_PIF",
        pub untagged_pif: Ref<Pif> => "untagged_PIF",
        pub tag: i64 => "tag",
        pub other_config: HashMap<String, String> => "other_config",
    }
}

xenapi_class! {
    pub enum Vlan => "VLAN", VlanRecord
}

impl HasOtherConfig for Vlan {}

impl Vlan {
    /// Put a VLAN with `tag` on `tagged_pif`, carrying `network`
    pub fn create(session: &Session,
                  tagged_pif: &Ref<Pif>,
                  tag: i64,
                  network: &Ref<Network>)
                  -> XenFuture<Ref<Vlan>> {
        session.call("VLAN.create", params!(tagged_pif, tag, network))
    }
}

impl Ref<Vlan> {
    /// Also destroys the untagged PIF
    pub fn destroy(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "destroy", params!())
    }
}
