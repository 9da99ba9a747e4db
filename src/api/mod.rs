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

// The XenAPI object classes.
//
// Every class is an uninhabited type used to tag `Ref<C>`. Operations
// that act on one object are methods on `Ref<C>`; the ones that act on
// the class as a whole (constructors, `get_all`, ...) are associated
// functions on the class type.
//
// ```no_run
// # use xenapi::Session;
// # use xenapi::api::{Class, Pif};
// # fn f(session: Session) {
// let pifs = Pif::get_all(&session);
// # }
// ```

use session::{Session, XenFuture};
use std::collections::HashMap;
use types::{FromValue, Ref, ToValue};

/// Declare a class: its tag type and the name xapi knows it by
macro_rules! xenapi_class {
    ($(#[$meta:meta])* pub enum $name:ident => $wire:expr, $record:ty) => {
        $(#[$meta])*
        pub enum $name {}

        impl $crate::api::Class for $name {
            const NAME: &'static str = $wire;
            type Record = $record;
        }
    }
}

pub mod bond;
pub mod event;
pub mod host;
pub mod network;
pub mod pif;
pub mod pool;
pub mod sr;
pub mod task;
pub mod tunnel;
pub mod vdi;
pub mod vlan;
pub mod vm;

pub use self::bond::{Bond, BondMode, BondRecord};
pub use self::event::{Event, EventBatch, EventOperation, EventRecord};
pub use self::host::{Host, HostRecord};
pub use self::network::{Network, NetworkPurpose, NetworkRecord};
pub use self::pif::{IpConfigurationMode, Ipv6ConfigurationMode, Pif, PifRecord,
                    PrimaryAddressType};
pub use self::pool::{Pool, PoolRecord};
pub use self::sr::{Sr, SrCreation, SrRecord};
pub use self::task::{Task, TaskRecord, TaskStatus};
pub use self::tunnel::{Tunnel, TunnelProtocol, TunnelRecord};
pub use self::vdi::{OnBoot, Vdi, VdiRecord, VdiType};
pub use self::vlan::{Vlan, VlanRecord};
pub use self::vm::{Vm, VmPowerState, VmRecord};

/// A remote object class
pub trait Class: Sized + 'static {
    /// What xapi calls the class, e.g. `PIF` or `pool`
    const NAME: &'static str;
    type Record: FromValue + 'static;

    /// Full wire name of a message on this class
    fn message(name: &str) -> String {
        format!("{}.{}", Self::NAME, name)
    }

    fn get_all(session: &Session) -> XenFuture<Vec<Ref<Self>>> {
        session.call(&Self::message("get_all"), params!())
    }

    fn get_all_records(session: &Session) -> XenFuture<HashMap<Ref<Self>, Self::Record>> {
        session.call(&Self::message("get_all_records"), params!())
    }

    fn get_by_uuid(session: &Session, uuid: &str) -> XenFuture<Ref<Self>> {
        session.call(&Self::message("get_by_uuid"), params!(uuid))
    }
}

/// Classes whose objects carry `name_label` and `name_description`
pub trait Named: Class {
    fn get_by_name_label(session: &Session, label: &str) -> XenFuture<Vec<Ref<Self>>> {
        session.call(&Self::message("get_by_name_label"), params!(label))
    }
}

/// Classes whose objects carry a free-form `other_config` map
pub trait HasOtherConfig: Class {}

impl<C: Class> Ref<C> {
    /// Call `<Class>.<name>` with this object as the first argument
    fn invoke<T>(&self, session: &Session, name: &str, mut params: Vec<::xmlrpc::Value>) -> XenFuture<T>
        where T: FromValue + 'static
    {
        params.insert(0, self.to_value());
        session.call(&C::message(name), params)
    }

    /// Same as `invoke`, run as a server side task
    fn invoke_async(&self,
                    session: &Session,
                    name: &str,
                    mut params: Vec<::xmlrpc::Value>)
                    -> XenFuture<Ref<Task>> {
        params.insert(0, self.to_value());
        session.call_async(&C::message(name), params)
    }

    pub fn get_record(&self, session: &Session) -> XenFuture<C::Record> {
        self.invoke(session, "get_record", params!())
    }

    pub fn get_uuid(&self, session: &Session) -> XenFuture<String> {
        self.get_field(session, "uuid")
    }

    /// Read one field through `<Class>.get_<field>`
    pub fn get_field<T>(&self, session: &Session, field: &str) -> XenFuture<T>
        where T: FromValue + 'static
    {
        self.invoke(session, &format!("get_{}", field), params!())
    }

    /// Write one field through `<Class>.set_<field>`
    pub fn set_field<V: ToValue>(&self, session: &Session, field: &str, value: V) -> XenFuture<()> {
        self.invoke(session, &format!("set_{}", field), params!(value))
    }
}

impl<C: Named> Ref<C> {
    pub fn get_name_label(&self, session: &Session) -> XenFuture<String> {
        self.get_field(session, "name_label")
    }

    pub fn set_name_label(&self, session: &Session, label: &str) -> XenFuture<()> {
        self.set_field(session, "name_label", label)
    }

    pub fn get_name_description(&self, session: &Session) -> XenFuture<String> {
        self.get_field(session, "name_description")
    }

    pub fn set_name_description(&self, session: &Session, description: &str) -> XenFuture<()> {
        self.set_field(session, "name_description", description)
    }
}

impl<C: HasOtherConfig> Ref<C> {
    pub fn get_other_config(&self, session: &Session) -> XenFuture<HashMap<String, String>> {
        self.get_field(session, "other_config")
    }

    pub fn set_other_config(&self,
                            session: &Session,
                            config: &HashMap<String, String>)
                            -> XenFuture<()> {
        self.set_field(session, "other_config", config)
    }

    pub fn add_to_other_config(&self, session: &Session, key: &str, value: &str) -> XenFuture<()> {
        self.invoke(session, "add_to_other_config", params!(key, value))
    }

    pub fn remove_from_other_config(&self, session: &Session, key: &str) -> XenFuture<()> {
        self.invoke(session, "remove_from_other_config", params!(key))
    }
}
