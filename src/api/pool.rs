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

// Pool wide configuration and membership

use api::{HasOtherConfig, Host, Named, Network, Pif, Sr, Task, Vdi};
use session::{Session, XenFuture};
use std::collections::HashMap;
use types::Ref;

xenapi_record! {
    pub struct PoolRecord {
        pub uuid: String => "uuid",
        pub name_label: String => "name_label",
        pub name_description: String => "name_description",
        pub master: Ref<Host> => "master",
        pub default_sr: Ref<Sr> => "default_SR",
        pub suspend_image_sr: Ref<Sr> => "suspend_image_SR",
        pub crash_dump_sr: Ref<Sr> => "crash_dump_SR",
        pub other_config: HashMap<String, String> => "other_config",
        pub ha_enabled: bool => "ha_enabled",
        pub ha_configuration: HashMap<String, String> => "ha_configuration",
        pub ha_statefiles: Vec<String> => "ha_statefiles",
        pub ha_host_failures_to_tolerate: i64 => "ha_host_failures_to_tolerate",
        pub ha_plan_exists_for: i64 => "ha_plan_exists_for",
        pub ha_allow_overcommit: bool => "ha_allow_overcommit",
        pub ha_overcommitted: bool => "ha_overcommitted",
        pub ha_cluster_stack: String => "ha_cluster_stack",
        pub tags: Vec<String> => "tags",
        pub gui_config: HashMap<String, String> => "gui_config",
        pub redo_log_enabled: bool => "redo_log_enabled",
        pub redo_log_vdi: Ref<Vdi> => "redo_log_vdi",
        pub vswitch_controller: String => "vswitch_controller",
        pub restrictions: HashMap<String, String> => "restrictions",
        pub metadata_vdis: Vec<Ref<Vdi>> => "metadata_VDIs",
        pub guest_agent_config: HashMap<String, String> => "guest_agent_config",
        pub cpu_info: HashMap<String, String> => "cpu_info",
        pub policy_no_vendor_device: bool => "policy_no_vendor_device",
        pub live_patching_disabled: bool => "live_patching_disabled",
    }
}

xenapi_class! {
    /// There is exactly one pool object, even for a standalone host
    pub enum Pool => "pool", PoolRecord
}

impl Named for Pool {}
impl HasOtherConfig for Pool {}

impl Pool {
    /// Make the host this session is logged in to a member of the pool
    /// whose master is at `master_address`
    pub fn join(session: &Session,
                master_address: &str,
                master_username: &str,
                master_password: &str)
                -> XenFuture<()> {
        session.call("pool.join",
                     params!(master_address, master_username, master_password))
    }

    pub fn join_async(session: &Session,
                      master_address: &str,
                      master_username: &str,
                      master_password: &str)
                      -> XenFuture<Ref<Task>> {
        session.call_async("pool.join",
                           params!(master_address, master_username, master_password))
    }

    /// Join even if the CPUs or licences do not match
    pub fn join_force(session: &Session,
                      master_address: &str,
                      master_username: &str,
                      master_password: &str)
                      -> XenFuture<()> {
        session.call("pool.join_force",
                     params!(master_address, master_username, master_password))
    }

    /// Remove `host` from the pool. The host reboots and forgets all its
    /// VMs and local storage.
    pub fn eject(session: &Session, host: &Ref<Host>) -> XenFuture<()> {
        session.call("pool.eject", params!(host))
    }

    /// Tell a slave that has lost its master to take over. Needs a
    /// session from `Session::slave_local_login_with_password`.
    pub fn emergency_transition_to_master(session: &Session) -> XenFuture<()> {
        session.call("pool.emergency_transition_to_master", params!())
    }

    /// Point a slave at a new master address
    pub fn emergency_reset_master(session: &Session, master_address: &str) -> XenFuture<()> {
        session.call("pool.emergency_reset_master", params!(master_address))
    }

    /// Ask the slaves still in emergency mode to reset to this master;
    /// returns the ones that did
    pub fn recover_slaves(session: &Session) -> XenFuture<Vec<Ref<Host>>> {
        session.call("pool.recover_slaves", params!())
    }

    /// Create a VLAN on every host's `device` interface
    pub fn create_vlan(session: &Session,
                       device: &str,
                       network: &Ref<Network>,
                       vlan: i64)
                       -> XenFuture<Vec<Ref<Pif>>> {
        session.call("pool.create_VLAN", params!(device, network, vlan))
    }

    /// Create a VLAN on every host's interface with the same device as `pif`
    pub fn create_vlan_from_pif(session: &Session,
                                pif: &Ref<Pif>,
                                network: &Ref<Network>,
                                vlan: i64)
                                -> XenFuture<Vec<Ref<Pif>>> {
        session.call("pool.create_VLAN_from_PIF", params!(pif, network, vlan))
    }

    /// Move every host's management interface onto `network`
    pub fn management_reconfigure(session: &Session, network: &Ref<Network>) -> XenFuture<()> {
        session.call("pool.management_reconfigure", params!(network))
    }

    pub fn enable_ha(session: &Session,
                     heartbeat_srs: &[Ref<Sr>],
                     configuration: &HashMap<String, String>)
                     -> XenFuture<()> {
        session.call("pool.enable_ha", params!(heartbeat_srs, configuration))
    }

    pub fn disable_ha(session: &Session) -> XenFuture<()> {
        session.call("pool.disable_ha", params!())
    }

    /// Stop HA restarting VMs for `seconds`
    pub fn ha_prevent_restarts_for(session: &Session, seconds: i64) -> XenFuture<()> {
        session.call("pool.ha_prevent_restarts_for", params!(seconds))
    }

    pub fn ha_compute_max_host_failures_to_tolerate(session: &Session) -> XenFuture<i64> {
        session.call("pool.ha_compute_max_host_failures_to_tolerate", params!())
    }

    /// Push the master's database to every slave
    pub fn sync_database(session: &Session) -> XenFuture<()> {
        session.call("pool.sync_database", params!())
    }

    /// Hand mastership over to `host`
    pub fn designate_new_master(session: &Session, host: &Ref<Host>) -> XenFuture<()> {
        session.call("pool.designate_new_master", params!(host))
    }

    pub fn enable_redo_log(session: &Session, sr: &Ref<Sr>) -> XenFuture<()> {
        session.call("pool.enable_redo_log", params!(sr))
    }

    pub fn disable_redo_log(session: &Session) -> XenFuture<()> {
        session.call("pool.disable_redo_log", params!())
    }

    /// Use the OpenFlow controller at `address`, or none if empty
    pub fn set_vswitch_controller(session: &Session, address: &str) -> XenFuture<()> {
        session.call("pool.set_vswitch_controller", params!(address))
    }
}

impl Ref<Pool> {
    pub fn get_master(&self, session: &Session) -> XenFuture<Ref<Host>> {
        self.get_field(session, "master")
    }

    pub fn set_ha_host_failures_to_tolerate(&self, session: &Session, value: i64) -> XenFuture<()> {
        self.set_field(session, "ha_host_failures_to_tolerate", value)
    }

    pub fn set_default_sr(&self, session: &Session, sr: &Ref<Sr>) -> XenFuture<()> {
        self.set_field(session, "default_SR", sr)
    }

    pub fn set_suspend_image_sr(&self, session: &Session, sr: &Ref<Sr>) -> XenFuture<()> {
        self.set_field(session, "suspend_image_SR", sr)
    }

    pub fn set_crash_dump_sr(&self, session: &Session, sr: &Ref<Sr>) -> XenFuture<()> {
        self.set_field(session, "crash_dump_SR", sr)
    }

    /// Authenticate users against an external directory, e.g. `AD`
    pub fn enable_external_auth(&self,
                                session: &Session,
                                config: &HashMap<String, String>,
                                service_name: &str,
                                auth_type: &str)
                                -> XenFuture<()> {
        self.invoke(session,
                    "enable_external_auth",
                    params!(config, service_name, auth_type))
    }

    pub fn disable_external_auth(&self,
                                 session: &Session,
                                 config: &HashMap<String, String>)
                                 -> XenFuture<()> {
        self.invoke(session, "disable_external_auth", params!(config))
    }

    pub fn enable_local_storage_caching(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "enable_local_storage_caching", params!())
    }

    pub fn disable_local_storage_caching(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "disable_local_storage_caching", params!())
    }

    pub fn get_license_state(&self, session: &Session) -> XenFuture<HashMap<String, String>> {
        self.invoke(session, "get_license_state", params!())
    }

    /// Apply `edition` to every host in the pool
    pub fn apply_edition(&self, session: &Session, edition: &str) -> XenFuture<()> {
        self.invoke(session, "apply_edition", params!(edition))
    }
}
