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

// Virtual machines, templates and snapshots

use api::{HasOtherConfig, Host, Named, Sr, Task, Vdi};
use session::{Session, XenFuture};
use std::collections::HashMap;
use types::{DateTime, Ref};

xenapi_enum! {
    pub enum VmPowerState {
        Halted => "Halted",
        Paused => "Paused",
        Running => "Running",
        Suspended => "Suspended",
    }
}

xenapi_enum! {
    /// What to do when the guest shuts down or reboots
    pub enum OnNormalExit {
        Destroy => "destroy",
        Restart => "restart",
    }
}

xenapi_enum! {
    pub enum OnCrashBehaviour {
        Destroy => "destroy",
        CoredumpAndDestroy => "coredump_and_destroy",
        Restart => "restart",
        CoredumpAndRestart => "coredump_and_restart",
        Preserve => "preserve",
        RenameRestart => "rename_restart",
    }
}

xenapi_record! {
    pub struct VmRecord {
        pub uuid: String => "uuid",
        pub power_state: VmPowerState => "power_state",
        pub name_label: String => "name_label",
        pub name_description: String => "name_description",
        pub user_version: i64 => "user_version",
        pub is_a_template: bool => "is_a_template",
        pub is_default_template: bool => "is_default_template",
        pub suspend_vdi: Ref<Vdi> => "suspend_VDI",
        pub resident_on: Ref<Host> => "resident_on",
        pub affinity: Ref<Host> => "affinity",
        pub memory_overhead: i64 => "memory_overhead",
        pub memory_target: i64 => "memory_target",
        pub memory_static_max: i64 => "memory_static_max",
        pub memory_dynamic_max: i64 => "memory_dynamic_max",
        pub memory_dynamic_min: i64 => "memory_dynamic_min",
        pub memory_static_min: i64 => "memory_static_min",
        pub vcpus_params: HashMap<String, String> => "VCPUs_params",
        pub vcpus_max: i64 => "VCPUs_max",
        pub vcpus_at_startup: i64 => "VCPUs_at_startup",
        pub actions_after_shutdown: OnNormalExit => "actions_after_shutdown",
        pub actions_after_reboot: OnNormalExit => "actions_after_reboot",
        pub actions_after_crash: OnCrashBehaviour => "actions_after_crash",
        pub pv_bootloader: String => "PV_bootloader",
        pub pv_kernel: String => "PV_kernel",
        pub pv_args: String => "PV_args",
        pub hvm_boot_policy: String => "HVM_boot_policy",
        pub hvm_boot_params: HashMap<String, String> => "HVM_boot_params",
        pub platform: HashMap<String, String> => "platform",
        pub other_config: HashMap<String, String> => "other_config",
        pub domid: i64 => "domid",
        pub is_control_domain: bool => "is_control_domain",
        pub is_a_snapshot: bool => "is_a_snapshot",
        pub snapshot_of: Ref<Vm> => "snapshot_of",
        pub snapshots: Vec<Ref<Vm>> => "snapshots",
        pub snapshot_time: DateTime => "snapshot_time",
        pub tags: Vec<String> => "tags",
        pub xenstore_data: HashMap<String, String> => "xenstore_data",
        pub ha_restart_priority: String => "ha_restart_priority",
        pub allowed_operations: Vec<String> => "allowed_operations",
    }
}

xenapi_class! {
    pub enum Vm => "VM", VmRecord
}

impl Named for Vm {}
impl HasOtherConfig for Vm {}

impl Ref<Vm> {
    /// Boot a halted VM wherever xapi sees fit
    pub fn start(&self, session: &Session, start_paused: bool, force: bool) -> XenFuture<()> {
        self.invoke(session, "start", params!(start_paused, force))
    }

    pub fn start_async(&self,
                       session: &Session,
                       start_paused: bool,
                       force: bool)
                       -> XenFuture<Ref<Task>> {
        self.invoke_async(session, "start", params!(start_paused, force))
    }

    pub fn start_on(&self,
                    session: &Session,
                    host: &Ref<Host>,
                    start_paused: bool,
                    force: bool)
                    -> XenFuture<()> {
        self.invoke(session, "start_on", params!(host, start_paused, force))
    }

    pub fn pause(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "pause", params!())
    }

    pub fn unpause(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "unpause", params!())
    }

    /// Ask the guest to shut itself down
    pub fn clean_shutdown(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "clean_shutdown", params!())
    }

    pub fn clean_shutdown_async(&self, session: &Session) -> XenFuture<Ref<Task>> {
        self.invoke_async(session, "clean_shutdown", params!())
    }

    /// Pull the plug
    pub fn hard_shutdown(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "hard_shutdown", params!())
    }

    pub fn hard_shutdown_async(&self, session: &Session) -> XenFuture<Ref<Task>> {
        self.invoke_async(session, "hard_shutdown", params!())
    }

    /// Clean shutdown, falling back to hard shutdown
    pub fn shutdown(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "shutdown", params!())
    }

    pub fn clean_reboot(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "clean_reboot", params!())
    }

    pub fn hard_reboot(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "hard_reboot", params!())
    }

    pub fn suspend(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "suspend", params!())
    }

    pub fn resume(&self, session: &Session, start_paused: bool, force: bool) -> XenFuture<()> {
        self.invoke(session, "resume", params!(start_paused, force))
    }

    pub fn snapshot(&self, session: &Session, new_name: &str) -> XenFuture<Ref<Vm>> {
        self.invoke(session, "snapshot", params!(new_name))
    }

    /// `VM.clone`: a fast copy using the storage backend's cloning
    pub fn clone_vm(&self, session: &Session, new_name: &str) -> XenFuture<Ref<Vm>> {
        self.invoke(session, "clone", params!(new_name))
    }

    /// Full copy with disks placed on `sr`, or on the original SRs if
    /// `sr` is null
    pub fn copy(&self, session: &Session, new_name: &str, sr: &Ref<Sr>) -> XenFuture<Ref<Vm>> {
        self.invoke(session, "copy", params!(new_name, sr))
    }

    /// Create the disks a template's `disks` key asks for
    pub fn provision(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "provision", params!())
    }

    /// Live migrate to another host in the pool
    pub fn pool_migrate(&self,
                        session: &Session,
                        host: &Ref<Host>,
                        options: &HashMap<String, String>)
                        -> XenFuture<()> {
        self.invoke(session, "pool_migrate", params!(host, options))
    }

    pub fn destroy(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "destroy", params!())
    }

    pub fn set_memory_limits(&self,
                             session: &Session,
                             static_min: i64,
                             static_max: i64,
                             dynamic_min: i64,
                             dynamic_max: i64)
                             -> XenFuture<()> {
        self.invoke(session,
                    "set_memory_limits",
                    params!(static_min, static_max, dynamic_min, dynamic_max))
    }

    /// Hotplug or unplug vCPUs on a running VM
    pub fn set_vcpus_number_live(&self, session: &Session, nvcpu: i64) -> XenFuture<()> {
        self.invoke(session, "set_VCPUs_number_live", params!(nvcpu))
    }

    /// Fails with the reason if the VM could not boot on `host`
    pub fn assert_can_boot_here(&self, session: &Session, host: &Ref<Host>) -> XenFuture<()> {
        self.invoke(session, "assert_can_boot_here", params!(host))
    }

    pub fn get_possible_hosts(&self, session: &Session) -> XenFuture<Vec<Ref<Host>>> {
        self.invoke(session, "get_possible_hosts", params!())
    }

    pub fn get_power_state(&self, session: &Session) -> XenFuture<VmPowerState> {
        self.get_field(session, "power_state")
    }
}
