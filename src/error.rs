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

use quick_xml;
use std::error;
use std::fmt;
use std::io;
use std::result;
use wire;

macro_rules! api_errors {
    ($($id:ident => $code:path,)*) => {
        /// A failure reported by xapi, keyed by its error code. Every
        /// variant carries the parameters that followed the code.
        #[derive(Clone, Debug, PartialEq)]
        pub enum ApiError {
            $($id(Vec<String>),)*
            Unknown(String, Vec<String>),
        }

        impl ApiError {
            /// Build from an `ErrorDescription`: the code then its parameters
            pub fn from_description(mut description: Vec<String>) -> ApiError {
                if description.is_empty() {
                    return ApiError::Unknown(String::new(), description);
                }
                let code = description.remove(0);
                $(if code == $code {
                    return ApiError::$id(description);
                })*
                ApiError::Unknown(code, description)
            }

            pub fn code(&self) -> &str {
                match *self {
                    $(ApiError::$id(_) => $code,)*
                    ApiError::Unknown(ref code, _) => code,
                }
            }

            pub fn params(&self) -> &[String] {
                match *self {
                    $(ApiError::$id(ref params) => params,)*
                    ApiError::Unknown(_, ref params) => params,
                }
            }
        }
    }
}

api_errors! {
    SessionAuthenticationFailed => wire::SESSION_AUTHENTICATION_FAILED,
    SessionAuthorizationFailed => wire::SESSION_AUTHORIZATION_FAILED,
    SessionInvalid => wire::SESSION_INVALID,
    SessionNotRegistered => wire::SESSION_NOT_REGISTERED,
    HandleInvalid => wire::HANDLE_INVALID,
    UuidInvalid => wire::UUID_INVALID,
    HostIsSlave => wire::HOST_IS_SLAVE,
    HostStillBooting => wire::HOST_STILL_BOOTING,
    HostOffline => wire::HOST_OFFLINE,
    HostInEmergencyMode => wire::HOST_IN_EMERGENCY_MODE,
    HostCannotDestroySelf => wire::HOST_CANNOT_DESTROY_SELF,
    CannotEvacuateHost => wire::CANNOT_EVACUATE_HOST,
    CannotContactHost => wire::CANNOT_CONTACT_HOST,
    MessageMethodUnknown => wire::MESSAGE_METHOD_UNKNOWN,
    MessageParameterCountMismatch => wire::MESSAGE_PARAMETER_COUNT_MISMATCH,
    MessageDeprecated => wire::MESSAGE_DEPRECATED,
    FieldTypeError => wire::FIELD_TYPE_ERROR,
    InternalError => wire::INTERNAL_ERROR,
    OperationNotAllowed => wire::OPERATION_NOT_ALLOWED,
    OtherOperationInProgress => wire::OTHER_OPERATION_IN_PROGRESS,
    PermissionDenied => wire::PERMISSION_DENIED,
    RbacPermissionDenied => wire::RBAC_PERMISSION_DENIED,
    LicenceRestriction => wire::LICENCE_RESTRICTION,
    VlanTagInvalid => wire::VLAN_TAG_INVALID,
    PifIsPhysical => wire::PIF_IS_PHYSICAL,
    PifIsVlan => wire::PIF_IS_VLAN,
    PifAlreadyBonded => wire::PIF_ALREADY_BONDED,
    PifVlanExists => wire::PIF_VLAN_EXISTS,
    PifIsManagementInterface => wire::PIF_IS_MANAGEMENT_INTERFACE,
    PifDoesNotAllowUnplug => wire::PIF_DOES_NOT_ALLOW_UNPLUG,
    PifConfigurationError => wire::PIF_CONFIGURATION_ERROR,
    PifTunnelStillExists => wire::PIF_TUNNEL_STILL_EXISTS,
    CannotAddVlanToBondSlave => wire::CANNOT_ADD_VLAN_TO_BOND_SLAVE,
    CannotAddTunnelToBondSlave => wire::CANNOT_ADD_TUNNEL_TO_BOND_SLAVE,
    NetworkAlreadyConnected => wire::NETWORK_ALREADY_CONNECTED,
    VmBadPowerState => wire::VM_BAD_POWER_STATE,
    VmIsTemplate => wire::VM_IS_TEMPLATE,
    VmHvmRequired => wire::VM_HVM_REQUIRED,
    VmMissingPvDrivers => wire::VM_MISSING_PV_DRIVERS,
    SrFull => wire::SR_FULL,
    SrHasPbd => wire::SR_HAS_PBD,
    SrNotEmpty => wire::SR_NOT_EMPTY,
    VdiInUse => wire::VDI_IN_USE,
    VdiIsAPhysicalDevice => wire::VDI_IS_A_PHYSICAL_DEVICE,
    VdiReadonly => wire::VDI_READONLY,
    VdiMissing => wire::VDI_MISSING,
    JoiningHostCannotContainSharedSrs => wire::JOINING_HOST_CANNOT_CONTAIN_SHARED_SRS,
    JoiningHostCannotHaveRunningVms => wire::JOINING_HOST_CANNOT_HAVE_RUNNING_VMS,
    HaIsEnabled => wire::HA_IS_ENABLED,
    HaNotEnabled => wire::HA_NOT_ENABLED,
    TaskCancelled => wire::TASK_CANCELLED,
    EventsLost => wire::EVENTS_LOST,
    EventFromTokenParseFailure => wire::EVENT_FROM_TOKEN_PARSE_FAILURE,
}

impl ApiError {
    /// When a slave is asked to do a master's job it names the master
    pub fn master_address(&self) -> Option<&str> {
        match *self {
            ApiError::HostIsSlave(ref params) => params.get(0).map(|s| s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let params = self.params();
        if params.is_empty() {
            write!(f, "{}", self.code())
        } else {
            write!(f, "{}: {}", self.code(), params.join(", "))
        }
    }
}

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Http(u16, String),
    Xml(String),
    Fault(i64, String),
    Api(ApiError),
    Decode(String),
    InvalidTarget(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => write!(f, "I/O error: {}", err),
            Error::Http(status, ref reason) => write!(f, "HTTP {}: {}", status, reason),
            Error::Xml(ref msg) => write!(f, "malformed XML-RPC: {}", msg),
            Error::Fault(code, ref msg) => write!(f, "XML-RPC fault {}: {}", code, msg),
            Error::Api(ref err) => write!(f, "{}", err),
            Error::Decode(ref msg) => write!(f, "unexpected value: {}", msg),
            Error::InvalidTarget(ref msg) => write!(f, "invalid target: {}", msg),
        }
    }
}

impl error::Error for Error {
    fn description(&self) -> &str {
        match *self {
            Error::Io(_) => "I/O error",
            Error::Http(..) => "HTTP error",
            Error::Xml(_) => "malformed XML-RPC",
            Error::Fault(..) => "XML-RPC fault",
            Error::Api(ref err) => err.code(),
            Error::Decode(_) => "unexpected value",
            Error::InvalidTarget(_) => "invalid target",
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Error {
        Error::Xml(err.to_string())
    }
}

impl From<quick_xml::escape::EscapeError> for Error {
    fn from(err: quick_xml::escape::EscapeError) -> Error {
        Error::Xml(err.to_string())
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Error {
        Error::Api(err)
    }
}

pub type Result<T> = result::Result<T, Error>;
