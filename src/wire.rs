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

use bytes::BytesMut;
use std::io;
use std::str;
use tokio_io::codec::{Decoder, Encoder};

/// XenAPI envelope fields
pub const STATUS: &'static str = "Status";
pub const VALUE: &'static str = "Value";
pub const ERROR_DESCRIPTION: &'static str = "ErrorDescription";

/// XenAPI envelope status values
pub const SUCCESS: &'static str = "Success";
pub const FAILURE: &'static str = "Failure";

/// The reference that points at nothing
pub const NULL_REF: &'static str = "OpaqueRef:NULL";

/// Prefix that turns a call into one returning a task
pub const ASYNC_PREFIX: &'static str = "Async.";

/// Values sent along with a login
pub const API_VERSION: &'static str = "1.0";
pub const ORIGINATOR: &'static str = "xenapi-rs";
pub const USER_AGENT: &'static str = concat!("xenapi-rs/", env!("CARGO_PKG_VERSION"));

/// Miscellaneous protocol values
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_PATH: &'static str = "/";
pub const LOCAL_SOCKET: &'static str = "/var/lib/xcp/xapi";
pub const MAX_HEADER_SIZE: usize = 64 * 1024;

/// XenAPI error codes
pub const SESSION_AUTHENTICATION_FAILED: &'static str = "SESSION_AUTHENTICATION_FAILED";
pub const SESSION_AUTHORIZATION_FAILED: &'static str = "SESSION_AUTHORIZATION_FAILED";
pub const SESSION_INVALID: &'static str = "SESSION_INVALID";
pub const SESSION_NOT_REGISTERED: &'static str = "SESSION_NOT_REGISTERED";
pub const HANDLE_INVALID: &'static str = "HANDLE_INVALID";
pub const UUID_INVALID: &'static str = "UUID_INVALID";
pub const HOST_IS_SLAVE: &'static str = "HOST_IS_SLAVE";
pub const HOST_STILL_BOOTING: &'static str = "HOST_STILL_BOOTING";
pub const HOST_OFFLINE: &'static str = "HOST_OFFLINE";
pub const HOST_IN_EMERGENCY_MODE: &'static str = "HOST_IN_EMERGENCY_MODE";
pub const HOST_CANNOT_DESTROY_SELF: &'static str = "HOST_CANNOT_DESTROY_SELF";
pub const CANNOT_EVACUATE_HOST: &'static str = "CANNOT_EVACUATE_HOST";
pub const CANNOT_CONTACT_HOST: &'static str = "CANNOT_CONTACT_HOST";
pub const MESSAGE_METHOD_UNKNOWN: &'static str = "MESSAGE_METHOD_UNKNOWN";
pub const MESSAGE_PARAMETER_COUNT_MISMATCH: &'static str = "MESSAGE_PARAMETER_COUNT_MISMATCH";
pub const MESSAGE_DEPRECATED: &'static str = "MESSAGE_DEPRECATED";
pub const FIELD_TYPE_ERROR: &'static str = "FIELD_TYPE_ERROR";
pub const INTERNAL_ERROR: &'static str = "INTERNAL_ERROR";
pub const OPERATION_NOT_ALLOWED: &'static str = "OPERATION_NOT_ALLOWED";
pub const OTHER_OPERATION_IN_PROGRESS: &'static str = "OTHER_OPERATION_IN_PROGRESS";
pub const PERMISSION_DENIED: &'static str = "PERMISSION_DENIED";
pub const RBAC_PERMISSION_DENIED: &'static str = "RBAC_PERMISSION_DENIED";
pub const LICENCE_RESTRICTION: &'static str = "LICENCE_RESTRICTION";
pub const VLAN_TAG_INVALID: &'static str = "VLAN_TAG_INVALID";
pub const PIF_IS_PHYSICAL: &'static str = "PIF_IS_PHYSICAL";
pub const PIF_IS_VLAN: &'static str = "PIF_IS_VLAN";
pub const PIF_ALREADY_BONDED: &'static str = "PIF_ALREADY_BONDED";
pub const PIF_VLAN_EXISTS: &'static str = "PIF_VLAN_EXISTS";
pub const PIF_IS_MANAGEMENT_INTERFACE: &'static str = "PIF_IS_MANAGEMENT_INTERFACE";
pub const PIF_DOES_NOT_ALLOW_UNPLUG: &'static str = "PIF_DOES_NOT_ALLOW_UNPLUG";
pub const PIF_CONFIGURATION_ERROR: &'static str = "PIF_CONFIGURATION_ERROR";
pub const PIF_TUNNEL_STILL_EXISTS: &'static str = "PIF_TUNNEL_STILL_EXISTS";
pub const CANNOT_ADD_VLAN_TO_BOND_SLAVE: &'static str = "CANNOT_ADD_VLAN_TO_BOND_SLAVE";
pub const CANNOT_ADD_TUNNEL_TO_BOND_SLAVE: &'static str = "CANNOT_ADD_TUNNEL_TO_BOND_SLAVE";
pub const NETWORK_ALREADY_CONNECTED: &'static str = "NETWORK_ALREADY_CONNECTED";
pub const VM_BAD_POWER_STATE: &'static str = "VM_BAD_POWER_STATE";
pub const VM_IS_TEMPLATE: &'static str = "VM_IS_TEMPLATE";
pub const VM_HVM_REQUIRED: &'static str = "VM_HVM_REQUIRED";
pub const VM_MISSING_PV_DRIVERS: &'static str = "VM_MISSING_PV_DRIVERS";
pub const SR_FULL: &'static str = "SR_FULL";
pub const SR_HAS_PBD: &'static str = "SR_HAS_PBD";
pub const SR_NOT_EMPTY: &'static str = "SR_NOT_EMPTY";
pub const VDI_IN_USE: &'static str = "VDI_IN_USE";
pub const VDI_IS_A_PHYSICAL_DEVICE: &'static str = "VDI_IS_A_PHYSICAL_DEVICE";
pub const VDI_READONLY: &'static str = "VDI_READONLY";
pub const VDI_MISSING: &'static str = "VDI_MISSING";
pub const JOINING_HOST_CANNOT_CONTAIN_SHARED_SRS: &'static str =
    "JOINING_HOST_CANNOT_CONTAIN_SHARED_SRS";
pub const JOINING_HOST_CANNOT_HAVE_RUNNING_VMS: &'static str =
    "JOINING_HOST_CANNOT_HAVE_RUNNING_VMS";
pub const HA_IS_ENABLED: &'static str = "HA_IS_ENABLED";
pub const HA_NOT_ENABLED: &'static str = "HA_NOT_ENABLED";
pub const TASK_CANCELLED: &'static str = "TASK_CANCELLED";
pub const EVENTS_LOST: &'static str = "EVENTS_LOST";
pub const EVENT_FROM_TOKEN_PARSE_FAILURE: &'static str = "EVENT_FROM_TOKEN_PARSE_FAILURE";

/// An XML-RPC document to be POSTed to xapi
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub body: Vec<u8>,
}

impl Request {
    pub fn new<B: Into<Vec<u8>>>(body: B) -> Request {
        Request { body: body.into() }
    }
}

/// A complete HTTP response from xapi
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    pub reason: String,
    pub body: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Framing {
    Length(usize),
    Chunked,
    Eof,
}

/// The parsed status line and the headers we care about
#[derive(Clone, Debug, PartialEq)]
struct Head {
    status: u16,
    reason: String,
    framing: Framing,
}

fn invalid<S: Into<String>>(msg: S) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

fn find_crlf(bytes: &[u8]) -> Option<usize> {
    bytes.windows(2).position(|w| w == b"\r\n")
}

/// Length of the header block including the blank line, if complete
fn find_head_end(bytes: &[u8]) -> Option<usize> {
    bytes.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

impl Head {
    fn parse(bytes: &[u8]) -> io::Result<Head> {
        let text = str::from_utf8(bytes).map_err(|_| invalid("response header is not utf-8"))?;
        let mut lines = text.split("\r\n");

        let status_line = lines.next().unwrap_or("");
        let mut parts = status_line.splitn(3, ' ');
        if !parts.next().map(|v| v.starts_with("HTTP/1.")).unwrap_or(false) {
            return Err(invalid(format!("bad status line: {:?}", status_line)));
        }
        let status = parts.next()
            .and_then(|s| s.parse::<u16>().ok())
            .ok_or_else(|| invalid(format!("bad status code: {:?}", status_line)))?;
        let reason = parts.next().unwrap_or("").to_owned();

        let mut framing = match status {
            204 | 304 => Framing::Length(0),
            _ => Framing::Eof,
        };

        for line in lines.filter(|l| !l.is_empty()) {
            let mut kv = line.splitn(2, ':');
            let name = kv.next().unwrap_or("").trim();
            let value = match kv.next() {
                Some(v) => v.trim(),
                None => return Err(invalid(format!("bad header: {:?}", line))),
            };

            if name.eq_ignore_ascii_case("transfer-encoding") {
                if value.to_ascii_lowercase().contains("chunked") {
                    framing = Framing::Chunked;
                }
            } else if name.eq_ignore_ascii_case("content-length") {
                let len = value.parse::<usize>()
                    .map_err(|_| invalid(format!("bad content length: {:?}", value)))?;
                // Transfer-Encoding always wins over Content-Length
                if framing != Framing::Chunked {
                    framing = Framing::Length(len);
                }
            }
        }

        Ok(Head {
               status: status,
               reason: reason,
               framing: framing,
           })
    }
}

/// Decode a chunked body, returning it and the number of bytes it spanned
fn decode_chunked(bytes: &[u8]) -> io::Result<Option<(Vec<u8>, usize)>> {
    let mut pos = 0;
    let mut body = Vec::new();

    loop {
        let line_end = match find_crlf(&bytes[pos..]) {
            Some(n) => pos + n,
            None => return Ok(None),
        };
        let line = str::from_utf8(&bytes[pos..line_end])
            .map_err(|_| invalid("chunk size is not utf-8"))?;
        let size = line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size, 16)
            .map_err(|_| invalid(format!("bad chunk size: {:?}", line)))?;
        pos = line_end + 2;

        if size == 0 {
            // skip any trailers up to the closing blank line
            loop {
                let end = match find_crlf(&bytes[pos..]) {
                    Some(n) => pos + n,
                    None => return Ok(None),
                };
                let blank = end == pos;
                pos = end + 2;
                if blank {
                    return Ok(Some((body, pos)));
                }
            }
        }

        let end = pos.checked_add(size)
            .and_then(|n| n.checked_add(2))
            .ok_or_else(|| invalid(format!("chunk size too large: {:?}", line)))?;
        if bytes.len() < end {
            return Ok(None);
        }
        body.extend_from_slice(&bytes[pos..pos + size]);
        pos += size;
        if &bytes[pos..pos + 2] != b"\r\n" {
            return Err(invalid("chunk is missing its terminator"));
        }
        pos += 2;
    }
}

/// This tracks our wire codec
#[derive(Clone, Debug)]
pub struct XenApiCodec {
    host: String,
    path: String,
}

impl XenApiCodec {
    pub fn new<S: Into<String>>(host: S) -> XenApiCodec {
        XenApiCodec {
            host: host.into(),
            path: DEFAULT_PATH.to_owned(),
        }
    }
}

impl Decoder for XenApiCodec {
    type Item = Response;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<Response>> {
        // We must have the full header block
        let head_len = match find_head_end(&buf) {
            Some(n) => n,
            None => {
                if buf.len() > MAX_HEADER_SIZE {
                    return Err(invalid("response header too large"));
                }
                return Ok(None);
            }
        };

        if head_len > MAX_HEADER_SIZE {
            return Err(invalid("response header too large"));
        }

        let head = Head::parse(&buf[..head_len])?;

        // informational responses carry no body, the real one follows
        if head.status / 100 == 1 {
            trace!("skipping informational response {}", head.status);
            buf.split_to(head_len);
            return self.decode(buf);
        }

        let (body, used) = match head.framing {
            Framing::Length(len) => {
                let total = head_len.checked_add(len)
                    .ok_or_else(|| invalid("content length too large"))?;
                if buf.len() < total {
                    // not a full message
                    return Ok(None);
                }
                (buf[head_len..head_len + len].to_vec(), len)
            }
            Framing::Chunked => {
                match decode_chunked(&buf[head_len..])? {
                    Some(chunked) => chunked,
                    None => return Ok(None),
                }
            }
            // only known once the peer hangs up
            Framing::Eof => return Ok(None),
        };

        buf.split_to(head_len + used);
        Ok(Some(Response {
                    status: head.status,
                    reason: head.reason,
                    body: body,
                }))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> io::Result<Option<Response>> {
        if let Some(response) = self.decode(buf)? {
            return Ok(Some(response));
        }

        if buf.is_empty() {
            return Ok(None);
        }

        let head_len = match find_head_end(&buf) {
            Some(n) => n,
            None => {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof,
                                          "connection closed inside response header"))
            }
        };
        let head = Head::parse(&buf[..head_len])?;
        if head.framing != Framing::Eof {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof,
                                      "connection closed inside response body"));
        }

        let msg = buf.take();
        Ok(Some(Response {
                    status: head.status,
                    reason: head.reason,
                    body: msg[head_len..].to_vec(),
                }))
    }
}

impl Encoder for XenApiCodec {
    type Item = Request;
    type Error = io::Error;

    fn encode(&mut self, req: Request, buf: &mut BytesMut) -> io::Result<()> {
        let head = format!("POST {} HTTP/1.1\r\n\
                            Host: {}\r\n\
                            User-Agent: {}\r\n\
                            Content-Type: text/xml\r\n\
                            Content-Length: {}\r\n\r\n",
                           self.path,
                           self.host,
                           USER_AGENT,
                           req.body.len());
        buf.extend_from_slice(head.as_bytes());
        buf.extend_from_slice(&req.body);
        Ok(())
    }
}
