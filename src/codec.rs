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

use std::io;
use tokio_io::{AsyncRead, AsyncWrite};
use tokio_io::codec::Framed;
use tokio_proto::pipeline::ClientProto;
use wire;

/// XenAPI over HTTP/1.1; requests are pipelined on one connection
pub struct XenApiProto {
    host: String,
}

impl XenApiProto {
    pub fn new<S: Into<String>>(host: S) -> XenApiProto {
        XenApiProto { host: host.into() }
    }
}

impl<T: AsyncRead + AsyncWrite + 'static> ClientProto<T> for XenApiProto {
    type Request = wire::Request;
    type Response = wire::Response;

    /// One HTTP connection, requests written back to back
    type Transport = Framed<T, wire::XenApiCodec>;
    type BindTransport = Result<Self::Transport, io::Error>;
    fn bind_transport(&self, io: T) -> Self::BindTransport {
        Ok(io.framed(wire::XenApiCodec::new(self.host.clone())))
    }
}
