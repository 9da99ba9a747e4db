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

extern crate bytes;
extern crate futures;
#[macro_use]
extern crate log;
extern crate quick_xml;
extern crate rustc_serialize;
extern crate tokio_core;
extern crate tokio_io;
extern crate tokio_proto;
extern crate tokio_service;
extern crate tokio_uds;
extern crate tokio_uds_proto;

#[cfg(test)]
extern crate quickcheck;

pub mod error;
pub mod wire;
pub mod xmlrpc;
#[macro_use]
pub mod types;
pub mod codec;
pub mod client;
pub mod session;
pub mod api;

#[cfg(test)]
mod mock;

pub use client::{Client, Target};
pub use error::{ApiError, Error, Result};
pub use session::{Session, Transport, XenFuture};
pub use types::{DateTime, FromValue, Ref, ToValue};
pub use xmlrpc::Value;
