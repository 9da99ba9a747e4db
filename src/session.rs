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

use api::{Class, Host, Pool, Task};
use error::{ApiError, Error, Result};
use futures::Future;
use std::io;
use std::rc::Rc;
use tokio_service::Service;
use types::{FromValue, Ref};
use wire;
use xmlrpc::{MethodCall, MethodResponse, Value};

/// Every call made through a `Session` resolves to one of these
pub type XenFuture<T> = Box<Future<Item = T, Error = Error>>;

/// Anything that can carry an HTTP request to xapi and bring back the
/// response
pub trait Transport {
    fn send(&self, req: wire::Request) -> Box<Future<Item = wire::Response, Error = io::Error>>;
}

impl<S> Transport for S
    where S: Service<Request = wire::Request, Response = wire::Response, Error = io::Error>,
          S::Future: 'static
{
    fn send(&self, req: wire::Request) -> Box<Future<Item = wire::Response, Error = io::Error>> {
        Box::new(self.call(req))
    }
}

/// The user class only ever shows up as a reference
pub enum User {}

/// Peel the `Status`/`Value`/`ErrorDescription` struct xapi wraps every
/// result in
pub fn unwrap_envelope(value: Value) -> Result<Value> {
    let mut members = match value {
        Value::Struct(members) => members,
        other => {
            return Err(Error::Decode(format!("expected a XenAPI envelope, found {}", other.kind())))
        }
    };

    let status = match members.remove(wire::STATUS) {
        Some(Value::String(status)) => status,
        _ => return Err(Error::Decode(String::from("envelope has no Status"))),
    };

    if status == wire::SUCCESS {
        Ok(members.remove(wire::VALUE).unwrap_or(Value::Nil))
    } else if status == wire::FAILURE {
        let description = match members.remove(wire::ERROR_DESCRIPTION) {
            Some(description) => Vec::<String>::from_value(description)?,
            None => vec![],
        };
        Err(Error::Api(ApiError::from_description(description)))
    } else {
        Err(Error::Decode(format!("unknown envelope status {:?}", status)))
    }
}

fn decode_response<T: FromValue>(method: &str, response: wire::Response) -> Result<T> {
    if response.status != 200 {
        return Err(Error::Http(response.status, response.reason));
    }

    let text = String::from_utf8(response.body)
        .map_err(|_| Error::Xml(String::from("response is not UTF-8")))?;
    trace!("{} <- {}", method, text);

    match MethodResponse::parse(&text)? {
        MethodResponse::Fault { code, string } => Err(Error::Fault(code, string)),
        MethodResponse::Success(value) => {
            let value = unwrap_envelope(value).map_err(|e| {
                    debug!("{} failed: {}", method, e);
                    e
                })?;
            T::from_value(value)
        }
    }
}

/// Make one XML-RPC call and decode what comes back
pub fn dispatch<T>(transport: &Transport, method: &str, params: Vec<Value>) -> XenFuture<T>
    where T: FromValue + 'static
{
    debug!("calling {}", method);
    let body = MethodCall::new(method, params).to_xml();
    // keep credentials out of the logs
    if !method.starts_with("session.") {
        trace!("{} -> {}", method, body);
    }

    let method = method.to_owned();
    Box::new(transport.send(wire::Request::new(body))
                 .map_err(Error::from)
                 .and_then(move |response| decode_response(&method, response)))
}

/// A logged in session. Cloning is cheap and clones share the connection.
#[derive(Clone)]
pub struct Session {
    transport: Rc<Transport>,
    opaque: String,
}

impl Session {
    fn login(transport: Rc<Transport>, method: &str, params: Vec<Value>) -> XenFuture<Session> {
        Box::new(dispatch::<String>(&*transport, method, params).map(move |opaque| {
            info!("logged in");
            Session {
                transport: transport,
                opaque: opaque,
            }
        }))
    }

    pub fn login_with_password<T>(transport: T,
                                  username: &str,
                                  password: &str)
                                  -> XenFuture<Session>
        where T: Transport + 'static
    {
        Session::login(Rc::new(transport),
                       "session.login_with_password",
                       params!(username, password, wire::API_VERSION, wire::ORIGINATOR))
    }

    /// Log in to a slave that has lost its master, using the local
    /// credentials the host keeps
    pub fn slave_local_login_with_password<T>(transport: T,
                                              username: &str,
                                              password: &str)
                                              -> XenFuture<Session>
        where T: Transport + 'static
    {
        Session::login(Rc::new(transport),
                       "session.slave_local_login_with_password",
                       params!(username, password))
    }

    /// Adopt a session reference obtained elsewhere
    pub fn from_ref<T, S>(transport: T, opaque: S) -> Session
        where T: Transport + 'static,
              S: Into<String>
    {
        Session {
            transport: Rc::new(transport),
            opaque: opaque.into(),
        }
    }

    pub fn opaque_ref(&self) -> &str {
        &self.opaque
    }

    /// Call `method` with the session reference in front of `params`
    pub fn call<T>(&self, method: &str, mut params: Vec<Value>) -> XenFuture<T>
        where T: FromValue + 'static
    {
        params.insert(0, Value::String(self.opaque.clone()));
        dispatch(&*self.transport, method, params)
    }

    /// Run `method` as a server side task
    pub fn call_async(&self, method: &str, params: Vec<Value>) -> XenFuture<Ref<Task>> {
        self.call(&format!("{}{}", wire::ASYNC_PREFIX, method), params)
    }

    pub fn logout(&self) -> XenFuture<()> {
        info!("logging out");
        self.call("session.logout", params!())
    }

    pub fn local_logout(&self) -> XenFuture<()> {
        self.call("session.local_logout", params!())
    }

    pub fn get_this_host(&self) -> XenFuture<Ref<Host>> {
        self.call("session.get_this_host", params!(self.opaque))
    }

    pub fn get_this_user(&self) -> XenFuture<Ref<User>> {
        self.call("session.get_this_user", params!(self.opaque))
    }

    pub fn change_password(&self, old_password: &str, new_password: &str) -> XenFuture<()> {
        self.call("session.change_password", params!(old_password, new_password))
    }

    /// The API version the pool master speaks, as `(major, minor)`
    pub fn get_api_version(&self) -> XenFuture<(i64, i64)> {
        let session = self.clone();
        let master = Pool::get_all(self)
            .and_then(|pools| {
                pools.into_iter()
                    .next()
                    .ok_or_else(|| Error::Decode(String::from("no pool object")))
            })
            .and_then(move |pool| pool.get_master(&session));

        let session = self.clone();
        Box::new(master.and_then(move |master: Ref<Host>| {
            master.get_field::<i64>(&session, "API_version_major")
                .join(master.get_field::<i64>(&session, "API_version_minor"))
        }))
    }
}
