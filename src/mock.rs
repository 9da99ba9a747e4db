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

// A stand-in for xapi that replays canned responses and remembers what
// it was asked

use futures::future::{self, FutureResult};
use session::Session;
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::io;
use std::rc::Rc;
use tokio_service::Service;
use wire;
use xmlrpc::{MethodCall, MethodResponse, Value};

struct Inner {
    calls: RefCell<Vec<MethodCall>>,
    responses: RefCell<VecDeque<wire::Response>>,
}

#[derive(Clone)]
pub struct MockXapi {
    inner: Rc<Inner>,
}

fn ok(body: String) -> wire::Response {
    wire::Response {
        status: 200,
        reason: String::from("OK"),
        body: body.into_bytes(),
    }
}

impl MockXapi {
    pub const SESSION: &'static str = "OpaqueRef:session";

    pub fn new() -> MockXapi {
        MockXapi {
            inner: Rc::new(Inner {
                calls: RefCell::new(vec![]),
                responses: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// A session already logged in against this mock
    pub fn session(&self) -> Session {
        Session::from_ref(self.clone(), MockXapi::SESSION)
    }

    pub fn respond(&self, response: wire::Response) {
        self.inner.responses.borrow_mut().push_back(response);
    }

    /// Queue a successful result
    pub fn reply(&self, value: Value) {
        let mut envelope = BTreeMap::new();
        envelope.insert(String::from(wire::STATUS), Value::from(wire::SUCCESS));
        envelope.insert(String::from(wire::VALUE), value);
        self.respond(ok(MethodResponse::Success(Value::Struct(envelope)).to_xml()));
    }

    /// Queue a XenAPI failure
    pub fn fail(&self, description: &[&str]) {
        let mut envelope = BTreeMap::new();
        envelope.insert(String::from(wire::STATUS), Value::from(wire::FAILURE));
        envelope.insert(String::from(wire::ERROR_DESCRIPTION),
                        Value::Array(description.iter().map(|s| Value::from(*s)).collect()));
        self.respond(ok(MethodResponse::Success(Value::Struct(envelope)).to_xml()));
    }

    pub fn fault(code: i64, string: &str) -> wire::Response {
        ok(MethodResponse::Fault {
                code: code,
                string: String::from(string),
            }
            .to_xml())
    }

    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.calls.borrow().clone()
    }

    /// The only call made, asserting there was exactly one
    pub fn only_call(&self) -> MethodCall {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "calls: {:?}", calls);
        calls[0].clone()
    }
}

impl Service for MockXapi {
    type Request = wire::Request;
    type Response = wire::Response;
    type Error = io::Error;
    type Future = FutureResult<wire::Response, io::Error>;

    fn call(&self, req: Self::Request) -> Self::Future {
        let text = String::from_utf8(req.body).unwrap();
        let call = MethodCall::parse(&text).unwrap();
        self.inner.calls.borrow_mut().push(call);

        match self.inner.responses.borrow_mut().pop_front() {
            Some(response) => future::ok(response),
            None => future::err(io::Error::new(io::ErrorKind::UnexpectedEof, "no response queued")),
        }
    }
}
