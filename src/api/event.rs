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

// Change notifications

use error::Error;
use futures::{stream, Future, Stream};
use session::{Session, XenFuture};
use std::collections::HashMap;
use xmlrpc::Value;

/// Seconds `event.from` waits for something to happen before returning an
/// empty batch
pub const FROM_TIMEOUT: f64 = 30.0;

xenapi_enum! {
    pub enum EventOperation {
        Add => "add",
        Del => "del",
        Mod => "mod",
    }
}

xenapi_record! {
    pub struct EventRecord {
        pub id: i64 => "id",
        pub timestamp: String => "timestamp",
        /// Lower case class name, e.g. `vm`
        pub class: String => "class",
        pub operation: EventOperation => "operation",
        /// Reference to the object that changed
        pub opaque_ref: String => "ref",
        pub obj_uuid: String => "obj_uuid",
        /// The object's record after the change, absent on `del`
        pub snapshot: Value => "snapshot",
    }
}

xenapi_record! {
    /// One answer from `event.from`
    pub struct EventBatch {
        pub events: Vec<EventRecord> => "events",
        pub valid_ref_counts: HashMap<String, i64> => "valid_ref_counts",
        /// Pass back to the next `event.from`
        pub token: String => "token",
    }
}

/// The event class. It has no objects of its own, so none of the generic
/// `Class` operations apply to it.
pub enum Event {}

impl Event {
    pub const NAME: &'static str = "event";

    pub fn message(op: &str) -> String {
        format!("{}.{}", Event::NAME, op)
    }

    /// Subscribe this session to `classes` for `next`. `*` means all.
    pub fn register(session: &Session, classes: &[String]) -> XenFuture<()> {
        session.call(&Event::message("register"), params!(classes))
    }

    pub fn unregister(session: &Session, classes: &[String]) -> XenFuture<()> {
        session.call(&Event::message("unregister"), params!(classes))
    }

    /// Block until events arrive for the registered classes
    pub fn next(session: &Session) -> XenFuture<Vec<EventRecord>> {
        session.call(&Event::message("next"), params!())
    }

    /// Events for `classes` since `token`, waiting up to `timeout` seconds.
    /// An empty token returns every current object first.
    pub fn from(session: &Session,
                classes: &[String],
                token: &str,
                timeout: f64)
                -> XenFuture<EventBatch> {
        session.call(&Event::message("from"), params!(classes, token, timeout))
    }

    pub fn get_current_id(session: &Session) -> XenFuture<i64> {
        session.call(&Event::message("get_current_id"), params!())
    }

    /// Fake a `mod` event on an object; returns its token
    pub fn inject(session: &Session, class: &str, opaque_ref: &str) -> XenFuture<String> {
        session.call(&Event::message("inject"), params!(class, opaque_ref))
    }

    /// Every event on `classes`, forever, by chaining `event.from` calls
    pub fn watch(session: &Session,
                 classes: Vec<String>)
                 -> Box<Stream<Item = EventRecord, Error = Error>> {
        let session = session.clone();
        let batches = stream::unfold(String::new(), move |token| {
            trace!("event.from at token {:?}", token);
            let batch = Event::from(&session, &classes, &token, FROM_TIMEOUT).map(|batch| {
                (stream::iter_ok::<_, Error>(batch.events), batch.token)
            });
            Some(batch)
        });

        Box::new(batches.flatten())
    }
}
