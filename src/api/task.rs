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

// Server side tasks, as returned by every `Async.` call

use api::{HasOtherConfig, Host, Named};
use error::{ApiError, Error, Result};
use futures::{future, Future};
use futures::future::Loop;
use session::{Session, XenFuture};
use std::collections::HashMap;
use std::time::Duration;
use tokio_core::reactor::{Handle, Timeout};
use types::{DateTime, FromValue, Ref};
use xmlrpc::{parse_value, Value};

/// How long `wait` sleeps between polls unless told otherwise
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

xenapi_enum! {
    pub enum TaskStatus {
        Pending => "pending",
        Success => "success",
        Failure => "failure",
        Cancelling => "cancelling",
        Cancelled => "cancelled",
    }
}

impl TaskStatus {
    /// Whether the task is still going
    pub fn is_running(&self) -> bool {
        match *self {
            TaskStatus::Pending | TaskStatus::Cancelling => true,
            _ => false,
        }
    }
}

xenapi_record! {
    pub struct TaskRecord {
        pub uuid: String => "uuid",
        pub name_label: String => "name_label",
        pub name_description: String => "name_description",
        pub allowed_operations: Vec<String> => "allowed_operations",
        pub created: DateTime => "created",
        pub finished: DateTime => "finished",
        pub status: TaskStatus => "status",
        pub resident_on: Ref<Host> => "resident_on",
        pub progress: f64 => "progress",
        /// Name of the operation, e.g. `VM.start`
        pub kind: String => "type",
        /// The operation's result as an XML-RPC `<value>` fragment
        pub result: String => "result",
        pub error_info: Vec<String> => "error_info",
        pub other_config: HashMap<String, String> => "other_config",
        pub subtask_of: Ref<Task> => "subtask_of",
        pub subtasks: Vec<Ref<Task>> => "subtasks",
        pub backtrace: String => "backtrace",
    }
}

xenapi_class! {
    pub enum Task => "task", TaskRecord
}

impl Named for Task {}
impl HasOtherConfig for Task {}

/// Decode the `result` field of a finished task
pub fn decode_result<T: FromValue>(result: &str) -> Result<T> {
    let result = result.trim();
    if result.is_empty() {
        return T::from_value(Value::Nil);
    }
    T::from_value(parse_value(result)?)
}

/// What a task that is no longer running came to
fn settle<T: FromValue>(task: &Ref<Task>, record: TaskRecord) -> Result<T> {
    match record.status {
        TaskStatus::Success => decode_result(&record.result),
        TaskStatus::Cancelled if record.error_info.is_empty() => {
            Err(Error::Api(ApiError::TaskCancelled(vec![task.to_string()])))
        }
        TaskStatus::Failure | TaskStatus::Cancelled => {
            Err(Error::Api(ApiError::from_description(record.error_info)))
        }
        other => Err(Error::Decode(format!("task {} is still {}", task, other))),
    }
}

impl Task {
    /// A task for the client's own bookkeeping
    pub fn create(session: &Session, label: &str, description: &str) -> XenFuture<Ref<Task>> {
        session.call("task.create", params!(label, description))
    }
}

impl Ref<Task> {
    pub fn destroy(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "destroy", params!())
    }

    pub fn cancel(&self, session: &Session) -> XenFuture<()> {
        self.invoke(session, "cancel", params!())
    }

    pub fn get_status(&self, session: &Session) -> XenFuture<TaskStatus> {
        self.get_field(session, "status")
    }

    /// Somewhere between 0.0 and 1.0
    pub fn get_progress(&self, session: &Session) -> XenFuture<f64> {
        self.get_field(session, "progress")
    }

    pub fn get_result(&self, session: &Session) -> XenFuture<String> {
        self.get_field(session, "result")
    }

    pub fn get_error_info(&self, session: &Session) -> XenFuture<Vec<String>> {
        self.get_field(session, "error_info")
    }

    /// Poll every `interval` until the task finishes, then yield its
    /// decoded result. A failed or cancelled task yields its error.
    pub fn wait<T>(&self, session: &Session, handle: &Handle, interval: Duration) -> XenFuture<T>
        where T: FromValue + 'static
    {
        let task = self.clone();
        let session = session.clone();
        let handle = handle.clone();

        Box::new(future::loop_fn((), move |()| {
            let task = task.clone();
            let handle = handle.clone();

            task.get_record(&session).and_then(move |record| -> XenFuture<Loop<T, ()>> {
                if record.status.is_running() {
                    trace!("{} is {} at {:.0}%",
                           task,
                           record.status,
                           record.progress * 100.0);
                    return match Timeout::new(interval, &handle) {
                        Ok(timeout) => {
                            Box::new(timeout.map(|_| Loop::Continue(())).map_err(Error::from))
                        }
                        Err(e) => Box::new(future::err(Error::from(e))),
                    };
                }

                debug!("{} finished: {}", task, record.status);
                Box::new(future::result(settle(&task, record).map(Loop::Break)))
            })
        }))
    }
}
