//! Messages exchanged between the coordinator, UI surfaces and the worker context.

mod command;
mod message;
mod worker_reply;

pub use {
    command::{Command, CommandKind},
    message::Message,
    worker_reply::WorkerReply,
};
