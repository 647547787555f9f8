//! Worker context lifecycle and command delivery.
//!
//! The worker context is a platform singleton: at most one may exist, and
//! only [`WorkerContextManager`] creates it. Everything else reaches it
//! through [`MessageDispatcher`].

mod capture_worker;
mod dispatcher;
mod local_host;
mod manager;
mod platform;
mod retry;

pub use {
    capture_worker::CaptureWorker,
    dispatcher::MessageDispatcher,
    local_host::{LocalWorkerHost, WorkerHostSettings},
    manager::{EnsureOutcome, WorkerContextManager},
    platform::{NO_RECEIVER_ERROR, SINGLE_CONTEXT_ERROR, SendFailure, WorkerPlatform},
    retry::{RetryBudget, RetryPolicy},
};

pub(crate) use local_host::Envelope;
