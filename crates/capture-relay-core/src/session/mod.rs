#[allow(clippy::module_inception)]
mod session;
mod session_state;
mod source_ref;
mod trigger;

pub use {
    session::Session, session_state::SessionState, source_ref::SourceRef, trigger::Trigger,
};
