#[allow(clippy::module_inception)]
mod coordinator;
mod settings;
mod snapshot;
mod start_outcome;

pub use {
    coordinator::SessionCoordinator, settings::CoordinatorSettings, snapshot::SessionSnapshot,
    start_outcome::StartOutcome,
};
