use crate::error::ClientError;
use crate::poller::Tick;

/// What a running poller reports back to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Tick(Tick),
    /// The feed failed; the poller has already stopped.
    Failed(ClientError),
}

/// Work queued for the controller. Background tasks never touch the app
/// state directly; they post one of these instead.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Poll { session_id: String, event: PollEvent },
    /// Delayed history reload after a successful job.
    RefreshHistory,
    /// Delayed hide of the processing region after a job ended.
    HideProcessing,
}
