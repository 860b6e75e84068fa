//! State machine errors
//!
//! All of these are user mistakes (pausing a stopped timer and the like):
//! the timer is left untouched and the message is shown as-is.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    #[error("No timer is running!")]
    NotRunning,

    #[error("Timer is already running!")]
    AlreadyRunning,

    #[error("Timer is already paused!")]
    AlreadyPaused,

    #[error("No paused timer to resume!")]
    NotPaused,

    #[error("Answer y or n to continue with the next session first")]
    AwaitingConfirmation,

    #[error("No finished session is waiting for an answer")]
    NotAwaitingConfirmation,
}
