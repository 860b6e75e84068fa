//! pomodoro - Pomodoro timer with persistent sessions
//!
//! Work and break intervals that survive the process: every command is a
//! fresh invocation, so the timer lives in a saved session record and the
//! remaining time is always recomputed from timestamps.
//!
//! Pieces:
//! - session: session types and the persisted record
//! - recovery: what a saved record means right now
//! - timer: the state machine (start, pause, resume, skip, stop, confirm)
//! - store: where the record lives
//! - clock: injectable "now"

pub mod clock;
pub mod error;
pub mod recovery;
pub mod session;
pub mod store;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::TimerError;
pub use recovery::{recover, Recovered};
pub use session::{Session, SessionType};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
pub use timer::{Completion, Timer, TimerState};
