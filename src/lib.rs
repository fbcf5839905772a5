//! jangdan - In-process event scheduler
//!
//! A time-ordered action queue with recurring execution, cron-style
//! calendar rules, and a publish/subscribe event layer riding the same
//! queue. State lives in memory for the life of the process: there is no
//! persistence, no multi-process coordination, and nothing runs unless the
//! host program drives the run loop.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`engine`] - The [`Scheduler`]: queue operations, recurrence, cron
//!   jobs, and event emission
//! - [`queue`] - Time-ordered entry queue with stable priority tie-breaks
//! - [`cron`] - Calendar rule parsing and evaluation
//! - [`clock`] - Injectable time source (system and virtual clocks)
//! - [`emitter`] - Per-scheduler listener registry
//! - [`error`] - Crate-wide error type
//!
//! # Example
//!
//! ```
//! use jangdan::prelude::*;
//!
//! let mut sched = Scheduler::new();
//!
//! // one-shot, two seconds from now
//! sched.enter(2.0, 0, |_| println!("hello"));
//!
//! // every ten seconds until stopped
//! sched.every(10.0).run(|_| {
//!     println!("tick");
//!     Repeat::Continue
//! })?;
//!
//! // 9:00 every weekday
//! sched.cron("0 9 * * 1-5")?.run(|_| println!("standup"));
//!
//! // listeners fire in priority order when the event is emitted
//! sched.on("report", 1, |_, payload| println!("got {payload}"));
//!
//! // drain everything currently due, without blocking
//! sched.run(false);
//! # Ok::<(), jangdan::Error>(())
//! ```

pub mod clock;
pub mod cron;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod queue;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::cron::{check_rule, parse_field, parse_rule, CronRule, FieldSpec};
    pub use crate::engine::{CronHandle, Repeat, Scheduler};
    pub use crate::error::{Error, Result};
    pub use crate::queue::{EventHandle, When};
}

// Direct re-exports for convenience
pub use engine::{CronHandle, Repeat, Scheduler, SchedulerBuilder};
pub use error::{Error, Result};
pub use queue::{EventHandle, When};
