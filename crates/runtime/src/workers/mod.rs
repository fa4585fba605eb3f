//! Worker tasks that back the runtime orchestration.
//!
//! Each open game gets one [`SessionWorker`] task. Commands for a game are
//! processed strictly in arrival order by its worker, which makes the worker
//! the per-game mutual exclusion boundary; different games never share one.

mod session;

pub(crate) use session::{Command, SessionWorker};
