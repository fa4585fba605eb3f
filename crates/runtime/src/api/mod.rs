//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on orchestration, workers, or persistence.

pub mod errors;
pub mod handle;

pub use errors::{DataIntegrityError, Result, RuntimeError, SessionError, ValidationError};
pub use handle::GameHandle;
