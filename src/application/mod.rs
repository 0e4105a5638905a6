//! Application layer orchestrating a session.
//!
//! This module defines the `FlowController`, the screen state machine that
//! owns a `Session`. Async work runs on `tokio` tasks that report back through
//! a channel, and results are applied one at a time on the controller's task.

pub mod dashboard;
pub mod flow;
pub mod session;
