//! Condition waiting with timeouts and an optional human override.
//!
//! This crate blocks a caller until a user-supplied predicate becomes true,
//! or gives up after a bounded wait. Two timeout budgets govern every wait:
//!
//! - the **negative timeout** limits how long the condition may stay
//!   unsatisfied before the wait fails;
//! - the **positive timeout** is a grace period after the condition becomes
//!   satisfied, during which a human may still reject, before the wait
//!   auto-confirms.
//!
//! Two variants share the same request model:
//!
//! - [`DialogWaiter`] attaches a presentation surface (see
//!   `condwait-protocol`) and runs the full state machine: an evaluator loop
//!   polling the condition, a timer loop counting down the budgets, and the
//!   user's confirm/reject signals, all serialized through one critical
//!   section.
//! - [`SilentWaiter`] polls inline with no surface and rejects any request
//!   that would need a human.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use condwait_core::DialogWaiter;
//! use condwait_core::WaitRequest;
//! use condwait_protocol::NullSurface;
//!
//! # async fn example() -> condwait_core::Result<()> {
//! let request = WaitRequest::condition(device_idle, "Device is idle");
//! DialogWaiter::new().run(request, Arc::new(NullSurface)).await?;
//! # Ok(())
//! # }
//! # fn device_idle() -> bool { true }
//! ```

pub mod defaults;
mod engine;
mod error;
mod evaluator;
mod outcome;
mod policy;
mod request;
mod silent;
mod timer;

pub use engine::DialogWaiter;
pub use error::Result;
pub use error::WaitError;
pub use outcome::WaitOutcome;
pub use policy::Budget;
pub use policy::EngineState;
pub use request::ByDisplay;
pub use request::PredicateFn;
pub use request::Timeout;
pub use request::ValueFn;
pub use request::WaitRequest;
pub use silent::SilentWaiter;
