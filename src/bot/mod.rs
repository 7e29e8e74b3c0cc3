//! Auto-responder core.
//!
//! - [`selector`] - today's most recent received message
//! - [`evaluator`] - dedup, loop guard and trigger match
//! - [`dispatcher`] - link-gated send + state advance
//! - [`responder`] - the poll loop tying them together

pub mod dispatcher;
pub mod evaluator;
pub mod responder;
pub mod selector;

pub use dispatcher::{dispatch, Outcome};
pub use evaluator::{evaluate, should_respond, Verdict};
pub use responder::{Responder, TickOutcome};
pub use selector::select_candidate;
