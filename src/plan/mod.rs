// src/plan/mod.rs

//! Task and plan model.
//!
//! - [`spec`] describes individual tasks: dependency, start offset, progress
//!   lines, empty-result policy and the async work routine itself.
//! - [`validate`] turns a list of specs into a [`TaskPlan`], rejecting
//!   duplicate names, unresolved dependencies and cycles up front.

pub mod spec;
pub mod validate;

pub use spec::{TaskContext, TaskSpec, WorkFn, WorkFuture, WorkOutput};
pub use validate::TaskPlan;
