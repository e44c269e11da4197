// src/types.rs

//! Shared primitive types used across module boundaries.

/// Unique identifier of a task within a plan.
pub type TaskName = String;

/// Behaviour when a work routine resolves successfully but its sequence-shaped
/// output contains zero items.
///
/// - `Accept`: an empty result is a valid result (default; also the effective
///   behaviour of value-shaped outputs, which have no item count).
/// - `Fail`: an empty result fails the task immediately, with no retry.
/// - `RetryOnce`: the work routine is invoked one more time with the same
///   inputs; a second empty result fails the task, a non-empty one completes
///   it with the retried output.
///
/// The policy is declared per task. Different tasks in one plan may use
/// different policies for the same output shape; the engine applies each
/// task's declared policy as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyResultPolicy {
    Accept,
    Fail,
    RetryOnce,
}

impl Default for EmptyResultPolicy {
    fn default() -> Self {
        EmptyResultPolicy::Accept
    }
}
