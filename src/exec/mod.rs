// src/exec/mod.rs

//! Work execution layer.
//!
//! This module is responsible for actually running the work routines of
//! dispatched tasks and reporting back to the run loop via `EngineEvent`s.
//!
//! - [`worker`] runs a single task's work routine, applying its
//!   empty-result policy and folding accepted patches into the shared
//!   result object.
//! - [`reporter`] emits the periodic progress ticks for a working task.

pub mod reporter;
pub mod worker;

pub use reporter::spawn_reporter;
pub use worker::spawn_worker;
