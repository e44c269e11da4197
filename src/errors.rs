// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenflowError {
    #[error("Plan error: {0}")]
    PlanError(String),

    #[error("Cycle detected in plan: {0}")]
    PlanCycle(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, GenflowError>;
