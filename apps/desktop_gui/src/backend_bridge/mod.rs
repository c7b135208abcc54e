//! Backend worker: owns storage and the wallet on its own tokio runtime.

pub mod commands;
pub mod runtime;
