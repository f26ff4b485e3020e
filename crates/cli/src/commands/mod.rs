//! CLI command implementations.

pub mod shell;
pub mod signup;
