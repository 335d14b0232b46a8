//! Utilities shared between Quizhall binaries and libraries.

pub mod logger;
pub mod time;
