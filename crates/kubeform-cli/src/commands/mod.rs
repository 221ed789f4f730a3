//! CLI commands

pub mod describe;
pub mod kinds;
pub mod render;
pub mod validate;
