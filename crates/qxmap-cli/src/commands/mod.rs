//! CLI command implementations.

pub mod archs;
pub mod common;
pub mod fixed5;
pub mod route;
pub mod table;
pub mod version;
