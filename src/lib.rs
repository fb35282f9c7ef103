//! Fixelview viewer
//!
//! Configuration, key mapping and tool state for the fixel viewer binary.

pub mod config;
pub mod input;
pub mod viewer;
