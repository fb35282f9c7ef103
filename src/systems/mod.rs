//! Application systems
//!
//! Window and GPU rendering, kept out of main.rs.

mod render;
mod window;

pub use render::{RenderError, RenderSystem};
pub use window::WindowSystem;
