//! Level data as the render core sees it, plus the project loader.

pub mod camera;
pub mod defs;
pub mod grid;
pub mod loader;
pub mod model;
pub mod sampler;
