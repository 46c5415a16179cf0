//! WebGPU rendering module
//!
//! The scene is rebuilt as a world-space triangle list every frame and drawn
//! through a camera uniform.

pub mod pipeline;
pub mod scene;
pub mod vertex;

pub use pipeline::RenderState;
pub use vertex::Vertex;
