//! WebGPU rendering module
//!
//! The board is plain triangle geometry built on the CPU each frame
//! ([`scene::build`]) and drawn by a single flat-color pipeline.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, logical_to_ndc};
pub use vertex::Vertex;
