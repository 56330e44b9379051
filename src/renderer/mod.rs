//! WebGPU rendering module
//!
//! Flat-colored triangle lists: the scene builder projects the 3D
//! simulation to NDC on the CPU, the pipeline just uploads and draws.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use shapes::scene_vertices;
pub use vertex::Vertex;
