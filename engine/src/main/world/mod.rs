pub mod attachments;
pub mod bindgroups;
pub mod buffers;
pub mod pipelines;
pub mod renderer;

pub use renderer::Renderer;
