pub mod utils;
pub mod wgpu_context;
pub mod window;
pub mod world;
