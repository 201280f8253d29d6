pub mod gpu_mesh;
pub mod skinned_vertex;
