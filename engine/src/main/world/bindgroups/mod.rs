pub mod bones;
pub mod camera;
pub mod lights;
