pub mod anim_pose;
pub mod animation;
pub mod animator;
pub mod assets;
pub mod mesh;
pub mod sim;
pub mod skeleton;
pub mod utils;
