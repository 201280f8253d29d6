pub mod skinned;
