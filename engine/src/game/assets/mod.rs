pub mod gltf_import;
