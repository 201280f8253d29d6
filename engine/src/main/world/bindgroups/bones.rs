use glam::Mat4;
use wgpu::util::DeviceExt as _;

/// Skinning matrices for one skeleton, one column-major `mat4x4<f32>` per bone.
pub struct BonesBinding {
    pub bind_group: wgpu::BindGroup,
    buffer: wgpu::Buffer,
    bone_count: usize,
}

impl BonesBinding {
    pub fn desc() -> wgpu::BindGroupLayoutDescriptor<'static> {
        wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("Bones Bind Group Layout"),
        }
    }

    pub fn new(layout: &wgpu::BindGroupLayout, device: &wgpu::Device, bone_count: usize) -> Self {
        // storage bindings can't be empty
        let data = vec![Mat4::IDENTITY; bone_count.max(1)];
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bones SSBO"),
            contents: bytemuck::cast_slice(&data),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bones Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            bind_group,
            buffer,
            bone_count,
        }
    }

    /// Uploads this frame's matrices. A slice of the wrong length is logged and dropped,
    /// returns whether the upload happened.
    pub fn set_bone_matrices(&self, matrices: &[Mat4], queue: &wgpu::Queue) -> bool {
        if !fits_skeleton(matrices, self.bone_count) {
            log::error!(
                "got {} bone matrices for a skeleton of {} bones, skipping upload",
                matrices.len(),
                self.bone_count
            );
            return false;
        }
        if !matrices.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(matrices));
        }
        true
    }
}

fn fits_skeleton(matrices: &[Mat4], bone_count: usize) -> bool {
    matrices.len() == bone_count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_needs_one_matrix_per_bone() {
        assert!(fits_skeleton(&[Mat4::IDENTITY; 3], 3));
        assert!(fits_skeleton(&[], 0));
        assert!(!fits_skeleton(&[Mat4::IDENTITY; 2], 3));
        assert!(!fits_skeleton(&[Mat4::IDENTITY; 4], 3));
    }
}
