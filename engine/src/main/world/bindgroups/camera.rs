use glam::Mat4;
use wgpu::util::DeviceExt as _;

use crate::{config::ViewerConfig, main::wgpu_context::OPENGL_TO_WGPU_MATRIX};

pub struct CameraMatrices {
    pub view_proj: Mat4,
    pub position: [f32; 4],
    pub model: Mat4,
}

impl CameraMatrices {
    pub fn from_config(config: &ViewerConfig, aspect: f32) -> Self {
        Self {
            view_proj: OPENGL_TO_WGPU_MATRIX * config.projection(aspect) * config.view(),
            position: config.camera_pos.extend(1.0).to_array(),
            model: config.model(),
        }
    }
}

pub struct CameraBinding {
    view_proj_buffer: wgpu::Buffer,
    position_buffer: wgpu::Buffer,
    model_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl CameraBinding {
    pub fn new(device: &wgpu::Device, bind_group_layout: &wgpu::BindGroupLayout, matrices: &CameraMatrices) -> Self {
        let view_proj_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("View Projection Buffer"),
            contents: bytemuck::cast_slice(&matrices.view_proj.to_cols_array()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Position Buffer"),
            contents: bytemuck::cast_slice(&matrices.position),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let model_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Transform Buffer"),
            contents: bytemuck::cast_slice(&matrices.model.to_cols_array()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: view_proj_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: position_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: model_buffer.as_entire_binding(),
                },
            ],
            label: Some("Camera Bind Group"),
        });

        CameraBinding {
            view_proj_buffer,
            position_buffer,
            model_buffer,
            bind_group,
        }
    }

    pub fn desc() -> wgpu::BindGroupLayoutDescriptor<'static> {
        wgpu::BindGroupLayoutDescriptor {
            entries: &[
                // view projection
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // eye position
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // model
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
            label: Some("Camera Bind Group Layout"),
        }
    }

    pub fn update(&self, matrices: &CameraMatrices, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.view_proj_buffer,
            0,
            bytemuck::cast_slice(&matrices.view_proj.to_cols_array()),
        );
        queue.write_buffer(&self.position_buffer, 0, bytemuck::cast_slice(&matrices.position));
        queue.write_buffer(
            &self.model_buffer,
            0,
            bytemuck::cast_slice(&matrices.model.to_cols_array()),
        );
    }
}
