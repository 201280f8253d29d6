use wgpu::util::DeviceExt as _;

use crate::config::ViewerConfig;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    /// xyz towards the light
    pub direction: [f32; 4],
    pub color: [f32; 4],
    /// rgb colour, w intensity
    pub ambient: [f32; 4],
    /// x shininess, y intensity
    pub specular: [f32; 4],
}

impl LightsUniform {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            direction: config.light_dir.normalize_or_zero().extend(0.0).to_array(),
            color: config.light_color.extend(1.0).to_array(),
            ambient: config.ambient_color.extend(config.ambient_intensity).to_array(),
            specular: [config.specular_shininess, config.specular_intensity, 0.0, 0.0],
        }
    }
}

/// Written once at startup.
pub struct LightsBinding {
    _buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl LightsBinding {
    pub fn desc() -> wgpu::BindGroupLayoutDescriptor<'static> {
        wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("Lights Group Layout"),
        }
    }

    pub fn new(device: &wgpu::Device, bind_group_layout: &wgpu::BindGroupLayout, lights: &LightsUniform) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lights Buffer"),
            contents: bytemuck::bytes_of(lights),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("Lights Bind Group"),
        });
        Self {
            _buffer: buffer,
            bind_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_config() {
        let config = ViewerConfig::default();
        let lights = LightsUniform::from_config(&config);
        assert_eq!(lights.ambient, [1.0, 1.0, 1.0, 0.5]);
        assert_eq!(lights.specular, [32.0, 0.5, 0.0, 0.0]);
        let dir = glam::Vec4::from_array(lights.direction);
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert_eq!(std::mem::size_of::<LightsUniform>(), 64);
    }
}
